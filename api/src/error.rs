use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use venue_office_service::ServiceError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("You do not have access to this page")]
    Forbidden { redirect_to: &'static str },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Integration(String),
    #[error("{0}")]
    NotImplemented(String),
    #[error("{0}")]
    Database(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    redirect_to: Option<&'static str>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Integration(_) => StatusCode::BAD_GATEWAY,
            ApiError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Db(err) => {
                error!(error = %err, "database error");
                ApiError::Database(err.to_string())
            }
            ServiceError::Validation(message) => ApiError::Validation(message),
            err @ ServiceError::NotFound(..) => ApiError::NotFound(err.to_string()),
            ServiceError::Conflict(message) => ApiError::Conflict(message),
            err @ ServiceError::Costing(_) => ApiError::Validation(err.to_string()),
            err @ ServiceError::Integration(_) => ApiError::Integration(err.to_string()),
            err @ ServiceError::NotImplemented(_) => ApiError::NotImplemented(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let redirect_to = match &self {
            ApiError::Forbidden { redirect_to } => Some(*redirect_to),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            redirect_to,
        };

        (self.status(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
