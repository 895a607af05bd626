pub mod admin;
pub mod auth;
pub mod cheffing;
pub mod integrations;
pub mod reservations;
pub mod tasks;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::{error::ApiResult, state::AppState};

async fn health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state
        .conn
        .ping()
        .await
        .map_err(venue_office_service::ServiceError::from)?;

    Ok(Json(json!({ "status": "ok" })))
}

/// Everything under `/api`; every handler resolves the caller first
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(auth::me))
        .nest("/reservations", reservations::router())
        .nest("/tasks", tasks::router())
        .nest("/cheffing", cheffing::router())
        .nest("/admin", admin::router())
        .nest("/integrations", integrations::router())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router())
        .nest("/api", api_router())
}
