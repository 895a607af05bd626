use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use venue_office_service::{
    access::{AccessLevel, Module},
    integrations::SumUpStatus,
};

use crate::{auth::CurrentUser, error::ApiResult, state::AppState};

#[derive(Serialize)]
struct GoogleStatus {
    calendar_sync: bool,
    calendar_id: Option<String>,
    login: bool,
}

async fn google_status(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<GoogleStatus>> {
    current.authorize(Module::Admin, AccessLevel::Read)?;

    let calendar_sync = state.calendar.is_enabled();
    Ok(Json(GoogleStatus {
        calendar_sync,
        calendar_id: state
            .config
            .google_calendar_id
            .clone()
            .filter(|_| calendar_sync),
        login: state.identity.is_some(),
    }))
}

async fn sumup_status(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<SumUpStatus>> {
    current.authorize(Module::Admin, AccessLevel::Read)?;

    Ok(Json(state.sumup.status()))
}

async fn sumup_transactions(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    current.authorize(Module::Admin, AccessLevel::Read)?;

    Ok(Json(state.sumup.list_transactions().await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/google/status", get(google_status))
        .route("/sumup/status", get(sumup_status))
        .route("/sumup/transactions", get(sumup_transactions))
}
