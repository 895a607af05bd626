use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use entity::allowed_user;
use venue_office_service::access::{
    AccessLevel, AccessMutation, AccessQuery, AllowedUserInput, AllowedUserPatch, Module,
};

use crate::{auth::CurrentUser, error::ApiResult, state::AppState};

async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<allowed_user::Model>>> {
    current.authorize(Module::Admin, AccessLevel::Read)?;

    Ok(Json(AccessQuery::list(&state.conn).await?))
}

async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<AllowedUserInput>,
) -> ApiResult<(StatusCode, Json<allowed_user::Model>)> {
    current.authorize(Module::Admin, AccessLevel::Write)?;

    let created = AccessMutation::create(&state.conn, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(patch): Json<AllowedUserPatch>,
) -> ApiResult<Json<allowed_user::Model>> {
    current.authorize(Module::Admin, AccessLevel::Write)?;

    Ok(Json(
        AccessMutation::update(&state.conn, current.email(), id, patch).await?,
    ))
}

async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    current.authorize(Module::Admin, AccessLevel::Write)?;

    AccessMutation::delete(&state.conn, current.email(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(create))
        .route("/users/{id}", put(update).delete(delete))
}
