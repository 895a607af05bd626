use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use entity::{
    sea_orm_active_enums::{TaskBoard, TaskStatus},
    task,
};
use serde::Deserialize;
use venue_office_service::{
    access::{AccessLevel, Module},
    BoardSummary, TaskInput, TaskMutation, TaskQuery,
};

use crate::{auth::CurrentUser, error::ApiResult, state::AppState};

#[derive(Deserialize)]
struct BoardParams {
    status: Option<TaskStatus>,
}

#[derive(Deserialize)]
struct Move {
    status: TaskStatus,
}

async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(board): Path<TaskBoard>,
    Query(params): Query<BoardParams>,
) -> ApiResult<Json<Vec<task::Model>>> {
    current.authorize(Module::Tasks, AccessLevel::Read)?;

    Ok(Json(
        TaskQuery::list_board(&state.conn, board, params.status).await?,
    ))
}

async fn summary(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(board): Path<TaskBoard>,
) -> ApiResult<Json<BoardSummary>> {
    current.authorize(Module::Tasks, AccessLevel::Read)?;

    Ok(Json(TaskQuery::board_summary(&state.conn, board).await?))
}

async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(board): Path<TaskBoard>,
    Json(input): Json<TaskInput>,
) -> ApiResult<(StatusCode, Json<task::Model>)> {
    current.authorize(Module::Tasks, AccessLevel::Write)?;

    let task = TaskMutation::create(&state.conn, board, input, current.email()).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<TaskInput>,
) -> ApiResult<Json<task::Model>> {
    current.authorize(Module::Tasks, AccessLevel::Write)?;

    Ok(Json(TaskMutation::update(&state.conn, id, input).await?))
}

async fn move_to(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(target): Json<Move>,
) -> ApiResult<Json<task::Model>> {
    current.authorize(Module::Tasks, AccessLevel::Write)?;

    Ok(Json(
        TaskMutation::move_to(&state.conn, id, target.status).await?,
    ))
}

async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    current.authorize(Module::Tasks, AccessLevel::Write)?;

    TaskMutation::delete(&state.conn, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/item/{id}", put(update).delete(delete))
        .route("/item/{id}/move", post(move_to))
        .route("/{board}", get(list).post(create))
        .route("/{board}/summary", get(summary))
}
