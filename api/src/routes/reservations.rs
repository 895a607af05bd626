use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use entity::{reservation, sea_orm_active_enums::ReservationStatus};
use serde::Deserialize;
use tracing::warn;
use venue_office_service::{
    access::{AccessLevel, Module},
    integrations::{remove_reservation_event, sync_reservation},
    ReservationInput, ReservationMutation, ReservationQuery,
};

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

const DEFAULT_WINDOW_DAYS: i64 = 7;

#[derive(Deserialize)]
struct ListParams {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    status: Option<ReservationStatus>,
}

#[derive(Deserialize)]
struct StatusChange {
    status: ReservationStatus,
}

/// Push to the calendar without letting a failure undo the write
async fn sync_best_effort(state: &AppState, reservation: reservation::Model) -> reservation::Model {
    let fallback = reservation.clone();
    match sync_reservation(&state.conn, state.calendar.as_ref(), reservation).await {
        Ok(synced) => synced,
        Err(err) => {
            warn!(reservation = fallback.id, error = %err, "calendar sync failed");
            fallback
        }
    }
}

async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<reservation::Model>>> {
    current.authorize(Module::Reservations, AccessLevel::Read)?;

    let from = params
        .from
        .unwrap_or_else(|| Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc());
    let to = params.to.unwrap_or(from + Duration::days(DEFAULT_WINDOW_DAYS));
    if to <= from {
        return Err(ApiError::Validation(
            "The end of the range must be after its start".to_owned(),
        ));
    }

    Ok(Json(
        ReservationQuery::find_in_range(&state.conn, from, to, params.status).await?,
    ))
}

async fn get_one(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<reservation::Model>> {
    current.authorize(Module::Reservations, AccessLevel::Read)?;

    Ok(Json(ReservationQuery::find_by_id(&state.conn, id).await?))
}

async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<ReservationInput>,
) -> ApiResult<(StatusCode, Json<reservation::Model>)> {
    current.authorize(Module::Reservations, AccessLevel::Write)?;

    let created = ReservationMutation::create(
        &state.conn,
        input,
        current.email(),
        state.config.reservation_default_minutes,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(sync_best_effort(&state, created).await)))
}

async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<ReservationInput>,
) -> ApiResult<Json<reservation::Model>> {
    current.authorize(Module::Reservations, AccessLevel::Write)?;

    let updated = ReservationMutation::update(
        &state.conn,
        id,
        input,
        state.config.reservation_default_minutes,
    )
    .await?;

    Ok(Json(sync_best_effort(&state, updated).await))
}

async fn set_status(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(change): Json<StatusChange>,
) -> ApiResult<Json<reservation::Model>> {
    current.authorize(Module::Reservations, AccessLevel::Write)?;

    let updated = ReservationMutation::set_status(&state.conn, id, change.status).await?;

    Ok(Json(sync_best_effort(&state, updated).await))
}

async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    current.authorize(Module::Reservations, AccessLevel::Write)?;

    let deleted = ReservationMutation::delete(&state.conn, id).await?;
    if let Err(err) = remove_reservation_event(state.calendar.as_ref(), &deleted).await {
        warn!(reservation = id, error = %err, "calendar event not removed");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Explicit sync; unlike the automatic one it reports failures
async fn calendar_sync(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<reservation::Model>> {
    current.authorize(Module::Reservations, AccessLevel::Write)?;

    if !state.calendar.is_enabled() {
        return Err(ApiError::NotImplemented(
            "Calendar sync is not configured".to_owned(),
        ));
    }
    let reservation = ReservationQuery::find_by_id(&state.conn, id).await?;

    Ok(Json(
        sync_reservation(&state.conn, state.calendar.as_ref(), reservation).await?,
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
        .route("/{id}/status", post(set_status))
        .route("/{id}/calendar-sync", post(calendar_sync))
}
