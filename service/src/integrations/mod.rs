//! Third-party services: Google Calendar for reservations, SumUp (stub).

mod google_calendar;
mod sumup;

use ::entity::reservation;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::DbConn;
use serde::Serialize;
use tracing::{debug, info};

pub use google_calendar::{GoogleCalendar, GoogleCalendarConfig};
pub use sumup::{SumUpClient, SumUpStatus};

use crate::{reservation::ReservationMutation, ServiceError};

/// The calendar view of a reservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarEvent {
    pub fn from_reservation(reservation: &reservation::Model) -> Self {
        let mut lines = Vec::new();
        if let Some(notes) = &reservation.notes {
            lines.push(notes.clone());
        }
        if let Some(email) = &reservation.guest_email {
            lines.push(format!("Email: {email}"));
        }
        if let Some(phone) = &reservation.guest_phone {
            lines.push(format!("Phone: {phone}"));
        }

        Self {
            summary: format!(
                "{} ({} guests)",
                reservation.guest_name, reservation.party_size
            ),
            description: (!lines.is_empty()).then(|| lines.join("\n")),
            start: reservation.starts_at,
            end: reservation.starts_at + Duration::minutes(reservation.duration_minutes.into()),
        }
    }
}

/// A calendar that mirrors reservations as events
#[async_trait]
pub trait CalendarSync: Send + Sync {
    fn is_enabled(&self) -> bool;

    /// Create the event, or replace it when `event_id` is known; returns the
    /// event id to store
    async fn upsert_event(
        &self,
        event_id: Option<&str>,
        event: &CalendarEvent,
    ) -> Result<String, ServiceError>;

    /// Removing an event that is already gone succeeds
    async fn delete_event(&self, event_id: &str) -> Result<(), ServiceError>;
}

/// Used when no calendar is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCalendar;

#[async_trait]
impl CalendarSync for DisabledCalendar {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn upsert_event(
        &self,
        _: Option<&str>,
        _: &CalendarEvent,
    ) -> Result<String, ServiceError> {
        Err(ServiceError::NotImplemented("Calendar sync"))
    }

    async fn delete_event(&self, _: &str) -> Result<(), ServiceError> {
        Err(ServiceError::NotImplemented("Calendar sync"))
    }
}

/// Bring the calendar in line with `reservation` and store the event id.
///
/// Cancelled and no-show reservations lose their event. Does nothing when the
/// calendar is disabled.
#[tracing::instrument(skip_all, fields(reservation = reservation.id))]
pub async fn sync_reservation(
    db: &DbConn,
    calendar: &dyn CalendarSync,
    reservation: reservation::Model,
) -> Result<reservation::Model, ServiceError> {
    if !calendar.is_enabled() {
        debug!("calendar sync disabled");
        return Ok(reservation);
    }

    if reservation.status.releases_slot() {
        let Some(event_id) = reservation.calendar_event_id.clone() else {
            return Ok(reservation);
        };
        calendar.delete_event(&event_id).await?;
        info!(%event_id, "calendar event removed");
        return ReservationMutation::set_calendar_event_id(db, reservation, None).await;
    }

    let event = CalendarEvent::from_reservation(&reservation);
    let event_id = calendar
        .upsert_event(reservation.calendar_event_id.as_deref(), &event)
        .await?;
    debug!(%event_id, "calendar event written");

    ReservationMutation::set_calendar_event_id(db, reservation, Some(event_id)).await
}

/// Remove the event of a reservation that was deleted
pub async fn remove_reservation_event(
    calendar: &dyn CalendarSync,
    reservation: &reservation::Model,
) -> Result<(), ServiceError> {
    match (&reservation.calendar_event_id, calendar.is_enabled()) {
        (Some(event_id), true) => calendar.delete_event(event_id).await,
        _ => Ok(()),
    }
}
