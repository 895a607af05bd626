use ::entity::{reservation, sea_orm_active_enums::ReservationStatus};
use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::Deserialize;

use crate::{access::validate_email, ServiceError};

/// Create / update payload of a reservation
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationInput {
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub party_size: i32,
    pub starts_at: DateTime<Utc>,
    /// Falls back to the configured default length
    pub duration_minutes: Option<i32>,
    pub status: Option<ReservationStatus>,
    pub notes: Option<String>,
}

struct ValidReservation {
    guest_name: String,
    guest_email: Option<String>,
    guest_phone: Option<String>,
    party_size: i32,
    starts_at: DateTime<Utc>,
    duration_minutes: i32,
    status: Option<ReservationStatus>,
    notes: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl ReservationInput {
    fn validate(self, default_minutes: i32) -> Result<ValidReservation, ServiceError> {
        let guest_name = self.guest_name.trim().to_owned();
        if guest_name.is_empty() {
            return Err(ServiceError::validation("Guest name is required"));
        }
        if self.party_size <= 0 {
            return Err(ServiceError::validation(
                "Party size must be greater than zero",
            ));
        }
        let duration_minutes = self.duration_minutes.unwrap_or(default_minutes);
        if duration_minutes <= 0 {
            return Err(ServiceError::validation(
                "Duration must be greater than zero",
            ));
        }
        let guest_email = non_blank(self.guest_email)
            .map(|email| validate_email(&email))
            .transpose()?;

        Ok(ValidReservation {
            guest_name,
            guest_email,
            guest_phone: non_blank(self.guest_phone),
            party_size: self.party_size,
            starts_at: self.starts_at,
            duration_minutes,
            status: self.status,
            notes: non_blank(self.notes),
        })
    }
}

pub struct ReservationQuery;

impl ReservationQuery {
    pub async fn find_by_id(db: &DbConn, id: i32) -> Result<reservation::Model, ServiceError> {
        reservation::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Reservation", id))
    }

    /// Reservations starting in `[from, to)`, earliest first
    pub async fn find_in_range(
        db: &DbConn,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<reservation::Model>, ServiceError> {
        let mut query = reservation::Entity::find()
            .filter(reservation::Column::StartsAt.gte(from))
            .filter(reservation::Column::StartsAt.lt(to));

        if let Some(status) = status {
            query = query.filter(reservation::Column::Status.eq(status));
        }

        Ok(query
            .order_by_asc(reservation::Column::StartsAt)
            .order_by_asc(reservation::Column::Id)
            .all(db)
            .await?)
    }
}

pub struct ReservationMutation;

impl ReservationMutation {
    #[tracing::instrument(skip(db, input))]
    pub async fn create(
        db: &DbConn,
        input: ReservationInput,
        created_by: &str,
        default_minutes: i32,
    ) -> Result<reservation::Model, ServiceError> {
        let input = input.validate(default_minutes)?;

        Ok(reservation::ActiveModel {
            guest_name: Set(input.guest_name),
            guest_email: Set(input.guest_email),
            guest_phone: Set(input.guest_phone),
            party_size: Set(input.party_size),
            starts_at: Set(input.starts_at),
            duration_minutes: Set(input.duration_minutes),
            status: Set(input.status.unwrap_or(ReservationStatus::Pending)),
            notes: Set(input.notes),
            calendar_event_id: Set(None),
            created_by: Set(created_by.to_owned()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?)
    }

    #[tracing::instrument(skip(db, input))]
    pub async fn update(
        db: &DbConn,
        id: i32,
        input: ReservationInput,
        default_minutes: i32,
    ) -> Result<reservation::Model, ServiceError> {
        let input = input.validate(default_minutes)?;
        let mut model: reservation::ActiveModel =
            ReservationQuery::find_by_id(db, id).await?.into();

        model.guest_name = Set(input.guest_name);
        model.guest_email = Set(input.guest_email);
        model.guest_phone = Set(input.guest_phone);
        model.party_size = Set(input.party_size);
        model.starts_at = Set(input.starts_at);
        model.duration_minutes = Set(input.duration_minutes);
        model.notes = Set(input.notes);
        if let Some(status) = input.status {
            model.status = Set(status);
        }

        Ok(model.update(db).await?)
    }

    pub async fn set_status(
        db: &DbConn,
        id: i32,
        status: ReservationStatus,
    ) -> Result<reservation::Model, ServiceError> {
        let mut model: reservation::ActiveModel =
            ReservationQuery::find_by_id(db, id).await?.into();
        model.status = Set(status);

        Ok(model.update(db).await?)
    }

    pub async fn set_calendar_event_id(
        db: &DbConn,
        reservation: reservation::Model,
        event_id: Option<String>,
    ) -> Result<reservation::Model, ServiceError> {
        if reservation.calendar_event_id == event_id {
            return Ok(reservation);
        }
        let mut model: reservation::ActiveModel = reservation.into();
        model.calendar_event_id = Set(event_id);

        Ok(model.update(db).await?)
    }

    /// Delete and hand back the removed row, so its calendar event can follow
    pub async fn delete(db: &DbConn, id: i32) -> Result<reservation::Model, ServiceError> {
        let reservation = ReservationQuery::find_by_id(db, id).await?;
        reservation.clone().delete(db).await?;

        Ok(reservation)
    }
}
