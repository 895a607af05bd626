use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ReservationStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_deserializing)]
    pub id: i32,
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub party_size: i32,
    #[sea_orm(indexed)]
    pub starts_at: DateTimeUtc,
    pub duration_minutes: i32,
    pub status: ReservationStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// Id of the mirrored Google Calendar event, once synced
    pub calendar_event_id: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
