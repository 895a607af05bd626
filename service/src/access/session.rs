use ::entity::session;
use chrono::{DateTime, Duration, Utc};
use sea_orm::*;
use tracing::debug;
use uuid::Uuid;

use super::normalize_email;
use crate::ServiceError;

pub struct SessionQuery;

impl SessionQuery {
    /// The session behind `token`, unless it has expired at `now`
    pub async fn resolve(
        db: &DbConn,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<session::Model>, ServiceError> {
        Ok(session::Entity::find_by_id(token.to_owned())
            .filter(session::Column::ExpiresAt.gt(now))
            .one(db)
            .await?)
    }
}

pub struct SessionMutation;

impl SessionMutation {
    /// Open a session for `email` valid for `ttl`, dropping expired ones first
    pub async fn create(
        db: &DbConn,
        email: &str,
        ttl: Duration,
    ) -> Result<session::Model, ServiceError> {
        let now = Utc::now();

        let purged = session::Entity::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(db)
            .await?;
        if purged.rows_affected > 0 {
            debug!(rows = purged.rows_affected, "expired sessions purged");
        }

        Ok(session::ActiveModel {
            token: Set(Uuid::new_v4().simple().to_string()),
            email: Set(normalize_email(email)),
            created_at: Set(now),
            expires_at: Set(now + ttl),
        }
        .insert(db)
        .await?)
    }

    pub async fn delete(db: &DbConn, token: &str) -> Result<DeleteResult, ServiceError> {
        Ok(session::Entity::delete_by_id(token.to_owned()).exec(db).await?)
    }
}
