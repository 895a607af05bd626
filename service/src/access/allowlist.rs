use ::entity::{allowed_user, sea_orm_active_enums::Role};
use chrono::Utc;
use sea_orm::*;
use serde::Deserialize;
use tracing::info;

use super::{normalize_email, validate_email};
use crate::ServiceError;

/// Payload of the admin screen creating an allowlist entry
#[derive(Debug, Clone, Deserialize)]
pub struct AllowedUserInput {
    pub email: String,
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub can_reservations: bool,
    #[serde(default)]
    pub can_tasks: bool,
    #[serde(default)]
    pub can_cheffing: bool,
}

fn default_true() -> bool {
    true
}

/// Partial update of an allowlist entry; the email is immutable
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllowedUserPatch {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub can_reservations: Option<bool>,
    pub can_tasks: Option<bool>,
    pub can_cheffing: Option<bool>,
}

impl AllowedUserPatch {
    fn revokes_admin(&self) -> bool {
        matches!(self.role, Some(role) if role != Role::Admin) || self.is_active == Some(false)
    }
}

pub struct AccessQuery;

impl AccessQuery {
    pub async fn find_by_email(
        db: &DbConn,
        email: &str,
    ) -> Result<Option<allowed_user::Model>, ServiceError> {
        Ok(allowed_user::Entity::find()
            .filter(allowed_user::Column::Email.eq(normalize_email(email)))
            .one(db)
            .await?)
    }

    pub async fn find_by_id(db: &DbConn, id: i32) -> Result<allowed_user::Model, ServiceError> {
        allowed_user::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Allowed user", id))
    }

    pub async fn list(db: &DbConn) -> Result<Vec<allowed_user::Model>, ServiceError> {
        Ok(allowed_user::Entity::find()
            .order_by_asc(allowed_user::Column::Email)
            .all(db)
            .await?)
    }
}

pub struct AccessMutation;

impl AccessMutation {
    #[tracing::instrument(skip(db, input), fields(email = %input.email))]
    pub async fn create(
        db: &DbConn,
        input: AllowedUserInput,
    ) -> Result<allowed_user::Model, ServiceError> {
        let email = validate_email(&input.email)?;

        let model = allowed_user::ActiveModel {
            email: Set(email),
            role: Set(input.role),
            is_active: Set(input.is_active),
            can_reservations: Set(input.can_reservations),
            can_tasks: Set(input.can_tasks),
            can_cheffing: Set(input.can_cheffing),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(id = model.id, role = ?model.role, "allowlist entry created");
        Ok(model)
    }

    /// Apply `patch` to entry `id` on behalf of `actor_email`.
    ///
    /// Admins cannot demote or deactivate themselves, which would lock the
    /// last admin out.
    #[tracing::instrument(skip(db, patch))]
    pub async fn update(
        db: &DbConn,
        actor_email: &str,
        id: i32,
        patch: AllowedUserPatch,
    ) -> Result<allowed_user::Model, ServiceError> {
        let current = AccessQuery::find_by_id(db, id).await?;

        if current.email == normalize_email(actor_email) && patch.revokes_admin() {
            return Err(ServiceError::validation(
                "You cannot remove your own admin access",
            ));
        }

        let mut model: allowed_user::ActiveModel = current.into();
        if let Some(role) = patch.role {
            model.role = Set(role);
        }
        if let Some(is_active) = patch.is_active {
            model.is_active = Set(is_active);
        }
        if let Some(flag) = patch.can_reservations {
            model.can_reservations = Set(flag);
        }
        if let Some(flag) = patch.can_tasks {
            model.can_tasks = Set(flag);
        }
        if let Some(flag) = patch.can_cheffing {
            model.can_cheffing = Set(flag);
        }

        Ok(model.update(db).await?)
    }

    #[tracing::instrument(skip(db))]
    pub async fn delete(
        db: &DbConn,
        actor_email: &str,
        id: i32,
    ) -> Result<DeleteResult, ServiceError> {
        let current = AccessQuery::find_by_id(db, id).await?;

        if current.email == normalize_email(actor_email) {
            return Err(ServiceError::validation(
                "You cannot remove yourself from the allowlist",
            ));
        }

        Ok(current.delete(db).await?)
    }

    /// Make sure `email` is an active admin, creating or promoting the entry
    pub async fn ensure_admin(
        db: &DbConn,
        email: &str,
    ) -> Result<allowed_user::Model, ServiceError> {
        let email = validate_email(email)?;

        match AccessQuery::find_by_email(db, &email).await? {
            Some(existing) if existing.role == Role::Admin && existing.is_active => Ok(existing),
            Some(existing) => {
                let mut model: allowed_user::ActiveModel = existing.into();
                model.role = Set(Role::Admin);
                model.is_active = Set(true);
                let model = model.update(db).await?;
                info!(email = %model.email, "bootstrap admin promoted");
                Ok(model)
            }
            None => {
                Self::create(
                    db,
                    AllowedUserInput {
                        email,
                        role: Role::Admin,
                        is_active: true,
                        can_reservations: true,
                        can_tasks: true,
                        can_cheffing: true,
                    },
                )
                .await
            }
        }
    }
}
