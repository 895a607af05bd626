//! Allowlist authorization.
//!
//! Every request resolves to at most one row of `app_allowed_users`, found
//! by normalized email. [`evaluate`] turns that row into a [`Decision`] for a
//! module and access level; the HTTP layer maps decisions to 403 responses
//! carrying the page the user should be sent to instead.

mod allowlist;
mod session;

pub use allowlist::*;
pub use session::*;

use ::entity::{allowed_user, sea_orm_active_enums::Role};
use serde::Serialize;

/// Where users without any usable module are sent
pub const NO_ACCESS_PATH: &str = "/no-access";

/// A functional area of the back-office guarded by its own flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Module {
    Reservations,
    Tasks,
    Cheffing,
    /// Allowlist management and integrations; admins only
    Admin,
}

impl Module {
    pub fn landing_path(self) -> &'static str {
        match self {
            Self::Reservations => "/reservations",
            Self::Tasks => "/tasks",
            Self::Cheffing => "/cheffing",
            Self::Admin => "/admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotAllowlisted,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Known user without access to this module; send them to their own page
    Redirect(&'static str),
    Deny(DenyReason),
}

/// Trim and lowercase, the form emails are stored and compared in
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn validate_email(email: &str) -> Result<String, crate::ServiceError> {
    let email = normalize_email(email);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(crate::ServiceError::validation(format!(
            "'{email}' is not a valid email address"
        ))),
    }
}

fn module_flag(user: &allowed_user::Model, module: Module) -> bool {
    match module {
        Module::Reservations => user.can_reservations,
        Module::Tasks => user.can_tasks,
        Module::Cheffing => user.can_cheffing,
        Module::Admin => user.role == Role::Admin,
    }
}

/// Decide whether `user` may use `module` at `level`
pub fn evaluate(
    user: Option<&allowed_user::Model>,
    module: Module,
    level: AccessLevel,
) -> Decision {
    let user = match user {
        Some(user) => user,
        None => return Decision::Deny(DenyReason::NotAllowlisted),
    };

    if !user.is_active {
        return Decision::Deny(DenyReason::Inactive);
    }

    if user.role == Role::Admin {
        return Decision::Allow;
    }

    if module == Module::Admin {
        return Decision::Redirect(default_landing(user));
    }

    if user.role == Role::Viewer && level == AccessLevel::Write {
        return Decision::Redirect(default_landing(user));
    }

    if module_flag(user, module) {
        Decision::Allow
    } else {
        Decision::Redirect(default_landing(user))
    }
}

/// The first page the user can open
pub fn default_landing(user: &allowed_user::Model) -> &'static str {
    if !user.is_active {
        return NO_ACCESS_PATH;
    }
    if user.role == Role::Admin {
        return Module::Admin.landing_path();
    }

    [Module::Reservations, Module::Tasks, Module::Cheffing]
        .into_iter()
        .find(|module| module_flag(user, *module))
        .map(Module::landing_path)
        .unwrap_or(NO_ACCESS_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn user(role: Role) -> allowed_user::Model {
        allowed_user::Model {
            id: 1,
            email: "chef@venue.test".to_owned(),
            role,
            is_active: true,
            can_reservations: false,
            can_tasks: true,
            can_cheffing: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Chef@Venue.TEST "), "chef@venue.test");
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@venue.test").is_err());
        assert_eq!(validate_email(" A@B.c").unwrap(), "a@b.c");
    }

    #[test]
    fn missing_or_inactive_users_are_denied() {
        assert_eq!(
            evaluate(None, Module::Tasks, AccessLevel::Read),
            Decision::Deny(DenyReason::NotAllowlisted)
        );

        let mut inactive = user(Role::Admin);
        inactive.is_active = false;
        assert_eq!(
            evaluate(Some(&inactive), Module::Tasks, AccessLevel::Read),
            Decision::Deny(DenyReason::Inactive)
        );
    }

    #[test]
    fn admins_can_do_everything() {
        let admin = user(Role::Admin);
        for module in [Module::Reservations, Module::Tasks, Module::Cheffing, Module::Admin] {
            assert_eq!(evaluate(Some(&admin), module, AccessLevel::Write), Decision::Allow);
        }
        assert_eq!(default_landing(&admin), "/admin");
    }

    #[test]
    fn staff_follow_their_module_flags() {
        let staff = user(Role::Staff);

        assert_eq!(evaluate(Some(&staff), Module::Tasks, AccessLevel::Write), Decision::Allow);
        assert_eq!(
            evaluate(Some(&staff), Module::Reservations, AccessLevel::Read),
            Decision::Redirect("/tasks")
        );
        assert_eq!(
            evaluate(Some(&staff), Module::Admin, AccessLevel::Read),
            Decision::Redirect("/tasks")
        );
    }

    #[test]
    fn viewers_are_read_only() {
        let viewer = user(Role::Viewer);

        assert_eq!(evaluate(Some(&viewer), Module::Cheffing, AccessLevel::Read), Decision::Allow);
        assert_eq!(
            evaluate(Some(&viewer), Module::Cheffing, AccessLevel::Write),
            Decision::Redirect("/tasks")
        );
    }

    #[test]
    fn users_without_flags_land_on_no_access() {
        let mut staff = user(Role::Staff);
        staff.can_tasks = false;
        staff.can_cheffing = false;

        assert_eq!(default_landing(&staff), NO_ACCESS_PATH);
        assert_eq!(
            evaluate(Some(&staff), Module::Cheffing, AccessLevel::Read),
            Decision::Redirect(NO_ACCESS_PATH)
        );
    }
}
