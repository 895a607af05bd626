use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// An error from a back-office operation
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The database call failed; the driver message is kept as is
    #[error("{0}")]
    Db(DbErr),
    /// Input was rejected before reaching the database
    #[error("{0}")]
    Validation(String),
    #[error("{0} {1} not found")]
    NotFound(&'static str, i32),
    /// A database constraint fired, already translated for humans
    #[error("{0}")]
    Conflict(String),
    /// Cost rollup could not be computed
    #[error("Costing error: {0}")]
    Costing(String),
    /// An external service replied with an error
    #[error("Integration error: {0}")]
    Integration(String),
    #[error("{0} is not available")]
    NotImplemented(&'static str),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Classify a database error, translating known constraint violations
    pub fn from_db(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(raw)) => Self::Conflict(
                constraint_message(&raw)
                    .unwrap_or("A record with the same value already exists")
                    .to_owned(),
            ),
            Some(SqlErr::ForeignKeyConstraintViolation(raw)) => Self::Conflict(
                constraint_message(&raw)
                    .unwrap_or("The record is still referenced, or references a missing record")
                    .to_owned(),
            ),
            _ => match constraint_message(&err.to_string()) {
                Some(message) => Self::Conflict(message.to_owned()),
                None => Self::Db(err),
            },
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        Self::from_db(err)
    }
}

/// Known constraints, by the fragments under which the drivers report them.
///
/// Postgres names a column `UNIQUE` as `<table>_<column>_key` while SQLite
/// reports `<table>.<column>`; foreign keys are created as
/// `fk-<table>-<column>`. Check constraints only exist on Postgres.
const CONSTRAINT_MESSAGES: &[(&[&str], &str)] = &[
    (
        &["app_allowed_users_email_key", "app_allowed_users.email"],
        "This email is already on the allowlist",
    ),
    (
        &["cheffing_ingredients_name_key", "cheffing_ingredients.name"],
        "An ingredient with this name already exists",
    ),
    (
        &["cheffing_subrecipes_name_key", "cheffing_subrecipes.name"],
        "A subrecipe with this name already exists",
    ),
    (
        &["cheffing_dishes_name_key", "cheffing_dishes.name"],
        "A dish with this name already exists",
    ),
    (
        &[
            "fk-cheffing_subrecipe_items-ingredient_id",
            "fk-cheffing_dish_items-ingredient_id",
        ],
        "The ingredient is used by a recipe, or does not exist",
    ),
    (
        &[
            "fk-cheffing_subrecipe_items-component_subrecipe_id",
            "fk-cheffing_dish_items-subrecipe_id",
        ],
        "The subrecipe is used by another recipe, or does not exist",
    ),
    (
        &[
            "fk-cheffing_subrecipe_items-subrecipe_id",
            "fk-cheffing_dish_items-dish_id",
            "fk-cheffing_dish_sales-dish_id",
        ],
        "The recipe does not exist",
    ),
    (
        &[
            "cheffing_ingredients_waste_pct_check",
            "cheffing_subrecipes_waste_pct_check",
        ],
        "Waste must be at least 0% and below 100%",
    ),
    (
        &["cheffing_ingredients_purchase_quantity_check"],
        "Purchase quantity must be greater than zero",
    ),
    (
        &["cheffing_subrecipes_output_quantity_check"],
        "Output quantity must be greater than zero",
    ),
    (
        &["cheffing_dishes_servings_check"],
        "Servings must be greater than zero",
    ),
    (
        &["cheffing_dishes_vat_rate_check"],
        "VAT must be at least 0% and below 100%",
    ),
    (
        &[
            "cheffing_subrecipe_items_component_check",
            "cheffing_dish_items_component_check",
        ],
        "Each recipe line must reference exactly one ingredient or subrecipe",
    ),
];

pub(crate) fn constraint_message(raw: &str) -> Option<&'static str> {
    CONSTRAINT_MESSAGES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| raw.contains(needle)))
        .map(|(_, message)| *message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn postgres_and_sqlite_spellings_match_the_same_row() {
        assert_eq!(
            constraint_message(
                r#"duplicate key value violates unique constraint "cheffing_dishes_name_key""#
            ),
            Some("A dish with this name already exists")
        );
        assert_eq!(
            constraint_message("UNIQUE constraint failed: cheffing_dishes.name"),
            Some("A dish with this name already exists")
        );
    }

    #[test]
    fn foreign_key_names_are_matched() {
        assert_eq!(
            constraint_message(
                r#"update or delete on table "cheffing_ingredients" violates foreign key constraint "fk-cheffing_dish_items-ingredient_id" on table "cheffing_dish_items""#
            ),
            Some("The ingredient is used by a recipe, or does not exist")
        );
    }

    #[test]
    fn unknown_errors_are_forwarded() {
        let err = ServiceError::from_db(DbErr::Custom("connection reset".to_owned()));

        assert!(matches!(err, ServiceError::Db(_)));
        assert_eq!(err.to_string(), "Custom Error: connection reset");
    }

    #[test]
    fn check_violations_become_conflicts() {
        let err = ServiceError::from_db(DbErr::Custom(
            r#"new row for relation "cheffing_dishes" violates check constraint "cheffing_dishes_servings_check""#
                .to_owned(),
        ));

        assert!(
            matches!(err, ServiceError::Conflict(m) if m == "Servings must be greater than zero")
        );
    }
}
