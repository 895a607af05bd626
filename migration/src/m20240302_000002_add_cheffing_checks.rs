use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (table, constraint, predicate). Constraint names are matched by the
/// service layer to produce readable error messages.
const CHECKS: &[(&str, &str, &str)] = &[
    (
        "cheffing_ingredients",
        "cheffing_ingredients_waste_pct_check",
        "waste_pct >= 0 AND waste_pct < 1",
    ),
    (
        "cheffing_ingredients",
        "cheffing_ingredients_purchase_quantity_check",
        "purchase_quantity > 0",
    ),
    (
        "cheffing_subrecipes",
        "cheffing_subrecipes_waste_pct_check",
        "waste_pct >= 0 AND waste_pct < 1",
    ),
    (
        "cheffing_subrecipes",
        "cheffing_subrecipes_output_quantity_check",
        "output_quantity > 0",
    ),
    (
        "cheffing_dishes",
        "cheffing_dishes_servings_check",
        "servings > 0",
    ),
    (
        "cheffing_dishes",
        "cheffing_dishes_vat_rate_check",
        "vat_rate >= 0 AND vat_rate < 1",
    ),
    (
        "cheffing_subrecipe_items",
        "cheffing_subrecipe_items_component_check",
        "(ingredient_id IS NULL) <> (component_subrecipe_id IS NULL)",
    ),
    (
        "cheffing_dish_items",
        "cheffing_dish_items_component_check",
        "(ingredient_id IS NULL) <> (subrecipe_id IS NULL)",
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite cannot add constraints to an existing table
        if manager.get_database_backend() != DbBackend::Postgres {
            return Ok(());
        }

        let db = manager.get_connection();
        for (table, name, predicate) in CHECKS {
            db.execute_unprepared(&format!(
                r#"ALTER TABLE "{table}" ADD CONSTRAINT "{name}" CHECK ({predicate})"#
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DbBackend::Postgres {
            return Ok(());
        }

        let db = manager.get_connection();
        for (table, name, _) in CHECKS {
            db.execute_unprepared(&format!(
                r#"ALTER TABLE "{table}" DROP CONSTRAINT IF EXISTS "{name}""#
            ))
            .await?;
        }

        Ok(())
    }
}
