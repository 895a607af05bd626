pub use sea_orm_migration::prelude::*;

use sea_orm_migration::sea_orm::{EntityTrait, Schema};

mod m20240301_000001_create_access_tables;
mod m20240301_000002_create_reservations_table;
mod m20240301_000003_create_tasks_table;
mod m20240302_000001_create_cheffing_tables;
mod m20240302_000002_add_cheffing_checks;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_access_tables::Migration),
            Box::new(m20240301_000002_create_reservations_table::Migration),
            Box::new(m20240301_000003_create_tasks_table::Migration),
            Box::new(m20240302_000001_create_cheffing_tables::Migration),
            Box::new(m20240302_000002_add_cheffing_checks::Migration),
        ]
    }
}

/// Create the table of an entity together with the indexes it declares
pub(crate) async fn create_entity_table<E>(
    manager: &SchemaManager<'_>,
    entity: E,
) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let schema = Schema::new(manager.get_database_backend());

    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await?;

    for stmt in schema.create_index_from_entity(entity) {
        manager.create_index(stmt).await?;
    }

    Ok(())
}

pub(crate) async fn drop_entity_table<E>(
    manager: &SchemaManager<'_>,
    entity: E,
) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    manager
        .drop_table(
            Table::drop()
                .table(Alias::new(entity.table_name()))
                .if_exists()
                .to_owned(),
        )
        .await
}
