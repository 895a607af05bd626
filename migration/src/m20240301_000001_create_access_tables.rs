use entity::{allowed_user, session};
use sea_orm_migration::prelude::*;

use crate::{create_entity_table, drop_entity_table};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_entity_table(manager, allowed_user::Entity).await?;
        create_entity_table(manager, session::Entity).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_entity_table(manager, session::Entity).await?;
        drop_entity_table(manager, allowed_user::Entity).await
    }
}
