use entity::{dish, dish_item, dish_sale, ingredient, subrecipe, subrecipe_item};
use sea_orm_migration::prelude::*;

use crate::{create_entity_table, drop_entity_table};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // referenced tables first
        create_entity_table(manager, ingredient::Entity).await?;
        create_entity_table(manager, subrecipe::Entity).await?;
        create_entity_table(manager, subrecipe_item::Entity).await?;
        create_entity_table(manager, dish::Entity).await?;
        create_entity_table(manager, dish_item::Entity).await?;
        create_entity_table(manager, dish_sale::Entity).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_entity_table(manager, dish_sale::Entity).await?;
        drop_entity_table(manager, dish_item::Entity).await?;
        drop_entity_table(manager, dish::Entity).await?;
        drop_entity_table(manager, subrecipe_item::Entity).await?;
        drop_entity_table(manager, subrecipe::Entity).await?;
        drop_entity_table(manager, ingredient::Entity).await
    }
}
