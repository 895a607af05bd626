use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::Unit;

/// A line of a subrecipe; references either an ingredient or another subrecipe
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "cheffing_subrecipe_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_deserializing)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub subrecipe_id: i32,
    pub ingredient_id: Option<i32>,
    pub component_subrecipe_id: Option<i32>,
    #[sea_orm(column_type = "Decimal(Some((14, 4)))")]
    pub quantity: Decimal,
    pub unit: Unit,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subrecipe::Entity",
        from = "Column::SubrecipeId",
        to = "super::subrecipe::Column::Id",
        on_delete = "Cascade"
    )]
    Subrecipe,
    #[sea_orm(
        belongs_to = "super::subrecipe::Entity",
        from = "Column::ComponentSubrecipeId",
        to = "super::subrecipe::Column::Id",
        on_delete = "Restrict"
    )]
    ComponentSubrecipe,
    #[sea_orm(
        belongs_to = "super::ingredient::Entity",
        from = "Column::IngredientId",
        to = "super::ingredient::Column::Id",
        on_delete = "Restrict"
    )]
    Ingredient,
}

impl ActiveModelBehavior for ActiveModel {}
