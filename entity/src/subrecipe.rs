use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::Unit;

/// An intermediate preparation (stock, sauce, dough) yielding
/// `output_quantity` of `output_unit` before `waste_pct` loss.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "cheffing_subrecipes")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_deserializing)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((14, 4)))")]
    pub output_quantity: Decimal,
    pub output_unit: Unit,
    #[sea_orm(column_type = "Decimal(Some((5, 4)))")]
    pub waste_pct: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
