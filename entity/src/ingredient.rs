use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::Unit;

/// A purchased ingredient. `purchase_price` buys `purchase_quantity` of
/// `purchase_unit`, of which `waste_pct` is lost in preparation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "cheffing_ingredients")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_deserializing)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub purchase_unit: Unit,
    #[sea_orm(column_type = "Decimal(Some((14, 4)))")]
    pub purchase_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 4)))")]
    pub purchase_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 4)))")]
    pub waste_pct: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
