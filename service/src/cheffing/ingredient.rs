use ::entity::{ingredient, sea_orm_active_enums::Unit};
use rust_decimal::Decimal;
use sea_orm::*;
use serde::Deserialize;

use super::{
    costing::CostBook,
    validate::{name, positive, waste_pct},
};
use crate::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientInput {
    pub name: String,
    pub purchase_unit: Unit,
    pub purchase_quantity: Decimal,
    pub purchase_price: Decimal,
    #[serde(default)]
    pub waste_pct: Decimal,
}

impl IngredientInput {
    fn into_active_model(self) -> Result<ingredient::ActiveModel, ServiceError> {
        if self.purchase_price < Decimal::ZERO {
            return Err(ServiceError::validation("Purchase price cannot be negative"));
        }

        Ok(ingredient::ActiveModel {
            name: Set(name(&self.name, "Ingredient")?),
            purchase_unit: Set(self.purchase_unit),
            purchase_quantity: Set(positive(self.purchase_quantity, "Purchase quantity")?),
            purchase_price: Set(self.purchase_price),
            waste_pct: Set(waste_pct(self.waste_pct)?),
            ..Default::default()
        })
    }
}

pub struct IngredientQuery;

impl IngredientQuery {
    pub async fn list(db: &DbConn) -> Result<Vec<ingredient::Model>, ServiceError> {
        Ok(ingredient::Entity::find()
            .order_by_asc(ingredient::Column::Name)
            .all(db)
            .await?)
    }

    pub async fn find_by_id(db: &DbConn, id: i32) -> Result<ingredient::Model, ServiceError> {
        ingredient::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Ingredient", id))
    }
}

pub struct IngredientMutation;

impl IngredientMutation {
    /// Rejected when the purchase figures cannot be costed
    pub async fn create(
        db: &DbConn,
        input: IngredientInput,
    ) -> Result<ingredient::Model, ServiceError> {
        let model = input.into_active_model()?;

        let txn = db.begin().await?;
        let created = model.insert(&txn).await?;
        CostBook::load(&txn).await?.ingredient_cost(created.id)?;
        txn.commit().await?;

        Ok(created)
    }

    /// Every recipe using the ingredient is costed again before committing,
    /// so a unit change across dimensions is rolled back.
    #[tracing::instrument(skip(db, input))]
    pub async fn update(
        db: &DbConn,
        id: i32,
        input: IngredientInput,
    ) -> Result<ingredient::Model, ServiceError> {
        IngredientQuery::find_by_id(db, id).await?;

        let mut model = input.into_active_model()?;
        model.id = Unchanged(id);

        let txn = db.begin().await?;
        let updated = model.update(&txn).await?;
        CostBook::load(&txn).await?.verify()?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Fails with a conflict while a recipe still uses the ingredient
    pub async fn delete(db: &DbConn, id: i32) -> Result<DeleteResult, ServiceError> {
        let res = ingredient::Entity::delete_by_id(id).exec(db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::NotFound("Ingredient", id));
        }

        Ok(res)
    }
}
