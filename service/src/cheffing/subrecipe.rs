use ::entity::{sea_orm_active_enums::Unit, subrecipe, subrecipe_item};
use rust_decimal::Decimal;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    costing::CostBook,
    units::base_factor,
    validate::{name, positive, waste_pct, RecipeLineInput},
};
use crate::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct SubrecipeInput {
    pub name: String,
    pub output_quantity: Decimal,
    pub output_unit: Unit,
    #[serde(default)]
    pub waste_pct: Decimal,
}

impl SubrecipeInput {
    fn into_active_model(self) -> Result<subrecipe::ActiveModel, ServiceError> {
        Ok(subrecipe::ActiveModel {
            name: Set(name(&self.name, "Subrecipe")?),
            output_quantity: Set(positive(self.output_quantity, "Output quantity")?),
            output_unit: Set(self.output_unit),
            waste_pct: Set(waste_pct(self.waste_pct)?),
            ..Default::default()
        })
    }
}

/// A subrecipe with its lines and rolled-up cost
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubrecipeDetail {
    #[serde(flatten)]
    pub subrecipe: subrecipe::Model,
    pub items: Vec<subrecipe_item::Model>,
    /// Cost of one `output_unit` of usable output
    pub cost_per_output_unit: Decimal,
}

pub struct SubrecipeQuery;

impl SubrecipeQuery {
    pub async fn list(db: &DbConn) -> Result<Vec<subrecipe::Model>, ServiceError> {
        Ok(subrecipe::Entity::find()
            .order_by_asc(subrecipe::Column::Name)
            .all(db)
            .await?)
    }

    pub async fn find_by_id(db: &DbConn, id: i32) -> Result<subrecipe::Model, ServiceError> {
        subrecipe::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Subrecipe", id))
    }

    pub async fn find_detail(db: &DbConn, id: i32) -> Result<SubrecipeDetail, ServiceError> {
        let subrecipe = Self::find_by_id(db, id).await?;
        let items = subrecipe_item::Entity::find()
            .filter(subrecipe_item::Column::SubrecipeId.eq(id))
            .order_by_asc(subrecipe_item::Column::Id)
            .all(db)
            .await?;
        let cost = CostBook::load(db).await?.subrecipe_cost(id)?;
        let cost_per_output_unit = cost
            .per_base_unit
            .checked_mul(base_factor(subrecipe.output_unit))
            .ok_or_else(|| {
                ServiceError::Costing(format!("Subrecipe '{}' cost overflows", subrecipe.name))
            })?;

        Ok(SubrecipeDetail {
            cost_per_output_unit: cost_per_output_unit.round_dp(4),
            subrecipe,
            items,
        })
    }
}

pub struct SubrecipeMutation;

impl SubrecipeMutation {
    pub async fn create(
        db: &DbConn,
        input: SubrecipeInput,
    ) -> Result<subrecipe::Model, ServiceError> {
        Ok(input.into_active_model()?.insert(db).await?)
    }

    /// Changing the output unit across dimensions is checked against every
    /// recipe using the subrecipe before committing.
    pub async fn update(
        db: &DbConn,
        id: i32,
        input: SubrecipeInput,
    ) -> Result<subrecipe::Model, ServiceError> {
        SubrecipeQuery::find_by_id(db, id).await?;

        let mut model = input.into_active_model()?;
        model.id = Unchanged(id);

        let txn = db.begin().await?;
        let updated = model.update(&txn).await?;
        CostBook::load(&txn).await?.verify()?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Fails with a conflict while another recipe uses the subrecipe
    pub async fn delete(db: &DbConn, id: i32) -> Result<DeleteResult, ServiceError> {
        let res = subrecipe::Entity::delete_by_id(id).exec(db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::NotFound("Subrecipe", id));
        }

        Ok(res)
    }

    /// Replace all lines of subrecipe `id`.
    ///
    /// The new lines are written and costed inside one transaction, so a
    /// line that closes a cycle or mixes dimensions leaves the old lines in
    /// place.
    #[tracing::instrument(skip(db, lines), fields(lines = lines.len()))]
    pub async fn replace_items(
        db: &DbConn,
        id: i32,
        lines: Vec<RecipeLineInput>,
    ) -> Result<SubrecipeDetail, ServiceError> {
        SubrecipeQuery::find_by_id(db, id).await?;

        for line in &lines {
            line.validate()?;
            if line.subrecipe_id == Some(id) {
                return Err(ServiceError::validation(
                    "A subrecipe cannot contain itself",
                ));
            }
        }

        let txn = db.begin().await?;

        subrecipe_item::Entity::delete_many()
            .filter(subrecipe_item::Column::SubrecipeId.eq(id))
            .exec(&txn)
            .await?;

        if !lines.is_empty() {
            subrecipe_item::Entity::insert_many(lines.into_iter().map(|line| {
                subrecipe_item::ActiveModel {
                    subrecipe_id: Set(id),
                    ingredient_id: Set(line.ingredient_id),
                    component_subrecipe_id: Set(line.subrecipe_id),
                    quantity: Set(line.quantity),
                    unit: Set(line.unit),
                    ..Default::default()
                }
            }))
            .exec(&txn)
            .await?;
        }

        // recipes using this subrecipe must still cost
        CostBook::load(&txn).await?.verify()?;

        txn.commit().await?;
        debug!(id, "subrecipe lines replaced");

        SubrecipeQuery::find_detail(db, id).await
    }
}
