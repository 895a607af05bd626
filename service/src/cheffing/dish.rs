use ::entity::{dish, dish_item, dish_sale};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    costing::CostBook,
    menu_engineering::{evaluate_dish, DishFigures, MenuEngineeringRow},
    validate::{fraction, name, RecipeLineInput},
};
use crate::ServiceError;

fn default_servings() -> i32 {
    1
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct DishInput {
    pub name: String,
    pub category: Option<String>,
    pub selling_price: Option<Decimal>,
    #[serde(default)]
    pub vat_rate: Decimal,
    #[serde(default = "default_servings")]
    pub servings: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl DishInput {
    fn into_active_model(self) -> Result<dish::ActiveModel, ServiceError> {
        if self.servings <= 0 {
            return Err(ServiceError::validation(
                "Servings must be greater than zero",
            ));
        }
        if matches!(self.selling_price, Some(price) if price < Decimal::ZERO) {
            return Err(ServiceError::validation(
                "Selling price cannot be negative",
            ));
        }

        Ok(dish::ActiveModel {
            name: Set(name(&self.name, "Dish")?),
            category: Set(self
                .category
                .map(|c| c.trim().to_owned())
                .filter(|c| !c.is_empty())),
            selling_price: Set(self.selling_price),
            vat_rate: Set(fraction(self.vat_rate, "VAT rate")?),
            servings: Set(self.servings),
            is_active: Set(self.is_active),
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DishSalesInput {
    pub sold_on: NaiveDate,
    pub units: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DishDetail {
    #[serde(flatten)]
    pub dish: dish::Model,
    pub items: Vec<dish_item::Model>,
    pub cost_per_serving: Decimal,
    pub evaluation: MenuEngineeringRow,
}

pub struct DishQuery;

impl DishQuery {
    pub async fn list(db: &DbConn) -> Result<Vec<dish::Model>, ServiceError> {
        Ok(dish::Entity::find()
            .order_by_asc(dish::Column::Name)
            .all(db)
            .await?)
    }

    pub async fn find_by_id(db: &DbConn, id: i32) -> Result<dish::Model, ServiceError> {
        dish::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Dish", id))
    }

    pub async fn find_detail(db: &DbConn, id: i32) -> Result<DishDetail, ServiceError> {
        let dish = Self::find_by_id(db, id).await?;
        let items = dish_item::Entity::find()
            .filter(dish_item::Column::DishId.eq(id))
            .order_by_asc(dish_item::Column::Id)
            .all(db)
            .await?;
        let cost_per_serving = CostBook::load(db).await?.dish_cost_per_serving(id)?;

        let evaluation = evaluate_dish(&DishFigures {
            dish_id: dish.id,
            name: dish.name.clone(),
            category: dish.category.clone(),
            selling_price: dish.selling_price,
            vat_rate: dish.vat_rate,
            cost_per_serving,
            units_sold: 0,
        });

        Ok(DishDetail {
            dish,
            items,
            cost_per_serving: cost_per_serving.round_dp(4),
            evaluation,
        })
    }
}

pub struct DishMutation;

impl DishMutation {
    pub async fn create(db: &DbConn, input: DishInput) -> Result<dish::Model, ServiceError> {
        Ok(input.into_active_model()?.insert(db).await?)
    }

    pub async fn update(
        db: &DbConn,
        id: i32,
        input: DishInput,
    ) -> Result<dish::Model, ServiceError> {
        DishQuery::find_by_id(db, id).await?;

        let mut model = input.into_active_model()?;
        model.id = Unchanged(id);

        Ok(model.update(db).await?)
    }

    /// Lines and sales go with the dish
    pub async fn delete(db: &DbConn, id: i32) -> Result<DeleteResult, ServiceError> {
        let res = dish::Entity::delete_by_id(id).exec(db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::NotFound("Dish", id));
        }

        Ok(res)
    }

    /// Replace all lines of dish `id`, rolling back if the dish no longer costs
    #[tracing::instrument(skip(db, lines), fields(lines = lines.len()))]
    pub async fn replace_items(
        db: &DbConn,
        id: i32,
        lines: Vec<RecipeLineInput>,
    ) -> Result<DishDetail, ServiceError> {
        DishQuery::find_by_id(db, id).await?;

        for line in &lines {
            line.validate()?;
        }

        let txn = db.begin().await?;

        dish_item::Entity::delete_many()
            .filter(dish_item::Column::DishId.eq(id))
            .exec(&txn)
            .await?;

        if !lines.is_empty() {
            dish_item::Entity::insert_many(lines.into_iter().map(|line| dish_item::ActiveModel {
                dish_id: Set(id),
                ingredient_id: Set(line.ingredient_id),
                subrecipe_id: Set(line.subrecipe_id),
                quantity: Set(line.quantity),
                unit: Set(line.unit),
                ..Default::default()
            }))
            .exec(&txn)
            .await?;
        }

        CostBook::load(&txn).await?.dish_cost_per_serving(id)?;

        txn.commit().await?;
        debug!(id, "dish lines replaced");

        DishQuery::find_detail(db, id).await
    }

    /// Record units sold on a day; several entries for a day add up
    pub async fn record_sales(
        db: &DbConn,
        dish_id: i32,
        input: DishSalesInput,
    ) -> Result<dish_sale::Model, ServiceError> {
        if input.units < 0 {
            return Err(ServiceError::validation("Units sold cannot be negative"));
        }
        DishQuery::find_by_id(db, dish_id).await?;

        Ok(dish_sale::ActiveModel {
            dish_id: Set(dish_id),
            sold_on: Set(input.sold_on),
            units: Set(input.units),
            ..Default::default()
        }
        .insert(db)
        .await?)
    }
}
