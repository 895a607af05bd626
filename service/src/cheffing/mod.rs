//! Recipe costing and menu engineering.

mod costing;
mod dashboard;
mod dish;
mod ingredient;
mod menu_engineering;
mod subrecipe;
mod units;
mod validate;

use std::collections::HashMap;

use ::entity::dish_sale;
use chrono::NaiveDate;
use sea_orm::*;

pub use costing::{CostBook, UnitCost};
pub use dashboard::{summarize, AlertCounts, CheffingDashboard, FoodCostEntry};
pub use dish::{DishDetail, DishInput, DishMutation, DishQuery, DishSalesInput};
pub use ingredient::{IngredientInput, IngredientMutation, IngredientQuery};
pub use menu_engineering::{
    analyze, evaluate_dish, net_price, Alert, Classification, DishFigures, MenuEngineeringRow,
    FOOD_COST_ALERT, MARGIN_ALERT, POPULARITY_FACTOR,
};
pub use subrecipe::{SubrecipeDetail, SubrecipeInput, SubrecipeMutation, SubrecipeQuery};
pub use units::{base_factor, dimension, Dimension};
pub use validate::RecipeLineInput;

use crate::ServiceError;

#[derive(Debug, FromQueryResult)]
struct UnitsSold {
    dish_id: i32,
    units_sold: Option<i64>,
}

pub struct CheffingQuery;

impl CheffingQuery {
    /// Units sold per dish, with optional inclusive date bounds
    pub async fn units_sold(
        db: &DbConn,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<HashMap<i32, i64>, ServiceError> {
        let mut select = dish_sale::Entity::find()
            .select_only()
            .column(dish_sale::Column::DishId)
            .column_as(dish_sale::Column::Units.sum(), "units_sold")
            .group_by(dish_sale::Column::DishId);
        if let Some(from) = from {
            select = select.filter(dish_sale::Column::SoldOn.gte(from));
        }
        if let Some(to) = to {
            select = select.filter(dish_sale::Column::SoldOn.lte(to));
        }

        Ok(select
            .into_model::<UnitsSold>()
            .all(db)
            .await?
            .into_iter()
            .map(|row| (row.dish_id, row.units_sold.unwrap_or_default()))
            .collect())
    }

    fn active_rows(
        book: &CostBook,
        units_sold: &HashMap<i32, i64>,
    ) -> Result<Vec<MenuEngineeringRow>, ServiceError> {
        let costs = book.dish_costs()?;

        let mut figures: Vec<DishFigures> = book
            .dishes()
            .filter(|d| d.is_active)
            .map(|d| DishFigures {
                dish_id: d.id,
                name: d.name.clone(),
                category: d.category.clone(),
                selling_price: d.selling_price,
                vat_rate: d.vat_rate,
                cost_per_serving: costs.get(&d.id).copied().unwrap_or_default(),
                units_sold: units_sold.get(&d.id).copied().unwrap_or_default(),
            })
            .collect();
        figures.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(dishes = figures.len(), "menu engineering input");
        Ok(analyze(&figures))
    }

    /// Menu engineering rows of the active dishes, classified by the sales
    /// recorded between `from` and `to`
    pub async fn menu_engineering(
        db: &DbConn,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<MenuEngineeringRow>, ServiceError> {
        if matches!((from, to), (Some(from), Some(to)) if from > to) {
            return Err(ServiceError::validation(
                "The start date must not be after the end date",
            ));
        }

        let book = CostBook::load(db).await?;
        let units_sold = Self::units_sold(db, from, to).await?;
        Self::active_rows(&book, &units_sold)
    }

    pub async fn dashboard(db: &DbConn) -> Result<CheffingDashboard, ServiceError> {
        let book = CostBook::load(db).await?;
        let rows = Self::active_rows(&book, &HashMap::new())?;

        Ok(summarize(book.ingredient_count(), book.subrecipe_count(), &rows))
    }
}
