use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;

use super::menu_engineering::{Alert, MenuEngineeringRow};

const HIGHEST_FOOD_COST_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub food_cost_high: usize,
    pub margin_low: usize,
    pub missing_price: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodCostEntry {
    pub dish_id: i32,
    pub name: String,
    pub food_cost_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheffingDashboard {
    pub ingredient_count: usize,
    pub subrecipe_count: usize,
    pub active_dish_count: usize,
    /// Mean over dishes with a non-zero net price
    pub average_food_cost_pct: Option<Decimal>,
    pub alert_counts: AlertCounts,
    pub highest_food_cost: Vec<FoodCostEntry>,
    pub unpriced_dishes: Vec<String>,
}

/// Roll menu engineering rows of the active dishes into dashboard figures
pub fn summarize(
    ingredient_count: usize,
    subrecipe_count: usize,
    rows: &[MenuEngineeringRow],
) -> CheffingDashboard {
    let food_costs: Vec<Decimal> = rows.iter().filter_map(|r| r.food_cost_pct).collect();
    let average_food_cost_pct = if food_costs.is_empty() {
        None
    } else {
        food_costs
            .iter()
            .try_fold(Decimal::ZERO, |total, pct| total.checked_add(*pct))
            .and_then(|total| total.checked_div(Decimal::from(food_costs.len())))
            .map(|average| average.round_dp(4))
    };

    let mut alert_counts = AlertCounts::default();
    for alert in rows.iter().flat_map(|r| r.alerts.iter()) {
        match alert {
            Alert::FoodCostHigh => alert_counts.food_cost_high += 1,
            Alert::MarginLow => alert_counts.margin_low += 1,
            Alert::MissingPrice => alert_counts.missing_price += 1,
        }
    }

    let highest_food_cost = rows
        .iter()
        .filter_map(|r| {
            r.food_cost_pct.map(|pct| FoodCostEntry {
                dish_id: r.dish_id,
                name: r.name.clone(),
                food_cost_pct: pct,
            })
        })
        .sorted_by(|a, b| {
            b.food_cost_pct
                .cmp(&a.food_cost_pct)
                .then_with(|| a.name.cmp(&b.name))
        })
        .take(HIGHEST_FOOD_COST_LIMIT)
        .collect();

    let unpriced_dishes = rows
        .iter()
        .filter(|r| r.selling_price.is_none())
        .map(|r| r.name.clone())
        .sorted()
        .collect();

    CheffingDashboard {
        ingredient_count,
        subrecipe_count,
        active_dish_count: rows.len(),
        average_food_cost_pct,
        alert_counts,
        highest_food_cost,
        unpriced_dishes,
    }
}
