//! Menu engineering over costed dishes.
//!
//! Prices are stored gross (VAT included); all ratios are taken against the
//! net price.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Food cost above this share of the net price raises an alert
pub const FOOD_COST_ALERT: Decimal = dec!(0.35);
/// Margin below this share of the net price raises an alert
pub const MARGIN_ALERT: Decimal = dec!(0.60);
/// A dish is popular when it sells at least this share of an even mix
pub const POPULARITY_FACTOR: Decimal = dec!(0.70);

/// Inputs of one dish, as produced by the cost rollup
#[derive(Debug, Clone, PartialEq)]
pub struct DishFigures {
    pub dish_id: i32,
    pub name: String,
    pub category: Option<String>,
    pub selling_price: Option<Decimal>,
    pub vat_rate: Decimal,
    pub cost_per_serving: Decimal,
    pub units_sold: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    FoodCostHigh,
    MarginLow,
    MissingPrice,
}

/// Kasavana–Smith quadrant of a dish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// popular and profitable
    Star,
    /// popular, low margin
    Plowhorse,
    /// profitable, rarely ordered
    Puzzle,
    Dog,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuEngineeringRow {
    pub dish_id: i32,
    pub name: String,
    pub category: Option<String>,
    pub selling_price: Option<Decimal>,
    pub vat_rate: Decimal,
    pub net_price: Option<Decimal>,
    pub cost: Decimal,
    pub margin: Option<Decimal>,
    pub margin_pct: Option<Decimal>,
    pub food_cost_pct: Option<Decimal>,
    pub units_sold: i64,
    pub alerts: Vec<Alert>,
    pub classification: Option<Classification>,
}

/// Price without VAT; a zero rate leaves the gross price unchanged
pub fn net_price(gross: Decimal, vat_rate: Decimal) -> Decimal {
    if vat_rate.is_zero() {
        gross
    } else {
        gross / (Decimal::ONE + vat_rate)
    }
}

fn ratio(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        None
    } else {
        part.checked_div(whole)
    }
}

pub fn evaluate_dish(figures: &DishFigures) -> MenuEngineeringRow {
    let cost = figures.cost_per_serving;
    let net = figures
        .selling_price
        .map(|gross| net_price(gross, figures.vat_rate));
    let margin = net.map(|net| net - cost);
    let food_cost_pct = net.and_then(|net| ratio(cost, net));
    let margin_pct = net.zip(margin).and_then(|(net, margin)| ratio(margin, net));

    let mut alerts = Vec::new();
    if net.is_none() {
        alerts.push(Alert::MissingPrice);
    }
    if matches!(food_cost_pct, Some(pct) if pct > FOOD_COST_ALERT) {
        alerts.push(Alert::FoodCostHigh);
    }
    if matches!(margin_pct, Some(pct) if pct < MARGIN_ALERT) {
        alerts.push(Alert::MarginLow);
    }

    MenuEngineeringRow {
        dish_id: figures.dish_id,
        name: figures.name.clone(),
        category: figures.category.clone(),
        selling_price: figures.selling_price,
        vat_rate: figures.vat_rate,
        net_price: net.map(|n| n.round_dp(4)),
        cost: cost.round_dp(4),
        margin: margin.map(|m| m.round_dp(4)),
        margin_pct: margin_pct.map(|p| p.round_dp(4)),
        food_cost_pct: food_cost_pct.map(|p| p.round_dp(4)),
        units_sold: figures.units_sold,
        alerts,
        classification: None,
    }
}

/// Evaluate every dish, then classify the priced ones by their sales mix
pub fn analyze(figures: &[DishFigures]) -> Vec<MenuEngineeringRow> {
    let mut rows: Vec<MenuEngineeringRow> = figures.iter().map(evaluate_dish).collect();
    classify(&mut rows);
    rows
}

fn classify(rows: &mut [MenuEngineeringRow]) {
    let priced = || rows.iter().filter(|r| r.margin.is_some());

    let dish_count = priced().count();
    let total_units: i64 = priced().map(|r| r.units_sold.max(0)).sum();
    if dish_count == 0 || total_units == 0 {
        return;
    }

    let total_units = Decimal::from(total_units);
    let average_margin = priced()
        .try_fold(Decimal::ZERO, |sum, r| {
            r.margin
                .unwrap_or_default()
                .checked_mul(Decimal::from(r.units_sold.max(0)))
                .and_then(|weighted| sum.checked_add(weighted))
        })
        .and_then(|weighted| weighted.checked_div(total_units));
    let Some(average_margin) = average_margin else {
        tracing::warn!("sales-weighted margin out of range, dishes left unclassified");
        return;
    };
    let popularity_threshold = POPULARITY_FACTOR / Decimal::from(dish_count);

    for row in rows.iter_mut() {
        let Some(margin) = row.margin else { continue };
        let mix_share = Decimal::from(row.units_sold.max(0)) / total_units;

        let popular = mix_share >= popularity_threshold;
        let profitable = margin >= average_margin;
        row.classification = Some(match (popular, profitable) {
            (true, true) => Classification::Star,
            (true, false) => Classification::Plowhorse,
            (false, true) => Classification::Puzzle,
            (false, false) => Classification::Dog,
        });
    }
}
