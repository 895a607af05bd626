//! Cost rollup: ingredients → subrecipes → dishes.
//!
//! All costs are expressed per *base unit* (g, ml or unit) of the costed
//! item. An ingredient's waste raises its cost per usable unit; a
//! subrecipe's waste lowers its usable output. Subrecipes may nest, so the
//! rollup recurses with memoization and rejects cycles.

use std::collections::{HashMap, HashSet};

use ::entity::{dish, dish_item, ingredient, sea_orm_active_enums::Unit, subrecipe, subrecipe_item};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, EntityTrait};

use super::units::{base_factor, dimension, ensure_compatible, to_base, Dimension};
use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitCost {
    pub dimension: Dimension,
    pub per_base_unit: Decimal,
}

/// In-memory snapshot of everything the rollup needs
#[derive(Debug, Default)]
pub struct CostBook {
    ingredients: HashMap<i32, ingredient::Model>,
    subrecipes: HashMap<i32, subrecipe::Model>,
    subrecipe_items: HashMap<i32, Vec<subrecipe_item::Model>>,
    dishes: HashMap<i32, dish::Model>,
    dish_items: HashMap<i32, Vec<dish_item::Model>>,
}

type Memo = HashMap<i32, UnitCost>;

fn usable_fraction(waste_pct: Decimal) -> Decimal {
    Decimal::ONE - waste_pct
}

fn overflow(what: impl FnOnce() -> String) -> ServiceError {
    ServiceError::Costing(format!("{} cost overflows", what()))
}

fn divide(
    numerator: Decimal,
    denominator: Decimal,
    what: impl FnOnce() -> String,
) -> Result<Decimal, ServiceError> {
    if denominator <= Decimal::ZERO {
        return Err(ServiceError::Costing(format!(
            "{} has no usable quantity",
            what()
        )));
    }
    numerator.checked_div(denominator).ok_or_else(|| overflow(what))
}

/// `quantity` of `unit` in base units, scaled by the usable fraction
fn usable_quantity(
    quantity: Decimal,
    unit: Unit,
    waste_pct: Decimal,
    what: impl FnOnce() -> String,
) -> Result<Decimal, ServiceError> {
    to_base(quantity, unit)
        .and_then(|base| base.checked_mul(usable_fraction(waste_pct)))
        .ok_or_else(|| overflow(what))
}

impl CostBook {
    pub fn new(
        ingredients: Vec<ingredient::Model>,
        subrecipes: Vec<subrecipe::Model>,
        subrecipe_items: Vec<subrecipe_item::Model>,
        dishes: Vec<dish::Model>,
        dish_items: Vec<dish_item::Model>,
    ) -> Self {
        let mut book = Self {
            ingredients: ingredients.into_iter().map(|i| (i.id, i)).collect(),
            subrecipes: subrecipes.into_iter().map(|s| (s.id, s)).collect(),
            dishes: dishes.into_iter().map(|d| (d.id, d)).collect(),
            ..Default::default()
        };
        for item in subrecipe_items {
            book.subrecipe_items.entry(item.subrecipe_id).or_default().push(item);
        }
        for item in dish_items {
            book.dish_items.entry(item.dish_id).or_default().push(item);
        }
        book
    }

    /// Load the whole costing graph; works inside a transaction too
    pub async fn load<C>(db: &C) -> Result<Self, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(Self::new(
            ingredient::Entity::find().all(db).await?,
            subrecipe::Entity::find().all(db).await?,
            subrecipe_item::Entity::find().all(db).await?,
            dish::Entity::find().all(db).await?,
            dish_item::Entity::find().all(db).await?,
        ))
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    pub fn subrecipe_count(&self) -> usize {
        self.subrecipes.len()
    }

    pub fn dishes(&self) -> impl Iterator<Item = &dish::Model> {
        self.dishes.values()
    }

    pub fn ingredient_cost(&self, id: i32) -> Result<UnitCost, ServiceError> {
        let ingredient = self
            .ingredients
            .get(&id)
            .ok_or_else(|| ServiceError::Costing(format!("ingredient {id} does not exist")))?;

        let what = || format!("Ingredient '{}'", ingredient.name);
        let usable = usable_quantity(
            ingredient.purchase_quantity,
            ingredient.purchase_unit,
            ingredient.waste_pct,
            what,
        )?;

        Ok(UnitCost {
            dimension: dimension(ingredient.purchase_unit),
            per_base_unit: divide(ingredient.purchase_price, usable, what)?,
        })
    }

    pub fn subrecipe_cost(&self, id: i32) -> Result<UnitCost, ServiceError> {
        self.subrecipe_cost_memo(id, &mut Memo::new(), &mut HashSet::new())
    }

    fn subrecipe_cost_memo(
        &self,
        id: i32,
        memo: &mut Memo,
        visiting: &mut HashSet<i32>,
    ) -> Result<UnitCost, ServiceError> {
        if let Some(cost) = memo.get(&id) {
            return Ok(*cost);
        }
        let subrecipe = self
            .subrecipes
            .get(&id)
            .ok_or_else(|| ServiceError::Costing(format!("subrecipe {id} does not exist")))?;

        if !visiting.insert(id) {
            return Err(ServiceError::Costing(format!(
                "subrecipe cycle through '{}'",
                subrecipe.name
            )));
        }

        let what = || format!("Subrecipe '{}'", subrecipe.name);
        let mut total = Decimal::ZERO;
        for item in self.subrecipe_items.get(&id).into_iter().flatten() {
            let line = self.line_cost(
                item.quantity,
                item.unit,
                item.ingredient_id,
                item.component_subrecipe_id,
                memo,
                visiting,
            )?;
            total = total.checked_add(line).ok_or_else(|| overflow(what))?;
        }
        visiting.remove(&id);

        let output = usable_quantity(
            subrecipe.output_quantity,
            subrecipe.output_unit,
            subrecipe.waste_pct,
            what,
        )?;
        let cost = UnitCost {
            dimension: dimension(subrecipe.output_unit),
            per_base_unit: divide(total, output, what)?,
        };
        memo.insert(id, cost);

        Ok(cost)
    }

    fn line_cost(
        &self,
        quantity: Decimal,
        unit: Unit,
        ingredient_id: Option<i32>,
        subrecipe_id: Option<i32>,
        memo: &mut Memo,
        visiting: &mut HashSet<i32>,
    ) -> Result<Decimal, ServiceError> {
        let (cost, what) = match (ingredient_id, subrecipe_id) {
            (Some(id), None) => (
                self.ingredient_cost(id)?,
                self.ingredients[&id].name.as_str(),
            ),
            (None, Some(id)) => (
                self.subrecipe_cost_memo(id, memo, visiting)?,
                self.subrecipes[&id].name.as_str(),
            ),
            _ => {
                return Err(ServiceError::Costing(
                    "a recipe line must reference exactly one ingredient or subrecipe".to_owned(),
                ))
            }
        };
        ensure_compatible(unit, cost.dimension, what)?;

        quantity
            .checked_mul(base_factor(unit))
            .and_then(|base| base.checked_mul(cost.per_base_unit))
            .ok_or_else(|| overflow(|| format!("A recipe line of '{what}'")))
    }

    /// Cost of one serving of dish `id`
    pub fn dish_cost_per_serving(&self, id: i32) -> Result<Decimal, ServiceError> {
        self.dish_cost_memo(id, &mut Memo::new())
    }

    /// Cost per serving of every dish, sharing subrecipe results
    pub fn dish_costs(&self) -> Result<HashMap<i32, Decimal>, ServiceError> {
        let mut memo = Memo::new();
        let mut costs = HashMap::with_capacity(self.dishes.len());
        for id in self.dishes.keys() {
            costs.insert(*id, self.dish_cost_memo(*id, &mut memo)?);
        }
        Ok(costs)
    }

    /// Cost every ingredient, subrecipe and dish once, surfacing the first
    /// failure
    pub fn verify(&self) -> Result<(), ServiceError> {
        for id in self.ingredients.keys() {
            self.ingredient_cost(*id)?;
        }
        let mut memo = Memo::new();
        for id in self.subrecipes.keys() {
            self.subrecipe_cost_memo(*id, &mut memo, &mut HashSet::new())?;
        }
        for id in self.dishes.keys() {
            self.dish_cost_memo(*id, &mut memo)?;
        }
        Ok(())
    }

    fn dish_cost_memo(&self, id: i32, memo: &mut Memo) -> Result<Decimal, ServiceError> {
        let dish = self
            .dishes
            .get(&id)
            .ok_or_else(|| ServiceError::Costing(format!("dish {id} does not exist")))?;

        let what = || format!("Dish '{}'", dish.name);
        let mut total = Decimal::ZERO;
        for item in self.dish_items.get(&id).into_iter().flatten() {
            let line = self.line_cost(
                item.quantity,
                item.unit,
                item.ingredient_id,
                item.subrecipe_id,
                memo,
                &mut HashSet::new(),
            )?;
            total = total.checked_add(line).ok_or_else(|| overflow(what))?;
        }

        divide(total, Decimal::from(dish.servings), what)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    pub(crate) fn ingredient(
        id: i32,
        name: &str,
        unit: Unit,
        qty: Decimal,
        price: Decimal,
        waste: Decimal,
    ) -> ingredient::Model {
        ingredient::Model {
            id,
            name: name.to_owned(),
            purchase_unit: unit,
            purchase_quantity: qty,
            purchase_price: price,
            waste_pct: waste,
        }
    }

    pub(crate) fn subrecipe(
        id: i32,
        name: &str,
        qty: Decimal,
        unit: Unit,
        waste: Decimal,
    ) -> subrecipe::Model {
        subrecipe::Model {
            id,
            name: name.to_owned(),
            output_quantity: qty,
            output_unit: unit,
            waste_pct: waste,
        }
    }

    fn sub_line(
        id: i32,
        subrecipe_id: i32,
        ingredient: Option<i32>,
        component: Option<i32>,
        qty: Decimal,
        unit: Unit,
    ) -> subrecipe_item::Model {
        subrecipe_item::Model {
            id,
            subrecipe_id,
            ingredient_id: ingredient,
            component_subrecipe_id: component,
            quantity: qty,
            unit,
        }
    }

    pub(crate) fn dish(
        id: i32,
        name: &str,
        price: Option<Decimal>,
        vat: Decimal,
        servings: i32,
    ) -> dish::Model {
        dish::Model {
            id,
            name: name.to_owned(),
            category: None,
            selling_price: price,
            vat_rate: vat,
            servings,
            is_active: true,
        }
    }

    fn dish_line(
        id: i32,
        dish_id: i32,
        ingredient: Option<i32>,
        subrecipe: Option<i32>,
        qty: Decimal,
        unit: Unit,
    ) -> dish_item::Model {
        dish_item::Model {
            id,
            dish_id,
            ingredient_id: ingredient,
            subrecipe_id: subrecipe,
            quantity: qty,
            unit,
        }
    }

    /// Tomato sauce from tomatoes and oil, served over pasta
    fn kitchen() -> CostBook {
        CostBook::new(
            vec![
                // 2.00 per kg, 10% trimmed away
                ingredient(1, "Tomato", Unit::Kg, dec!(1), dec!(2), dec!(0.1)),
                // 8.00 per litre
                ingredient(2, "Olive oil", Unit::L, dec!(1), dec!(8), dec!(0)),
                // 1.50 per 500 g
                ingredient(3, "Pasta", Unit::G, dec!(500), dec!(1.5), dec!(0)),
            ],
            vec![subrecipe(10, "Tomato sauce", dec!(1), Unit::L, dec!(0))],
            vec![
                sub_line(1, 10, Some(1), None, dec!(1.8), Unit::Kg),
                sub_line(2, 10, Some(2), None, dec!(100), Unit::Ml),
            ],
            vec![dish(100, "Pasta al pomodoro", Some(dec!(11)), dec!(0.1), 2)],
            vec![
                dish_line(1, 100, Some(3), None, dec!(250), Unit::G),
                dish_line(2, 100, None, Some(10), dec!(300), Unit::Ml),
            ],
        )
    }

    #[test]
    fn ingredient_waste_raises_unit_cost() {
        let book = kitchen();
        let tomato = book.ingredient_cost(1).unwrap();

        assert_eq!(tomato.dimension, Dimension::Mass);
        // 2.00 / (1000 g × 0.9)
        assert_eq!(tomato.per_base_unit.round_dp(6), dec!(0.002222));
    }

    #[test]
    fn subrecipe_cost_is_spread_over_its_output() {
        let book = kitchen();
        let sauce = book.subrecipe_cost(10).unwrap();

        // (1800 g × 2/900 + 100 ml × 0.008) / 1000 ml = (4.00 + 0.80) / 1000
        assert_eq!(sauce.dimension, Dimension::Volume);
        assert_eq!(sauce.per_base_unit.round_dp(6), dec!(0.0048));
    }

    #[test]
    fn dish_cost_is_per_serving() {
        let book = kitchen();

        // pasta 250 g × 0.003 = 0.75; sauce 300 ml × 0.0048 = 1.44; / 2 servings
        assert_eq!(book.dish_cost_per_serving(100).unwrap().round_dp(4), dec!(1.095));
        assert_eq!(book.dish_costs().unwrap()[&100].round_dp(4), dec!(1.095));
    }

    #[test]
    fn nested_cycles_are_rejected() {
        let book = CostBook::new(
            vec![],
            vec![
                subrecipe(1, "Mother sauce", dec!(1), Unit::L, dec!(0)),
                subrecipe(2, "Daughter sauce", dec!(1), Unit::L, dec!(0)),
            ],
            vec![
                sub_line(1, 1, None, Some(2), dec!(1), Unit::L),
                sub_line(2, 2, None, Some(1), dec!(1), Unit::L),
            ],
            vec![],
            vec![],
        );

        assert!(matches!(
            book.subrecipe_cost(1),
            Err(ServiceError::Costing(m)) if m.contains("cycle")
        ));
        assert!(book.verify().is_err());
        assert!(kitchen().verify().is_ok());
    }

    #[test]
    fn incompatible_units_are_rejected() {
        let book = CostBook::new(
            vec![ingredient(1, "Milk", Unit::L, dec!(1), dec!(1), dec!(0))],
            vec![],
            vec![],
            vec![dish(1, "Latte", Some(dec!(3)), dec!(0), 1)],
            vec![dish_line(1, 1, Some(1), None, dec!(200), Unit::G)],
        );

        assert!(matches!(book.dish_cost_per_serving(1), Err(ServiceError::Costing(_))));
    }

    #[test]
    fn oversized_lines_are_a_costing_error() {
        let book = CostBook::new(
            vec![ingredient(1, "Saffron", Unit::G, dec!(0.0001), dec!(9999999999), dec!(0.9999))],
            vec![],
            vec![],
            vec![dish(1, "Paella", Some(dec!(30)), dec!(0), 1)],
            vec![dish_line(1, 1, Some(1), None, dec!(9999999999), Unit::Kg)],
        );

        assert!(matches!(
            book.dish_cost_per_serving(1),
            Err(ServiceError::Costing(m)) if m.contains("overflows")
        ));
        assert!(book.dish_costs().is_err());
        assert!(book.verify().is_err());
    }

    #[test]
    fn free_ingredients_cost_nothing() {
        let book = CostBook::new(
            vec![ingredient(1, "Tap water", Unit::L, dec!(1), dec!(0), dec!(0))],
            vec![],
            vec![],
            vec![dish(1, "Water", None, dec!(0), 1)],
            vec![dish_line(1, 1, Some(1), None, dec!(250), Unit::Ml)],
        );

        assert_eq!(book.dish_cost_per_serving(1).unwrap(), Decimal::ZERO);
    }
}
