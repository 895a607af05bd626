mod common;

use chrono::NaiveDate;
use entity::sea_orm_active_enums::Unit;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use venue_office_service::{
    cheffing::{
        CheffingQuery, Classification, DishInput, DishMutation, DishQuery, DishSalesInput,
        IngredientInput, IngredientMutation, IngredientQuery, RecipeLineInput, SubrecipeInput,
        SubrecipeMutation, SubrecipeQuery,
    },
    sea_orm::DatabaseConnection,
    ServiceError,
};

fn ingredient(name: &str, unit: Unit, quantity: Decimal, price: Decimal) -> IngredientInput {
    IngredientInput {
        name: name.to_owned(),
        purchase_unit: unit,
        purchase_quantity: quantity,
        purchase_price: price,
        waste_pct: Decimal::ZERO,
    }
}

fn dish(name: &str, price: Option<Decimal>) -> DishInput {
    DishInput {
        name: name.to_owned(),
        category: Some("Mains".to_owned()),
        selling_price: price,
        vat_rate: Decimal::ZERO,
        servings: 1,
        is_active: true,
    }
}

fn ingredient_line(id: i32, quantity: Decimal, unit: Unit) -> RecipeLineInput {
    RecipeLineInput {
        ingredient_id: Some(id),
        subrecipe_id: None,
        quantity,
        unit,
    }
}

fn subrecipe_line(id: i32, quantity: Decimal, unit: Unit) -> RecipeLineInput {
    RecipeLineInput {
        ingredient_id: None,
        subrecipe_id: Some(id),
        quantity,
        unit,
    }
}

async fn sauce(db: &DatabaseConnection, name: &str) -> i32 {
    SubrecipeMutation::create(
        db,
        SubrecipeInput {
            name: name.to_owned(),
            output_quantity: dec!(1),
            output_unit: Unit::L,
            waste_pct: Decimal::ZERO,
        },
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn costs_roll_up_from_ingredients_to_dishes() {
    let db = &common::setup().await;

    let tomato = IngredientMutation::create(
        db,
        IngredientInput {
            waste_pct: dec!(0.1),
            ..ingredient("Tomato", Unit::Kg, dec!(1), dec!(2))
        },
    )
    .await
    .unwrap();
    let oil = IngredientMutation::create(db, ingredient("Olive oil", Unit::L, dec!(1), dec!(8)))
        .await
        .unwrap();
    let pasta = IngredientMutation::create(db, ingredient("Pasta", Unit::G, dec!(500), dec!(1.5)))
        .await
        .unwrap();

    let sauce = sauce(db, "Tomato sauce").await;
    let detail = SubrecipeMutation::replace_items(
        db,
        sauce,
        vec![
            ingredient_line(tomato.id, dec!(1.8), Unit::Kg),
            ingredient_line(oil.id, dec!(100), Unit::Ml),
        ],
    )
    .await
    .unwrap();
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.cost_per_output_unit, dec!(4.8));

    let pomodoro = DishMutation::create(
        db,
        DishInput {
            servings: 2,
            ..dish("Pasta al pomodoro", Some(dec!(11)))
        },
    )
    .await
    .unwrap();
    let detail = DishMutation::replace_items(
        db,
        pomodoro.id,
        vec![
            ingredient_line(pasta.id, dec!(250), Unit::G),
            subrecipe_line(sauce, dec!(300), Unit::Ml),
        ],
    )
    .await
    .unwrap();

    assert_eq!(detail.cost_per_serving, dec!(1.095));
    assert_eq!(detail.evaluation.food_cost_pct, Some(dec!(0.0995)));
    assert!(detail.evaluation.alerts.is_empty());

    let reloaded = DishQuery::find_detail(db, pomodoro.id).await.unwrap();
    assert_eq!(reloaded, detail);
}

#[tokio::test]
async fn duplicate_names_are_conflicts() {
    let db = &common::setup().await;

    IngredientMutation::create(db, ingredient("Salt", Unit::Kg, dec!(1), dec!(1)))
        .await
        .unwrap();
    let err = IngredientMutation::create(db, ingredient("Salt", Unit::Kg, dec!(1), dec!(2)))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "An ingredient with this name already exists"
    );

    DishMutation::create(db, dish("Soup", None)).await.unwrap();
    let err = DishMutation::create(db, dish(" Soup ", None)).await.unwrap_err();
    assert!(
        matches!(err, ServiceError::Conflict(m) if m == "A dish with this name already exists")
    );
}

#[tokio::test]
async fn invalid_input_never_reaches_the_database() {
    let db = &common::setup().await;

    let err = DishMutation::create(
        db,
        DishInput {
            servings: 0,
            ..dish("Nothing", None)
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = IngredientMutation::create(
        db,
        IngredientInput {
            waste_pct: dec!(1),
            ..ingredient("Air", Unit::G, dec!(1), dec!(0))
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    assert!(DishQuery::list(db).await.unwrap().is_empty());
}

#[tokio::test]
async fn used_ingredients_cannot_be_deleted() {
    let db = &common::setup().await;

    let butter = IngredientMutation::create(db, ingredient("Butter", Unit::G, dec!(250), dec!(3)))
        .await
        .unwrap();
    let toast = DishMutation::create(db, dish("Toast", Some(dec!(4)))).await.unwrap();
    DishMutation::replace_items(db, toast.id, vec![ingredient_line(butter.id, dec!(10), Unit::G)])
        .await
        .unwrap();

    let err = IngredientMutation::delete(db, butter.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    // deleting the dish takes its lines along, freeing the ingredient
    DishMutation::delete(db, toast.id).await.unwrap();
    IngredientMutation::delete(db, butter.id).await.unwrap();

    assert!(matches!(
        IngredientMutation::delete(db, butter.id).await,
        Err(ServiceError::NotFound("Ingredient", _))
    ));
}

#[tokio::test]
async fn subrecipe_cycles_are_rolled_back() {
    let db = &common::setup().await;

    let mother = sauce(db, "Mother sauce").await;
    let daughter = sauce(db, "Daughter sauce").await;

    let err =
        SubrecipeMutation::replace_items(db, mother, vec![subrecipe_line(mother, dec!(1), Unit::L)])
            .await
            .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    SubrecipeMutation::replace_items(db, mother, vec![subrecipe_line(daughter, dec!(1), Unit::L)])
        .await
        .unwrap();
    let err = SubrecipeMutation::replace_items(
        db,
        daughter,
        vec![subrecipe_line(mother, dec!(1), Unit::L)],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Costing(m) if m.contains("cycle")));

    let daughter = SubrecipeQuery::find_detail(db, daughter).await.unwrap();
    assert!(daughter.items.is_empty());
}

#[tokio::test]
async fn incompatible_units_are_rolled_back() {
    let db = &common::setup().await;

    let milk = IngredientMutation::create(db, ingredient("Milk", Unit::L, dec!(1), dec!(1)))
        .await
        .unwrap();
    let latte = DishMutation::create(db, dish("Latte", Some(dec!(3)))).await.unwrap();

    let err = DishMutation::replace_items(
        db,
        latte.id,
        vec![ingredient_line(milk.id, dec!(200), Unit::G)],
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::Costing(_)));
    assert!(DishQuery::find_detail(db, latte.id).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn ingredient_unit_changes_keep_recipes_costable() {
    let db = &common::setup().await;

    let milk = IngredientMutation::create(db, ingredient("Milk", Unit::L, dec!(1), dec!(1.2)))
        .await
        .unwrap();
    let flour = IngredientMutation::create(db, ingredient("Flour", Unit::Kg, dec!(1), dec!(1)))
        .await
        .unwrap();
    let latte = DishMutation::create(db, dish("Latte", Some(dec!(3)))).await.unwrap();
    let bread = DishMutation::create(db, dish("Bread", Some(dec!(4)))).await.unwrap();
    DishMutation::replace_items(db, latte.id, vec![ingredient_line(milk.id, dec!(200), Unit::Ml)])
        .await
        .unwrap();
    DishMutation::replace_items(db, bread.id, vec![ingredient_line(flour.id, dec!(500), Unit::G)])
        .await
        .unwrap();

    let err = IngredientMutation::update(
        db,
        milk.id,
        ingredient("Milk", Unit::Kg, dec!(1), dec!(1.2)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Costing(_)));
    assert_eq!(
        IngredientQuery::find_by_id(db, milk.id).await.unwrap().purchase_unit,
        Unit::L
    );

    // a change within the same dimension is fine
    let milk = IngredientMutation::update(
        db,
        milk.id,
        ingredient("Milk", Unit::Ml, dec!(1000), dec!(1.5)),
    )
    .await
    .unwrap();
    assert_eq!(milk.purchase_unit, Unit::Ml);

    let dashboard = CheffingQuery::dashboard(db).await.unwrap();
    assert_eq!(dashboard.active_dish_count, 2);
    assert!(CheffingQuery::menu_engineering(db, None, None).await.is_ok());
}

#[tokio::test]
async fn oversized_quantities_are_costing_errors() {
    let db = &common::setup().await;

    let saffron = IngredientMutation::create(
        db,
        IngredientInput {
            waste_pct: dec!(0.9999),
            ..ingredient("Saffron", Unit::G, dec!(0.0001), dec!(9999999999))
        },
    )
    .await
    .unwrap();
    let paella = DishMutation::create(db, dish("Paella", Some(dec!(30)))).await.unwrap();

    let err = DishMutation::replace_items(
        db,
        paella.id,
        vec![ingredient_line(saffron.id, dec!(9999999999), Unit::Kg)],
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::Costing(m) if m.contains("overflows")));
    assert!(DishQuery::find_detail(db, paella.id).await.unwrap().items.is_empty());
    assert!(CheffingQuery::dashboard(db).await.is_ok());
}

#[tokio::test]
async fn menu_engineering_uses_sales_in_range() {
    let db = &common::setup().await;

    let beef = IngredientMutation::create(db, ingredient("Beef", Unit::Kg, dec!(1), dec!(20)))
        .await
        .unwrap();
    let burger = DishMutation::create(db, dish("Burger", Some(dec!(12)))).await.unwrap();
    let steak = DishMutation::create(db, dish("Steak", Some(dec!(30)))).await.unwrap();
    DishMutation::create(db, dish("Special", None)).await.unwrap();
    DishMutation::create(
        db,
        DishInput {
            is_active: false,
            ..dish("Retired", Some(dec!(5)))
        },
    )
    .await
    .unwrap();

    DishMutation::replace_items(db, burger.id, vec![ingredient_line(beef.id, dec!(150), Unit::G)])
        .await
        .unwrap();
    DishMutation::replace_items(db, steak.id, vec![ingredient_line(beef.id, dec!(300), Unit::G)])
        .await
        .unwrap();

    let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
    for (dish_id, sold_on, units) in [
        (burger.id, day(1), 60),
        (burger.id, day(2), 30),
        (steak.id, day(1), 10),
        (steak.id, day(20), 500),
    ] {
        DishMutation::record_sales(db, dish_id, DishSalesInput { sold_on, units })
            .await
            .unwrap();
    }

    let rows = CheffingQuery::menu_engineering(db, Some(day(1)), Some(day(7)))
        .await
        .unwrap();

    assert_eq!(
        rows.iter()
            .map(|r| (r.name.as_str(), r.units_sold, r.classification))
            .collect::<Vec<_>>(),
        vec![
            // margin 9 below the weighted average of 10.5, 90% of sales
            ("Burger", 90, Some(Classification::Plowhorse)),
            ("Special", 0, None),
            // margin 24, 10% of sales
            ("Steak", 10, Some(Classification::Puzzle)),
        ]
    );

    let err = CheffingQuery::menu_engineering(db, Some(day(7)), Some(day(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn dashboard_counts_active_dishes() {
    let db = &common::setup().await;

    let cheese = IngredientMutation::create(db, ingredient("Cheese", Unit::Kg, dec!(1), dec!(10)))
        .await
        .unwrap();
    let board = DishMutation::create(db, dish("Cheese board", Some(dec!(10)))).await.unwrap();
    DishMutation::replace_items(db, board.id, vec![ingredient_line(cheese.id, dec!(400), Unit::G)])
        .await
        .unwrap();
    DishMutation::create(db, dish("Soup of the day", None)).await.unwrap();

    let dashboard = CheffingQuery::dashboard(db).await.unwrap();

    assert_eq!(dashboard.ingredient_count, 1);
    assert_eq!(dashboard.active_dish_count, 2);
    assert_eq!(dashboard.average_food_cost_pct, Some(dec!(0.4)));
    assert_eq!(dashboard.alert_counts.food_cost_high, 1);
    assert_eq!(dashboard.alert_counts.missing_price, 1);
    assert_eq!(dashboard.unpriced_dishes, vec!["Soup of the day".to_owned()]);
}
