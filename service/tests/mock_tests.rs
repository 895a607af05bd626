use chrono::{TimeZone, Utc};
use ::entity::{
    allowed_user, dish, dish_item, ingredient,
    sea_orm_active_enums::{Role, TaskBoard, TaskPriority, TaskStatus, Unit},
    subrecipe, subrecipe_item, task,
};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use venue_office_service::{
    access::AccessQuery, cheffing::CheffingQuery, sea_orm::*, TaskQuery,
};

fn task(id: i32, status: TaskStatus, priority: TaskPriority) -> task::Model {
    task::Model {
        id,
        board: TaskBoard::Kitchen,
        title: format!("Task {id}"),
        description: None,
        status,
        priority,
        assigned_to: None,
        due_on: None,
        created_by: "chef@venue.test".to_owned(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        completed_at: None,
    }
}

#[tokio::test]
async fn board_is_sorted_after_loading() {
    let db = &MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            task(1, TaskStatus::Done, TaskPriority::Urgent),
            task(2, TaskStatus::Todo, TaskPriority::Low),
            task(3, TaskStatus::InProgress, TaskPriority::Urgent),
        ]])
        .into_connection();

    let tasks = TaskQuery::list_board(db, TaskBoard::Kitchen, None).await.unwrap();

    assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 2, 1]);
}

#[tokio::test]
async fn lookups_normalize_the_email() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![allowed_user::Model {
            id: 1,
            email: "owner@venue.test".to_owned(),
            role: Role::Admin,
            is_active: true,
            can_reservations: true,
            can_tasks: true,
            can_cheffing: true,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        }]])
        .into_connection();

    let user = AccessQuery::find_by_email(&db, "  Owner@Venue.TEST").await.unwrap();
    assert_eq!(user.map(|u| u.id), Some(1));

    assert_eq!(
        db.into_transaction_log(),
        [Transaction::from_sql_and_values(
            DatabaseBackend::Postgres,
            r#"SELECT "app_allowed_users"."id", "app_allowed_users"."email", "app_allowed_users"."role", "app_allowed_users"."is_active", "app_allowed_users"."can_reservations", "app_allowed_users"."can_tasks", "app_allowed_users"."can_cheffing", "app_allowed_users"."created_at" FROM "app_allowed_users" WHERE "app_allowed_users"."email" = $1 LIMIT $2"#,
            ["owner@venue.test".into(), 1u64.into()]
        )]
    );
}

#[tokio::test]
async fn dashboard_from_loaded_recipes() {
    let db = &MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![ingredient::Model {
            id: 1,
            name: "Flour".to_owned(),
            purchase_unit: Unit::Kg,
            purchase_quantity: dec!(1),
            purchase_price: dec!(1),
            waste_pct: dec!(0),
        }]])
        .append_query_results([Vec::<subrecipe::Model>::new()])
        .append_query_results([Vec::<subrecipe_item::Model>::new()])
        .append_query_results([vec![dish::Model {
            id: 1,
            name: "Focaccia".to_owned(),
            category: None,
            selling_price: Some(dec!(5)),
            vat_rate: dec!(0),
            servings: 4,
            is_active: true,
        }]])
        .append_query_results([vec![dish_item::Model {
            id: 1,
            dish_id: 1,
            ingredient_id: Some(1),
            subrecipe_id: None,
            quantity: dec!(500),
            unit: Unit::G,
        }]])
        .into_connection();

    let dashboard = CheffingQuery::dashboard(db).await.unwrap();

    // 0.50 of flour over 4 servings against a price of 5
    assert_eq!(dashboard.average_food_cost_pct, Some(dec!(0.025)));
    assert_eq!(dashboard.active_dish_count, 1);
    assert!(dashboard.unpriced_dishes.is_empty());
}
