use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use entity::{dish, dish_sale, ingredient, subrecipe};
use serde::Deserialize;
use venue_office_service::{
    access::{AccessLevel, Module},
    cheffing::{
        CheffingDashboard, CheffingQuery, DishDetail, DishInput, DishMutation, DishQuery,
        DishSalesInput, IngredientInput, IngredientMutation, IngredientQuery, MenuEngineeringRow,
        RecipeLineInput, SubrecipeDetail, SubrecipeInput, SubrecipeMutation, SubrecipeQuery,
    },
};

use crate::{auth::CurrentUser, error::ApiResult, state::AppState};

fn read(current: &CurrentUser) -> ApiResult<()> {
    current.authorize(Module::Cheffing, AccessLevel::Read)
}

fn write(current: &CurrentUser) -> ApiResult<()> {
    current.authorize(Module::Cheffing, AccessLevel::Write)
}

async fn list_ingredients(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<ingredient::Model>>> {
    read(&current)?;
    Ok(Json(IngredientQuery::list(&state.conn).await?))
}

async fn create_ingredient(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<IngredientInput>,
) -> ApiResult<(StatusCode, Json<ingredient::Model>)> {
    write(&current)?;
    let created = IngredientMutation::create(&state.conn, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_ingredient(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<IngredientInput>,
) -> ApiResult<Json<ingredient::Model>> {
    write(&current)?;
    Ok(Json(IngredientMutation::update(&state.conn, id, input).await?))
}

async fn delete_ingredient(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    write(&current)?;
    IngredientMutation::delete(&state.conn, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_subrecipes(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<subrecipe::Model>>> {
    read(&current)?;
    Ok(Json(SubrecipeQuery::list(&state.conn).await?))
}

async fn get_subrecipe(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<SubrecipeDetail>> {
    read(&current)?;
    Ok(Json(SubrecipeQuery::find_detail(&state.conn, id).await?))
}

async fn create_subrecipe(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<SubrecipeInput>,
) -> ApiResult<(StatusCode, Json<subrecipe::Model>)> {
    write(&current)?;
    let created = SubrecipeMutation::create(&state.conn, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_subrecipe(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<SubrecipeInput>,
) -> ApiResult<Json<subrecipe::Model>> {
    write(&current)?;
    Ok(Json(SubrecipeMutation::update(&state.conn, id, input).await?))
}

async fn delete_subrecipe(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    write(&current)?;
    SubrecipeMutation::delete(&state.conn, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn replace_subrecipe_items(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(lines): Json<Vec<RecipeLineInput>>,
) -> ApiResult<Json<SubrecipeDetail>> {
    write(&current)?;
    Ok(Json(
        SubrecipeMutation::replace_items(&state.conn, id, lines).await?,
    ))
}

async fn list_dishes(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<dish::Model>>> {
    read(&current)?;
    Ok(Json(DishQuery::list(&state.conn).await?))
}

async fn get_dish(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<DishDetail>> {
    read(&current)?;
    Ok(Json(DishQuery::find_detail(&state.conn, id).await?))
}

async fn create_dish(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<DishInput>,
) -> ApiResult<(StatusCode, Json<dish::Model>)> {
    write(&current)?;
    let created = DishMutation::create(&state.conn, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_dish(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<DishInput>,
) -> ApiResult<Json<dish::Model>> {
    write(&current)?;
    Ok(Json(DishMutation::update(&state.conn, id, input).await?))
}

async fn delete_dish(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    write(&current)?;
    DishMutation::delete(&state.conn, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn replace_dish_items(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(lines): Json<Vec<RecipeLineInput>>,
) -> ApiResult<Json<DishDetail>> {
    write(&current)?;
    Ok(Json(DishMutation::replace_items(&state.conn, id, lines).await?))
}

async fn record_sales(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<DishSalesInput>,
) -> ApiResult<(StatusCode, Json<dish_sale::Model>)> {
    write(&current)?;
    let sale = DishMutation::record_sales(&state.conn, id, input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

#[derive(Deserialize)]
struct Period {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

async fn menu_engineering(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(period): Query<Period>,
) -> ApiResult<Json<Vec<MenuEngineeringRow>>> {
    read(&current)?;
    Ok(Json(
        CheffingQuery::menu_engineering(&state.conn, period.from, period.to).await?,
    ))
}

async fn dashboard(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<CheffingDashboard>> {
    read(&current)?;
    Ok(Json(CheffingQuery::dashboard(&state.conn).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route(
            "/ingredients/{id}",
            put(update_ingredient).delete(delete_ingredient),
        )
        .route("/subrecipes", get(list_subrecipes).post(create_subrecipe))
        .route(
            "/subrecipes/{id}",
            get(get_subrecipe)
                .put(update_subrecipe)
                .delete(delete_subrecipe),
        )
        .route("/subrecipes/{id}/items", put(replace_subrecipe_items))
        .route("/dishes", get(list_dishes).post(create_dish))
        .route(
            "/dishes/{id}",
            get(get_dish).put(update_dish).delete(delete_dish),
        )
        .route("/dishes/{id}/items", put(replace_dish_items))
        .route("/dishes/{id}/sales", post(record_sales))
        .route("/menu-engineering", get(menu_engineering))
        .route("/dashboard", get(dashboard))
}
