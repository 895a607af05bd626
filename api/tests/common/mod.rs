use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use entity::sea_orm_active_enums::Role;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;
use venue_office_api::{router, AppConfig, AppState};
use venue_office_service::access::{AccessMutation, AllowedUserInput, SessionMutation};

pub async fn setup() -> (DatabaseConnection, AppState) {
    let conn = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&conn, None).await.unwrap();

    let state = AppState::new(conn.clone(), AppConfig::new("sqlite::memory:")).unwrap();
    (conn, state)
}

/// Allowlist `email` and open a session for it, returning the bearer token
pub async fn sign_in(
    conn: &DatabaseConnection,
    email: &str,
    role: Role,
    can_cheffing: bool,
) -> String {
    AccessMutation::create(
        conn,
        AllowedUserInput {
            email: email.to_owned(),
            role,
            is_active: true,
            can_reservations: false,
            can_tasks: true,
            can_cheffing,
        },
    )
    .await
    .unwrap();

    SessionMutation::create(conn, email, chrono::Duration::hours(1))
        .await
        .unwrap()
        .token
}

pub async fn send(
    state: &AppState,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    app(state).oneshot(request).await.unwrap()
}

pub fn app(state: &AppState) -> Router {
    router(state.clone())
}

pub async fn json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn assert_status(response: &Response<Body>, status: StatusCode) {
    assert_eq!(response.status(), status, "unexpected status for response");
}
