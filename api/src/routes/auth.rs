use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use entity::allowed_user;
use serde::{Deserialize, Serialize};
use tower_cookies::{
    cookie::{time, SameSite},
    Cookie, Cookies,
};
use tracing::info;
use uuid::Uuid;
use venue_office_service::access::{
    default_landing, normalize_email, AccessQuery, SessionMutation, SessionQuery, NO_ACCESS_PATH,
};

use crate::{
    auth::{session_token, CurrentUser, IdentityProvider, OAUTH_STATE_COOKIE, SESSION_COOKIE},
    error::{ApiError, ApiResult},
    state::AppState,
};

const OAUTH_STATE_MINUTES: i64 = 10;

fn cookie(name: &'static str, value: String, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

fn expired(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

fn identity(state: &AppState) -> ApiResult<&dyn IdentityProvider> {
    state
        .identity
        .as_deref()
        .ok_or_else(|| ApiError::NotImplemented("Login is not configured".to_owned()))
}

async fn login(State(state): State<AppState>, cookies: Cookies) -> ApiResult<Redirect> {
    let provider = identity(&state)?;
    let csrf = Uuid::new_v4().simple().to_string();
    let url = provider.authorize_url(&csrf)?;

    cookies.add(cookie(
        OAUTH_STATE_COOKIE,
        csrf,
        time::Duration::minutes(OAUTH_STATE_MINUTES),
    ));
    Ok(Redirect::to(&url))
}

#[derive(Deserialize)]
struct CallbackParams {
    code: String,
    state: String,
}

async fn callback(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<CallbackParams>,
) -> ApiResult<Redirect> {
    let provider = identity(&state)?;

    let expected = cookies
        .get(OAUTH_STATE_COOKIE)
        .map(|cookie| cookie.value().to_owned());
    cookies.remove(expired(OAUTH_STATE_COOKIE));
    if expected.as_deref() != Some(params.state.as_str()) {
        info!("login callback with a mismatched state");
        return Err(ApiError::Unauthenticated);
    }

    let email = normalize_email(&provider.exchange_code(&params.code).await?);
    let user = match AccessQuery::find_by_email(&state.conn, &email).await? {
        Some(user) if user.is_active => user,
        _ => {
            info!(%email, "login refused, not on the allowlist");
            return Ok(Redirect::to(NO_ACCESS_PATH));
        }
    };

    let session =
        SessionMutation::create(&state.conn, &user.email, state.config.session_ttl()).await?;
    cookies.add(cookie(
        SESSION_COOKIE,
        session.token,
        time::Duration::hours(state.config.session_ttl_hours),
    ));
    info!(%email, "signed in");

    Ok(Redirect::to(default_landing(&user)))
}

/// Works for any live session, including one whose user lost access
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
) -> ApiResult<StatusCode> {
    let token = session_token(&headers, &cookies).ok_or(ApiError::Unauthenticated)?;
    let session = SessionQuery::resolve(&state.conn, &token, Utc::now())
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    SessionMutation::delete(&state.conn, &session.token).await?;
    cookies.remove(expired(SESSION_COOKIE));
    info!(email = %session.email, "signed out");

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct Me {
    #[serde(flatten)]
    pub user: allowed_user::Model,
    pub landing: &'static str,
}

pub async fn me(current: CurrentUser) -> Json<Me> {
    let landing = default_landing(&current.user);
    Json(Me {
        user: current.user,
        landing,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", post(logout))
}
