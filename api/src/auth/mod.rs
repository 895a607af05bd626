//! Session resolution and per-module authorization for handlers.

mod oauth;

pub use oauth::{IdentityProvider, OAuthProvider};

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use chrono::Utc;
use entity::allowed_user;
use tower_cookies::Cookies;
use tracing::info;
use venue_office_service::access::{
    evaluate, AccessLevel, AccessQuery, Decision, Module, SessionQuery, NO_ACCESS_PATH,
};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub const SESSION_COOKIE: &str = "vo_session";
pub const OAUTH_STATE_COOKIE: &str = "vo_oauth_state";

/// The signed-in caller; extracting it fails with 401 without a live session
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: allowed_user::Model,
    pub token: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

/// The session token a request carries, the bearer header before the cookie
pub fn session_token(headers: &HeaderMap, cookies: &Cookies) -> Option<String> {
    bearer_token(headers).or_else(|| {
        cookies
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_owned())
    })
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(&parts.headers) {
            Some(token) => Some(token),
            None => Cookies::from_request_parts(parts, state)
                .await
                .ok()
                .and_then(|cookies| {
                    cookies
                        .get(SESSION_COOKIE)
                        .map(|cookie| cookie.value().to_owned())
                }),
        }
        .ok_or(ApiError::Unauthenticated)?;

        let session = SessionQuery::resolve(&state.conn, &token, Utc::now())
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        match AccessQuery::find_by_email(&state.conn, &session.email).await? {
            Some(user) if user.is_active => Ok(Self { user, token }),
            _ => {
                info!(email = %session.email, "session of a removed or inactive user");
                Err(ApiError::Forbidden {
                    redirect_to: NO_ACCESS_PATH,
                })
            }
        }
    }
}

impl CurrentUser {
    /// Turn the allowlist decision for `module` into a 403 unless allowed
    pub fn authorize(&self, module: Module, level: AccessLevel) -> ApiResult<()> {
        match evaluate(Some(&self.user), module, level) {
            Decision::Allow => Ok(()),
            Decision::Redirect(redirect_to) => {
                info!(email = %self.user.email, %module, ?level, "access redirected");
                Err(ApiError::Forbidden { redirect_to })
            }
            Decision::Deny(reason) => {
                info!(email = %self.user.email, %module, ?reason, "access denied");
                Err(ApiError::Forbidden {
                    redirect_to: NO_ACCESS_PATH,
                })
            }
        }
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use pretty_assertions::assert_eq;

    fn headers(authorization: &str) -> HeaderMap {
        Request::builder()
            .header(AUTHORIZATION, authorization)
            .body(())
            .unwrap()
            .into_parts()
            .0
            .headers
    }

    #[test]
    fn bearer_tokens() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc".to_owned()));
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
        assert_eq!(bearer_token(&headers("Basic abc")), None);
    }
}
