use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::{config::OAuthConfig, error::ApiError};

const LOGIN_SCOPE: &str = "openid email profile";

/// The login provider, reduced to the two steps of the code flow
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Where to send the browser, carrying the anti-forgery `state`
    fn authorize_url(&self, state: &str) -> Result<String, ApiError>;

    /// Trade an authorization code for the user's email address
    async fn exchange_code(&self, code: &str) -> Result<String, ApiError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
    email: Option<String>,
    email_verified: Option<bool>,
}

fn integration(err: impl std::fmt::Display) -> ApiError {
    ApiError::Integration(format!("Login provider error: {err}"))
}

/// OAuth 2.0 authorization code flow against the configured endpoints
pub struct OAuthProvider {
    client: Client,
    config: OAuthConfig,
}

impl OAuthProvider {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl IdentityProvider for OAuthProvider {
    fn authorize_url(&self, state: &str) -> Result<String, ApiError> {
        let url = Url::parse_with_params(
            &self.config.authorize_url,
            [
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", LOGIN_SCOPE),
                ("state", state),
            ],
        )
        .map_err(integration)?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(integration)?;
        let token: TokenResponse = response.json().await.map_err(integration)?;

        let info: UserInfo = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(token.access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(integration)?
            .json()
            .await
            .map_err(integration)?;

        match info {
            UserInfo {
                email: Some(email),
                email_verified: None | Some(true),
            } => Ok(email),
            _ => Err(ApiError::Unauthenticated),
        }
    }
}
