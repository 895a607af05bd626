use std::{env, fmt::Display, str::FromStr};

use chrono::Duration;
use thiserror::Error;
use tracing::{info, warn};
use venue_office_service::integrations::GoogleCalendarConfig;

pub const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid {key} value {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session_ttl_hours: i64,
    pub bootstrap_admin_email: Option<String>,
    pub public_base_url: String,
    pub oauth_client_id: Option<String>,
    pub oauth_client_secret: Option<String>,
    pub oauth_authorize_url: String,
    pub oauth_token_url: String,
    pub oauth_userinfo_url: String,
    pub google_calendar_id: Option<String>,
    pub google_service_account_email: Option<String>,
    pub google_service_account_key: Option<String>,
    pub reservation_default_minutes: i32,
    pub sumup_api_key: Option<String>,
    pub run_migrations: bool,
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
{
    match var(key) {
        Some(value) => value.trim().parse().map_err(|_| {
            warn!("Invalid {key} value: {value}");
            ConfigError::Invalid { key, value }
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

impl AppConfig {
    /// Defaults for everything but the database
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "0.0.0.0".to_owned(),
            port: 8000,
            session_ttl_hours: 168,
            bootstrap_admin_email: None,
            public_base_url: "http://localhost:8000".to_owned(),
            oauth_client_id: None,
            oauth_client_secret: None,
            oauth_authorize_url: GOOGLE_AUTHORIZE_URL.to_owned(),
            oauth_token_url: GOOGLE_TOKEN_URL.to_owned(),
            oauth_userinfo_url: GOOGLE_USERINFO_URL.to_owned(),
            google_calendar_id: None,
            google_service_account_email: None,
            google_service_account_key: None,
            reservation_default_minutes: 120,
            sumup_api_key: None,
            run_migrations: true,
        }
    }

    /// Read the process environment; call `dotenvy::dotenv()` first to pick
    /// up a `.env` file
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::new(var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?);

        let config = Self {
            host: try_load("HOST", defaults.host.clone())?,
            port: try_load("PORT", defaults.port)?,
            session_ttl_hours: try_load("SESSION_TTL_HOURS", defaults.session_ttl_hours)?,
            bootstrap_admin_email: var("BOOTSTRAP_ADMIN_EMAIL"),
            public_base_url: try_load("PUBLIC_BASE_URL", defaults.public_base_url.clone())?,
            oauth_client_id: var("OAUTH_CLIENT_ID"),
            oauth_client_secret: var("OAUTH_CLIENT_SECRET"),
            oauth_authorize_url: try_load(
                "OAUTH_AUTHORIZE_URL",
                defaults.oauth_authorize_url.clone(),
            )?,
            oauth_token_url: try_load("OAUTH_TOKEN_URL", defaults.oauth_token_url.clone())?,
            oauth_userinfo_url: try_load(
                "OAUTH_USERINFO_URL",
                defaults.oauth_userinfo_url.clone(),
            )?,
            google_calendar_id: var("GOOGLE_CALENDAR_ID"),
            google_service_account_email: var("GOOGLE_SERVICE_ACCOUNT_EMAIL"),
            google_service_account_key: var("GOOGLE_SERVICE_ACCOUNT_KEY"),
            reservation_default_minutes: try_load(
                "RESERVATION_DEFAULT_MINUTES",
                defaults.reservation_default_minutes,
            )?,
            sumup_api_key: var("SUMUP_API_KEY"),
            run_migrations: try_load("RUN_MIGRATIONS", defaults.run_migrations)?,
            ..defaults
        };

        if config.session_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_HOURS",
                value: config.session_ttl_hours.to_string(),
            });
        }
        if config.reservation_default_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "RESERVATION_DEFAULT_MINUTES",
                value: config.reservation_default_minutes.to_string(),
            });
        }

        Ok(config)
    }

    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::hours(self.session_ttl_hours)
    }

    /// Present only when client id and secret are both set
    pub fn oauth(&self) -> Option<OAuthConfig> {
        Some(OAuthConfig {
            client_id: self.oauth_client_id.clone()?,
            client_secret: self.oauth_client_secret.clone()?,
            authorize_url: self.oauth_authorize_url.clone(),
            token_url: self.oauth_token_url.clone(),
            userinfo_url: self.oauth_userinfo_url.clone(),
            redirect_uri: format!(
                "{}/auth/callback",
                self.public_base_url.trim_end_matches('/')
            ),
        })
    }

    pub fn calendar(&self) -> Option<GoogleCalendarConfig> {
        Some(GoogleCalendarConfig::new(
            self.google_calendar_id.clone()?,
            self.google_service_account_email.clone()?,
            self.google_service_account_key.clone()?,
        ))
    }
}
