use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::info;
use venue_office_service::{
    integrations::{CalendarSync, DisabledCalendar, GoogleCalendar, SumUpClient},
    ServiceError,
};

use crate::{
    auth::{IdentityProvider, OAuthProvider},
    config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub conn: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub calendar: Arc<dyn CalendarSync>,
    /// `None` when OAuth login is not configured
    pub identity: Option<Arc<dyn IdentityProvider>>,
    pub sumup: Arc<SumUpClient>,
}

impl AppState {
    /// Wire the integrations the configuration enables
    pub fn new(conn: DatabaseConnection, config: AppConfig) -> Result<Self, ServiceError> {
        let calendar: Arc<dyn CalendarSync> = match config.calendar() {
            Some(calendar) => {
                info!(calendar_id = %calendar.calendar_id, "Google Calendar sync enabled");
                Arc::new(GoogleCalendar::new(calendar)?)
            }
            None => {
                info!("Google Calendar sync disabled");
                Arc::new(DisabledCalendar)
            }
        };

        let identity = config.oauth().map(|oauth| {
            info!(authorize_url = %oauth.authorize_url, "OAuth login enabled");
            Arc::new(OAuthProvider::new(oauth)) as Arc<dyn IdentityProvider>
        });

        Ok(Self {
            sumup: Arc::new(SumUpClient::new(config.sumup_api_key.clone())),
            conn,
            config: Arc::new(config),
            calendar,
            identity,
        })
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_calendar(mut self, calendar: Arc<dyn CalendarSync>) -> Self {
        self.calendar = calendar;
        self
    }
}
