use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{CalendarEvent, CalendarSync};
use crate::ServiceError;

pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Service-account access to one calendar
#[derive(Debug, Clone)]
pub struct GoogleCalendarConfig {
    pub calendar_id: String,
    pub service_account_email: String,
    /// PEM encoded RSA key; `\n` escapes, as found in env files, are accepted
    pub private_key: String,
    pub token_url: String,
    pub api_base: String,
}

impl GoogleCalendarConfig {
    pub fn new(calendar_id: String, service_account_email: String, private_key: String) -> Self {
        Self {
            calendar_id,
            service_account_email,
            private_key,
            token_url: DEFAULT_TOKEN_URL.to_owned(),
            api_base: DEFAULT_API_BASE.to_owned(),
        }
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: DateTime<Utc>,
}

#[derive(Serialize)]
struct EventBody<'a> {
    summary: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    start: EventTime,
    end: EventTime,
}

#[derive(Deserialize)]
struct EventResponse {
    id: String,
}

fn integration(err: impl std::fmt::Display) -> ServiceError {
    ServiceError::Integration(err.to_string())
}

pub struct GoogleCalendar {
    client: Client,
    config: GoogleCalendarConfig,
    key: EncodingKey,
    api_base: Url,
}

impl GoogleCalendar {
    pub fn new(config: GoogleCalendarConfig) -> Result<Self, ServiceError> {
        let pem = config.private_key.replace("\\n", "\n");
        let key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| integration(format!("invalid service account key: {e}")))?;
        let api_base = Url::parse(&config.api_base).map_err(integration)?;
        if api_base.cannot_be_a_base() {
            return Err(integration(format!("{api_base} cannot be a base URL")));
        }

        Ok(Self {
            client: Client::new(),
            config,
            key,
            api_base,
        })
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, ServiceError> {
        let claims = Claims {
            iss: &self.config.service_account_email,
            scope: CALENDAR_SCOPE,
            aud: &self.config.token_url,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(integration)
    }

    /// A fresh access token for every call
    async fn access_token(&self) -> Result<String, ServiceError> {
        let assertion = self.assertion(Utc::now())?;
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(integration)?;

        let token: TokenResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(integration)?;
        Ok(token.access_token)
    }

    fn events_url(&self, event_id: Option<&str>) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["calendars", self.config.calendar_id.as_str(), "events"]);
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }
        url
    }
}

async fn ensure_success(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(integration(format!("Google API returned {status}: {body}")))
}

#[async_trait]
impl CalendarSync for GoogleCalendar {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn upsert_event(
        &self,
        event_id: Option<&str>,
        event: &CalendarEvent,
    ) -> Result<String, ServiceError> {
        let token = self.access_token().await?;
        let body = EventBody {
            summary: &event.summary,
            description: event.description.as_deref(),
            start: EventTime {
                date_time: event.start,
            },
            end: EventTime {
                date_time: event.end,
            },
        };

        let request = match event_id {
            Some(_) => self.client.put(self.events_url(event_id)),
            None => self.client.post(self.events_url(None)),
        };
        let response = request
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(integration)?;

        let created: EventResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(integration)?;
        Ok(created.id)
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), ServiceError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .delete(self.events_url(Some(event_id)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(integration)?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(()),
            _ => ensure_success(response).await.map(drop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn malformed_key_is_an_integration_error() {
        let config = GoogleCalendarConfig::new(
            "kitchen@group.calendar.google.com".to_owned(),
            "sync@venue.iam.gserviceaccount.com".to_owned(),
            "not a key".to_owned(),
        );

        assert!(matches!(
            GoogleCalendar::new(config),
            Err(ServiceError::Integration(_))
        ));
    }

    #[test]
    fn event_times_serialize_as_rfc3339() {
        let body = EventBody {
            summary: "Ada (2 guests)",
            description: None,
            start: EventTime {
                date_time: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            },
            end: EventTime {
                date_time: DateTime::from_timestamp(1_700_003_600, 0).unwrap(),
            },
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "summary": "Ada (2 guests)",
                "start": { "dateTime": "2023-11-14T22:13:20Z" },
                "end": { "dateTime": "2023-11-14T23:13:20Z" },
            })
        );
    }
}
