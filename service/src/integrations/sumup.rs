use serde::Serialize;

use crate::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SumUpStatus {
    pub configured: bool,
    pub connected: bool,
    pub message: &'static str,
}

/// Point-of-sale link; only reports whether an API key is present.
#[derive(Debug, Clone, Default)]
pub struct SumUpClient {
    api_key: Option<String>,
}

impl SumUpClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn status(&self) -> SumUpStatus {
        let configured = self.api_key.is_some();
        SumUpStatus {
            configured,
            connected: false,
            message: if configured {
                "SumUp API key present; transaction import is not available"
            } else {
                "SumUp is not configured"
            },
        }
    }

    /// Transaction import is intentionally unavailable and always answers `NotImplemented`
    pub async fn list_transactions(&self) -> Result<Vec<serde_json::Value>, ServiceError> {
        Err(ServiceError::NotImplemented("SumUp transaction import"))
    }
}
