//! External system gateways
//!
//! Each external system sits behind a small async contract. HTTP
//! implementations are built from explicit config sections; a missing
//! section yields [`GatewayError::NotConfigured`] on every call.
//!
//! Callers decide how to treat a failure. The lifecycle and sync jobs use
//! [`Degrade`] to log the failure and carry on with an empty value.

pub mod directory;
pub mod mail;
pub mod notify;
pub mod payroll;
pub mod ticketing;

#[cfg(test)]
pub mod fake;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::core::config::IntegrationsConfig;

pub use directory::{DirectoryConfig, DirectoryGateway, DirectoryUser, HttpDirectory};
pub use mail::{HttpMail, MailConfig, MailGateway};
pub use notify::{HttpNotifier, Notifier, NotifyConfig};
pub use payroll::{HttpPayroll, PayrollConfig, PayrollSource};
pub use ticketing::{
    HttpTicketing, OwnerRef, TicketingConfig, TicketingGateway, TicketingUser, UserFields,
};

/// Gateway errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("integration not configured")]
    NotConfigured,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote returned status {0}")]
    Status(u16),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidInput(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Turn a failed external call into a logged empty value
pub trait Degrade<T> {
    /// `Some(value)` on success, `None` after logging the failure
    fn logged(self, op: &str) -> Option<T>;

    /// Value on success, `T::default()` after logging the failure
    fn degrade(self, op: &str) -> T
    where
        T: Default;
}

impl<T> Degrade<T> for GatewayResult<T> {
    fn logged(self, op: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(op = %op, error = %e, "External call failed");
                None
            }
        }
    }

    fn degrade(self, op: &str) -> T
    where
        T: Default,
    {
        self.logged(op).unwrap_or_default()
    }
}

/// All gateways the core talks to
#[derive(Clone)]
pub struct Gateways {
    pub ticketing: Arc<dyn TicketingGateway>,
    pub directory: Arc<dyn DirectoryGateway>,
    pub mail: Arc<dyn MailGateway>,
    pub payroll: Arc<dyn PayrollSource>,
    pub notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for Gateways {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateways").finish_non_exhaustive()
    }
}

impl Gateways {
    /// HTTP gateways for every configured section
    pub fn from_config(config: &IntegrationsConfig, timeout: Duration) -> Self {
        let client = http_client(timeout);
        Self {
            ticketing: Arc::new(HttpTicketing::new(config.ticketing.as_ref(), client.clone())),
            directory: Arc::new(HttpDirectory::new(config.directory.as_ref(), client.clone())),
            mail: Arc::new(HttpMail::new(config.mail.as_ref(), client.clone())),
            payroll: Arc::new(HttpPayroll::new(config.payroll.as_ref(), client.clone())),
            notifier: Arc::new(HttpNotifier::new(config.notify.as_ref(), client)),
        }
    }

    /// Gateways with nothing configured: every call fails with `NotConfigured`
    pub fn unconfigured() -> Self {
        Self::from_config(&IntegrationsConfig::default(), Duration::from_secs(1))
    }
}

// ========== HTTP helpers ==========

pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to build HTTP client, using defaults");
            reqwest::Client::new()
        })
}

/// Send and require a 2xx status
pub(crate) async fn send(req: reqwest::RequestBuilder) -> GatewayResult<reqwest::Response> {
    let resp = req
        .send()
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))?;
    if !resp.status().is_success() {
        return Err(GatewayError::Status(resp.status().as_u16()));
    }
    Ok(resp)
}

/// Send, require a 2xx status and decode the body as JSON
pub(crate) async fn send_json(req: reqwest::RequestBuilder) -> GatewayResult<Value> {
    send(req)
        .await?
        .json::<Value>()
        .await
        .map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Pull the record array out of an envelope such as `{"data": [...]}`
/// or `{"value": [...]}`. A bare array is returned as is.
pub(crate) fn envelope_items(payload: Value, keys: &[&str]) -> GatewayResult<Vec<Value>> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            for key in keys {
                if let Some(Value::Array(items)) = map.remove(*key) {
                    return Ok(items);
                }
            }
            Err(GatewayError::Decode(format!(
                "no array under any of {:?}",
                keys
            )))
        }
        other => Err(GatewayError::Decode(format!(
            "expected object or array, got {}",
            other
        ))),
    }
}

/// [`envelope_items`] followed by typed decoding of every record
pub(crate) fn decode_items<T: DeserializeOwned>(payload: Value, keys: &[&str]) -> GatewayResult<Vec<T>> {
    envelope_items(payload, keys)?
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(|e| GatewayError::Decode(e.to_string())))
        .collect()
}

pub(crate) fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_items() {
        let items = envelope_items(json!({"data": [1, 2]}), &["data"]).unwrap();
        assert_eq!(items.len(), 2);

        let items = envelope_items(json!({"value": [1]}), &["value", "data"]).unwrap();
        assert_eq!(items.len(), 1);

        let items = envelope_items(json!([1, 2, 3]), &["data"]).unwrap();
        assert_eq!(items.len(), 3);

        assert!(matches!(
            envelope_items(json!({"other": []}), &["data"]),
            Err(GatewayError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_items_reports_bad_records() {
        #[derive(Debug, serde::Deserialize)]
        struct Row {
            id: u32,
        }

        let rows: Vec<Row> = decode_items(json!({"data": [{"id": 1}, {"id": 2}]}), &["data"]).unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);

        let err = decode_items::<Row>(json!({"data": [{"id": "x"}]}), &["data"]).unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn test_degrade() {
        let ok: GatewayResult<Vec<u8>> = Ok(vec![1]);
        assert_eq!(ok.degrade("op"), vec![1]);

        let failed: GatewayResult<Vec<u8>> = Err(GatewayError::Status(500));
        assert!(failed.degrade("op").is_empty());

        let failed: GatewayResult<()> = Err(GatewayError::NotConfigured);
        assert!(failed.logged("op").is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_gateways_fail_without_network() {
        let gateways = Gateways::unconfigured();
        assert_eq!(
            gateways.ticketing.fetch_users().await,
            Err(GatewayError::NotConfigured)
        );
        assert_eq!(
            gateways.directory.create_user("a@b.c", "A").await,
            Err(GatewayError::NotConfigured)
        );
        assert_eq!(
            gateways.mail.disable_mailbox("a@b.c").await,
            Err(GatewayError::NotConfigured)
        );
        assert!(!gateways.payroll.is_configured());
        // Unconfigured notifier falls back to the log
        assert_eq!(gateways.notifier.internal("hello").await, Ok(()));
    }
}
