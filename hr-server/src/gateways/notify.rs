//! Notification dispatch
//!
//! Emails and internal notices are posted to a notification webhook.
//! Without one, they are written to the log under target `notify`.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{GatewayResult, send};

/// Notification webhook settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    pub webhook_url: String,
    pub token: Option<String>,
}

impl NotifyConfig {
    /// `NOTIFY_WEBHOOK_URL` (+ optional `NOTIFY_TOKEN`)
    pub fn from_env() -> Option<Self> {
        Some(Self {
            webhook_url: std::env::var("NOTIFY_WEBHOOK_URL").ok()?,
            token: std::env::var("NOTIFY_TOKEN").ok(),
        })
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> GatewayResult<()>;

    async fn internal(&self, message: &str) -> GatewayResult<()>;
}

pub struct HttpNotifier {
    config: Option<NotifyConfig>,
    client: reqwest::Client,
}

impl HttpNotifier {
    pub fn new(config: Option<&NotifyConfig>, client: reqwest::Client) -> Self {
        Self {
            config: config.cloned(),
            client,
        }
    }

    fn post_request(&self, config: &NotifyConfig, body: &Value) -> reqwest::RequestBuilder {
        let req = self.client.post(&config.webhook_url).json(body);
        match &config.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn post(&self, config: &NotifyConfig, body: Value) -> GatewayResult<()> {
        send(self.post_request(config, &body)).await?;
        Ok(())
    }
}

fn email_body(to: &str, subject: &str, body: &str) -> Value {
    json!({ "kind": "email", "to": to, "subject": subject, "body": body })
}

fn internal_body(message: &str) -> Value {
    json!({ "kind": "internal", "message": message })
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> GatewayResult<()> {
        match &self.config {
            Some(config) => self.post(config, email_body(to, subject, body)).await,
            None => {
                tracing::info!(target: "notify", to = %to, subject = %subject, "Email");
                Ok(())
            }
        }
    }

    async fn internal(&self, message: &str) -> GatewayResult<()> {
        match &self.config {
            Some(config) => self.post(config, internal_body(message)).await,
            None => {
                tracing::info!(target: "notify", message = %message, "Internal notification");
                Ok(())
            }
        }
    }
}
