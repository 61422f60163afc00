//! Mail service gateway (mailbox admin API, `X-API-Key` auth)

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{GatewayError, GatewayResult, send, trim_base};

const MAILBOX_QUOTA_MB: u32 = 1024;

/// Mail admin connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub base_url: String,
    pub api_key: String,
}

impl MailConfig {
    /// `MAIL_API_URL` + `MAIL_API_KEY`
    pub fn from_env() -> Option<Self> {
        Some(Self {
            base_url: std::env::var("MAIL_API_URL").ok()?,
            api_key: std::env::var("MAIL_API_KEY").ok()?,
        })
    }
}

#[async_trait]
pub trait MailGateway: Send + Sync {
    async fn create_mailbox(&self, email: &str, full_name: &str) -> GatewayResult<()>;

    async fn disable_mailbox(&self, email: &str) -> GatewayResult<()>;
}

/// Body of `add/mailbox`; the address must have both parts
fn new_mailbox_body(email: &str, full_name: &str) -> GatewayResult<Value> {
    let (local_part, domain) = email
        .split_once('@')
        .filter(|(local, domain)| !local.is_empty() && !domain.is_empty())
        .ok_or_else(|| GatewayError::InvalidInput(format!("not an address: {}", email)))?;
    Ok(json!({
        "local_part": local_part,
        "domain": domain,
        "name": full_name,
        "quota": MAILBOX_QUOTA_MB,
        "active": 1,
    }))
}

/// HTTP mail admin client
pub struct HttpMail {
    config: Option<MailConfig>,
    client: reqwest::Client,
}

impl HttpMail {
    pub fn new(config: Option<&MailConfig>, client: reqwest::Client) -> Self {
        Self {
            config: config.cloned(),
            client,
        }
    }

    fn post(&self, path: &str, body: Value) -> GatewayResult<reqwest::RequestBuilder> {
        let config = self.config.as_ref().ok_or(GatewayError::NotConfigured)?;
        Ok(self
            .client
            .post(format!("{}{}", trim_base(&config.base_url), path))
            .header("X-API-Key", &config.api_key)
            .json(&body))
    }

    fn create_request(&self, email: &str, full_name: &str) -> GatewayResult<reqwest::RequestBuilder> {
        self.post("/api/v1/add/mailbox", new_mailbox_body(email, full_name)?)
    }

    fn disable_request(&self, email: &str) -> GatewayResult<reqwest::RequestBuilder> {
        self.post(
            "/api/v1/edit/mailbox",
            json!({ "items": [email], "attr": { "active": 0 } }),
        )
    }
}

#[async_trait]
impl MailGateway for HttpMail {
    async fn create_mailbox(&self, email: &str, full_name: &str) -> GatewayResult<()> {
        send(self.create_request(email, full_name)?).await?;
        tracing::info!(email = %email, "Mailbox created");
        Ok(())
    }

    async fn disable_mailbox(&self, email: &str) -> GatewayResult<()> {
        send(self.disable_request(email)?).await?;
        Ok(())
    }
}
