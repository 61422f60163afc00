//! Directory service gateway
//!
//! Talks to the directory's HTTP bridge with basic auth. Accounts are
//! addressed by their login (the email local part).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{GatewayError, GatewayResult, decode_items, send, send_json, trim_base};

/// Directory connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl DirectoryConfig {
    /// `DIRECTORY_API_URL` + `DIRECTORY_USER` + `DIRECTORY_PASSWORD`
    pub fn from_env() -> Option<Self> {
        Some(Self {
            base_url: std::env::var("DIRECTORY_API_URL").ok()?,
            username: std::env::var("DIRECTORY_USER").ok()?,
            password: std::env::var("DIRECTORY_PASSWORD").ok()?,
        })
    }
}

/// Directory entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DirectoryUser {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub title: String,
    pub account: String,
}

#[async_trait]
pub trait DirectoryGateway: Send + Sync {
    async fn search_users(&self) -> GatewayResult<Vec<DirectoryUser>>;

    /// Create an account and return its login
    async fn create_user(&self, email: &str, full_name: &str) -> GatewayResult<String>;

    async fn disable_user(&self, account: &str) -> GatewayResult<()>;

    /// Block several accounts in one call
    async fn block_users(&self, accounts: &[String]) -> GatewayResult<()>;
}

/// Body of the create-user call; the login is the email local part
fn new_user_body(email: &str, full_name: &str) -> (String, Value) {
    let account = shared::naming::local_part(email).to_string();
    let body = json!({
        "account": account,
        "user_principal_name": email,
        "full_name": full_name,
    });
    (account, body)
}

/// HTTP directory client
pub struct HttpDirectory {
    config: Option<DirectoryConfig>,
    client: reqwest::Client,
}

impl HttpDirectory {
    pub fn new(config: Option<&DirectoryConfig>, client: reqwest::Client) -> Self {
        Self {
            config: config.cloned(),
            client,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> GatewayResult<reqwest::RequestBuilder> {
        let config = self.config.as_ref().ok_or(GatewayError::NotConfigured)?;
        Ok(self
            .client
            .request(method, format!("{}{}", trim_base(&config.base_url), path))
            .basic_auth(&config.username, Some(&config.password)))
    }
}

#[async_trait]
impl DirectoryGateway for HttpDirectory {
    async fn search_users(&self) -> GatewayResult<Vec<DirectoryUser>> {
        let payload = send_json(self.request(reqwest::Method::GET, "/users")?).await?;
        decode_items(payload, &["data", "users"])
    }

    async fn create_user(&self, email: &str, full_name: &str) -> GatewayResult<String> {
        let (account, body) = new_user_body(email, full_name);
        send(self.request(reqwest::Method::POST, "/users")?.json(&body)).await?;
        tracing::info!(account = %account, "Directory account created");
        Ok(account)
    }

    async fn disable_user(&self, account: &str) -> GatewayResult<()> {
        send(self.request(reqwest::Method::POST, &format!("/users/{}/disable", account))?).await?;
        Ok(())
    }

    async fn block_users(&self, accounts: &[String]) -> GatewayResult<()> {
        send(
            self.request(reqwest::Method::POST, "/users/block")?
                .json(&json!({ "accounts": accounts })),
        )
        .await?;
        Ok(())
    }
}
