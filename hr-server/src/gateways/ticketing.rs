//! Ticketing system gateway
//!
//! Tickets, user directory and equipment registry of the helpdesk.
//! Bearer token auth; list endpoints wrap results in `{"data": [...]}`.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use super::{GatewayError, GatewayResult, decode_items, envelope_items, send, send_json, trim_base};

const TICKET_PRIORITY: &str = "medium";

/// Ticketing connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketingConfig {
    pub base_url: String,
    pub token: String,
}

impl TicketingConfig {
    /// `TICKETING_API_URL` + `TICKETING_TOKEN`
    pub fn from_env() -> Option<Self> {
        Some(Self {
            base_url: std::env::var("TICKETING_API_URL").ok()?,
            token: std::env::var("TICKETING_TOKEN").ok()?,
        })
    }
}

/// User as the ticketing system reports it
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TicketingUser {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "fullName")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Contact fields pushed to a ticketing user
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UserFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub full_name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
}

/// Equipment owner. Resolved to the ticketing user id by email when
/// possible, otherwise the local employee id is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRef {
    pub employee_id: u64,
    pub email: Option<String>,
}

#[async_trait]
pub trait TicketingGateway: Send + Sync {
    async fn create_ticket(
        &self,
        title: &str,
        description: &str,
        category: &str,
    ) -> GatewayResult<()>;

    async fn fetch_users(&self) -> GatewayResult<Vec<TicketingUser>>;

    async fn update_user(&self, user_id: &str, fields: &UserFields) -> GatewayResult<()>;

    async fn create_user(&self, fields: &UserFields) -> GatewayResult<()>;

    async fn fetch_equipment_for(&self, owner: &OwnerRef) -> GatewayResult<Vec<Value>>;
}

/// HTTP ticketing client
pub struct HttpTicketing {
    config: Option<TicketingConfig>,
    client: reqwest::Client,
}

impl HttpTicketing {
    pub fn new(config: Option<&TicketingConfig>, client: reqwest::Client) -> Self {
        Self {
            config: config.cloned(),
            client,
        }
    }

    fn config(&self) -> GatewayResult<&TicketingConfig> {
        self.config.as_ref().ok_or(GatewayError::NotConfigured)
    }

    fn url(config: &TicketingConfig, path: &str) -> String {
        format!("{}{}", trim_base(&config.base_url), path)
    }
}

#[async_trait]
impl TicketingGateway for HttpTicketing {
    async fn create_ticket(
        &self,
        title: &str,
        description: &str,
        category: &str,
    ) -> GatewayResult<()> {
        let config = self.config()?;
        let body = json!({
            "title": title,
            "description": description,
            "category": category,
            "priority": TICKET_PRIORITY,
        });
        send(
            self.client
                .post(Self::url(config, "/tickets"))
                .bearer_auth(&config.token)
                .json(&body),
        )
        .await?;
        tracing::info!(title = %title, category = %category, "Ticket created");
        Ok(())
    }

    async fn fetch_users(&self) -> GatewayResult<Vec<TicketingUser>> {
        let config = self.config()?;
        let payload = send_json(
            self.client
                .get(Self::url(config, "/users"))
                .bearer_auth(&config.token),
        )
        .await?;
        decode_items(payload, &["data"])
    }

    async fn update_user(&self, user_id: &str, fields: &UserFields) -> GatewayResult<()> {
        let config = self.config()?;
        send(
            self.client
                .put(Self::url(config, &format!("/users/{}", user_id)))
                .bearer_auth(&config.token)
                .json(fields),
        )
        .await?;
        Ok(())
    }

    async fn create_user(&self, fields: &UserFields) -> GatewayResult<()> {
        let config = self.config()?;
        send(
            self.client
                .post(Self::url(config, "/users"))
                .bearer_auth(&config.token)
                .json(fields),
        )
        .await?;
        Ok(())
    }

    async fn fetch_equipment_for(&self, owner: &OwnerRef) -> GatewayResult<Vec<Value>> {
        let config = self.config()?;

        let mut owner_id = owner.employee_id.to_string();
        if let Some(email) = owner.email.as_deref() {
            let resolved = self.fetch_users().await?.into_iter().find_map(|u| {
                match u.email.as_deref() {
                    Some(e) if e.eq_ignore_ascii_case(email) => u.id,
                    _ => None,
                }
            });
            if let Some(id) = resolved {
                owner_id = id;
            }
        }

        let payload = send_json(
            self.client
                .get(Self::url(config, "/equipment"))
                .query(&[("owner_id", owner_id.as_str())])
                .bearer_auth(&config.token),
        )
        .await?;
        envelope_items(payload, &["data"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_accepts_numeric_id_and_camel_case_name() {
        let user: TicketingUser = serde_json::from_value(json!({
            "id": 17,
            "email": "a@b.c",
            "fullName": "Иванов Иван",
        }))
        .unwrap();
        assert_eq!(user.id.as_deref(), Some("17"));
        assert_eq!(user.full_name.as_deref(), Some("Иванов Иван"));

        let user: TicketingUser = serde_json::from_value(json!({"id": "u-1"})).unwrap();
        assert_eq!(user.id.as_deref(), Some("u-1"));
        assert!(user.email.is_none());
    }

    #[test]
    fn test_user_fields_skip_missing_email() {
        let fields = UserFields {
            full_name: "X".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&fields).unwrap();
        assert!(value.get("email").is_none());
        assert!(value.get("department").unwrap().is_null());
    }
}
