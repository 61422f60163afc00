//! Payroll system source (OData catalogs, basic auth)

use async_trait::async_trait;
use serde_json::Value;

use super::{GatewayError, GatewayResult, envelope_items, send_json, trim_base};

const DEPARTMENTS_CATALOG: &str = "Catalog_ПодразделенияОрганизаций";
const POSITIONS_CATALOG: &str = "Catalog_Должности";
const EMPLOYEES_CATALOG: &str = "Catalog_Сотрудники";

/// Payroll OData connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl PayrollConfig {
    /// `PAYROLL_API_URL` + `PAYROLL_USERNAME` + `PAYROLL_PASSWORD`
    pub fn from_env() -> Option<Self> {
        Some(Self {
            base_url: std::env::var("PAYROLL_API_URL").ok()?,
            username: std::env::var("PAYROLL_USERNAME").ok()?,
            password: std::env::var("PAYROLL_PASSWORD").ok()?,
        })
    }
}

#[async_trait]
pub trait PayrollSource: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn fetch_departments(&self) -> GatewayResult<Vec<Value>>;

    async fn fetch_positions(&self) -> GatewayResult<Vec<Value>>;

    async fn fetch_employees(&self) -> GatewayResult<Vec<Value>>;
}

/// HTTP OData client
pub struct HttpPayroll {
    config: Option<PayrollConfig>,
    client: reqwest::Client,
}

impl HttpPayroll {
    pub fn new(config: Option<&PayrollConfig>, client: reqwest::Client) -> Self {
        Self {
            config: config.cloned(),
            client,
        }
    }

    fn catalog_request(&self, catalog: &str) -> GatewayResult<reqwest::RequestBuilder> {
        let config = self.config.as_ref().ok_or(GatewayError::NotConfigured)?;
        Ok(self
            .client
            .get(format!("{}/{}", trim_base(&config.base_url), catalog))
            .query(&[("$format", "json")])
            .header(reqwest::header::ACCEPT, "application/json")
            .basic_auth(&config.username, Some(&config.password)))
    }

    async fn fetch_catalog(&self, catalog: &str) -> GatewayResult<Vec<Value>> {
        let payload = send_json(self.catalog_request(catalog)?).await?;
        let items = envelope_items(payload, &["value", "data"])?;
        tracing::debug!(catalog = %catalog, count = items.len(), "Fetched payroll catalog");
        Ok(items)
    }
}

#[async_trait]
impl PayrollSource for HttpPayroll {
    fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    async fn fetch_departments(&self) -> GatewayResult<Vec<Value>> {
        self.fetch_catalog(DEPARTMENTS_CATALOG).await
    }

    async fn fetch_positions(&self) -> GatewayResult<Vec<Value>> {
        self.fetch_catalog(POSITIONS_CATALOG).await
    }

    async fn fetch_employees(&self) -> GatewayResult<Vec<Value>> {
        self.fetch_catalog(EMPLOYEES_CATALOG).await
    }
}
