use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::gateways::{DirectoryConfig, MailConfig, NotifyConfig, PayrollConfig, TicketingConfig};

/// External system settings
///
/// A section is `Some` only when all of its required variables are set.
#[derive(Debug, Clone, Default)]
pub struct IntegrationsConfig {
    pub ticketing: Option<TicketingConfig>,
    pub directory: Option<DirectoryConfig>,
    pub mail: Option<MailConfig>,
    pub payroll: Option<PayrollConfig>,
    pub notify: Option<NotifyConfig>,
    /// Shared secret of the payroll webhook (`X-Payroll-Token`)
    pub payroll_webhook_token: Option<String>,
}

impl IntegrationsConfig {
    pub fn from_env() -> Self {
        Self {
            ticketing: TicketingConfig::from_env(),
            directory: DirectoryConfig::from_env(),
            mail: MailConfig::from_env(),
            payroll: PayrollConfig::from_env(),
            notify: NotifyConfig::from_env(),
            payroll_webhook_token: std::env::var("PAYROLL_WEBHOOK_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
        }
    }
}

/// Server configuration
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/hr-desk | database and logs |
/// | HTTP_PORT | 8000 | HTTP port |
/// | ENVIRONMENT | development | deployment name |
/// | REQUEST_TIMEOUT_MS | 10000 | external call timeout |
/// | DUE_SWEEP_INTERVAL_SECS | 60 | due request sweep interval |
/// | IMPORT_DIR | {WORK_DIR}/import | JSON import directory |
/// | EMAIL_DOMAIN | teplocentral.org | corporate mail domain |
/// | HR_MAILBOX | hr@company.local | welcome mail for hires without a mailbox |
/// | IT_MAILBOX | it@company.local | unreturned equipment notices |
///
/// External system variables are listed on [`IntegrationsConfig`].
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub jwt: JwtConfig,
    /// development | staging | production
    pub environment: String,
    pub request_timeout_ms: u64,
    pub due_sweep_interval_secs: u64,
    pub import_dir: String,
    pub email_domain: String,
    pub hr_mailbox: String,
    pub it_mailbox: String,
    pub integrations: IntegrationsConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Loads configuration from the environment, with defaults for anything unset
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/hr-desk".into());
        let import_dir = std::env::var("IMPORT_DIR").unwrap_or_else(|_| {
            PathBuf::from(&work_dir)
                .join("import")
                .to_string_lossy()
                .into_owned()
        });

        Self {
            http_port: env_or("HTTP_PORT", 8000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 10_000),
            due_sweep_interval_secs: env_or("DUE_SWEEP_INTERVAL_SECS", 60),
            import_dir,
            email_domain: std::env::var("EMAIL_DOMAIN")
                .unwrap_or_else(|_| shared::naming::DEFAULT_EMAIL_DOMAIN.into()),
            hr_mailbox: std::env::var("HR_MAILBOX").unwrap_or_else(|_| "hr@company.local".into()),
            it_mailbox: std::env::var("IT_MAILBOX").unwrap_or_else(|_| "it@company.local".into()),
            integrations: IntegrationsConfig::from_env(),
            work_dir,
        }
    }

    /// Environment config with a different work dir and port and no external systems
    ///
    /// Mostly for tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.import_dir = PathBuf::from(&config.work_dir)
            .join("import")
            .to_string_lossy()
            .into_owned();
        config.http_port = http_port;
        config.integrations = IntegrationsConfig::default();
        config
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("hr-desk.redb")
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
