//! Audit Entry Model

use serde::{Deserialize, Serialize};

/// Append-only record of a mutating operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: u64,
    /// Acting user name, or `system` for background jobs
    pub user: String,
    pub action: String,
    pub entity: String,
    /// Unix millis
    pub timestamp: i64,
    #[serde(default)]
    pub details: Option<String>,
}

impl AuditEntry {
    pub fn new(
        user: impl Into<String>,
        action: impl Into<String>,
        entity: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            id: 0,
            user: user.into(),
            action: action.into(),
            entity: entity.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            details,
        }
    }
}
