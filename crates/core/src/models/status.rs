use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Terminal provisioning status stored per username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionStatus {
    Completed,
    Failed,
    /// A value written by something other than this system.
    Other(String),
}

impl ProvisionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Extra context stored alongside a status, serialized as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusDetails {
    pub email: String,
}

/// Per-username provisioning record; the idempotency gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub username: String,
    pub status: ProvisionStatus,
    /// Unix seconds at which the status was written.
    pub ts: i64,
    pub details: Option<StatusDetails>,
}

impl StatusRecord {
    pub fn new(username: &str, status: ProvisionStatus, email: &str) -> Self {
        Self {
            username: username.to_string(),
            status,
            ts: Utc::now().timestamp(),
            details: Some(StatusDetails {
                email: email.to_string(),
            }),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProvisionStatus::Completed
    }

    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.ts, 0).single()
    }
}
