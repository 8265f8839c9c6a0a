//! Environment-based configuration for the two provisioning functions.
//!
//! Both functions read their settings once at cold start. `from_lookup` takes
//! any variable source so tests never touch the process environment.

use crate::error::{LabAccessError, Result};

/// Settings for the Roster Sync function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSyncConfig {
    pub identity_store_id: String,
    /// Groups every new user joins, in declaration order.
    pub group_ids: Vec<String>,
    pub slack_webhook_url: String,
}

impl RosterSyncConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            identity_store_id: required(&lookup, "IDENTITY_STORE_ID")?,
            group_ids: split_list(&required(&lookup, "ROSTER_GROUP_IDS")?),
            slack_webhook_url: required(&lookup, "SLACK_WEBHOOK_URL")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, returning an error for unusable values.
    pub fn validate(&self) -> Result<()> {
        if self.group_ids.is_empty() {
            return Err(LabAccessError::Config(
                "ROSTER_GROUP_IDS must list at least one group id".into(),
            ));
        }
        if !self.slack_webhook_url.starts_with("https://")
            && !self.slack_webhook_url.starts_with("http://")
        {
            return Err(LabAccessError::Config(
                "SLACK_WEBHOOK_URL must be an http(s) URL".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for the User Provisioner function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionerConfig {
    pub identity_store_id: String,
    pub instance_arn: String,
    pub permission_set_arn: String,
    pub target_account_id: String,
    pub ses_sender: String,
    pub status_table: String,
    pub csv_bucket: String,
    pub csv_prefix: String,
    /// SSM parameter name holding the chat webhook URL.
    pub slack_webhook_param: Option<String>,
    pub access_portal_url: String,
    pub student_group_name: Option<String>,
    pub email_sign_off: Option<String>,
}

impl ProvisionerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            identity_store_id: required(&lookup, "IDENTITY_STORE_ID")?,
            instance_arn: required(&lookup, "INSTANCE_ARN")?,
            permission_set_arn: required(&lookup, "PERMISSION_SET_ARN")?,
            target_account_id: required(&lookup, "TARGET_ACCOUNT_ID")?,
            ses_sender: required(&lookup, "SES_SENDER")?,
            status_table: required(&lookup, "DDB_TABLE")?,
            csv_bucket: required(&lookup, "CSV_BUCKET")?,
            // An empty prefix is legal and matches every key.
            csv_prefix: lookup("CSV_PREFIX").ok_or_else(|| missing("CSV_PREFIX"))?,
            slack_webhook_param: optional(&lookup, "SLACK_WEBHOOK_PARAM"),
            access_portal_url: optional(&lookup, "ACCESS_PORTAL_URL").unwrap_or_default(),
            student_group_name: optional(&lookup, "STUDENT_GROUP_NAME"),
            email_sign_off: optional(&lookup, "EMAIL_SIGN_OFF"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, returning an error for unusable values.
    pub fn validate(&self) -> Result<()> {
        if !self.instance_arn.starts_with("arn:") {
            return Err(LabAccessError::Config(
                "INSTANCE_ARN must be an ARN".into(),
            ));
        }
        if !self.permission_set_arn.starts_with("arn:") {
            return Err(LabAccessError::Config(
                "PERMISSION_SET_ARN must be an ARN".into(),
            ));
        }
        if self.target_account_id.len() != 12
            || !self.target_account_id.chars().all(|c| c.is_ascii_digit())
        {
            return Err(LabAccessError::Config(
                "TARGET_ACCOUNT_ID must be a 12-digit account id".into(),
            ));
        }
        if !self.ses_sender.contains('@') {
            return Err(LabAccessError::Config(
                "SES_SENDER must be an email address".into(),
            ));
        }
        Ok(())
    }
}

fn missing(name: &str) -> LabAccessError {
    LabAccessError::Config(format!("{name} is not set"))
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or_else(|| missing(name))
}

/// Returns the trimmed value, treating blank values as unset.
fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
