//! Roster Sync engine: create missing directory users from a roster file and
//! add each new user to the configured groups.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use lab_access_core::config::RosterSyncConfig;
use lab_access_core::error::{LabAccessError, Result};
use lab_access_core::events::{ObjectRef, S3Notification};
use lab_access_core::models::directory::{MembershipOutcome, NewDirectoryUser};
use lab_access_core::models::roster::RosterRow;
use lab_access_core::roster_csv::parse_roster;
use lab_access_core::services::{IdentityDirectory, ObjectStore};
use lab_access_core::slack::SlackNotifier;

/// Email `Type` for users created by the sync.
pub const WORK_EMAIL_TYPE: &str = "work";

/// Usernames created and skipped during one run, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

impl SyncSummary {
    /// Chat and response text for a finished run.
    pub fn message(&self) -> String {
        format!(
            "Lambda User Sync Completed\nCreated: {}\nSkipped: {}",
            quoted_list(&self.created),
            quoted_list(&self.skipped)
        )
    }
}

fn quoted_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    format!("[{}]", quoted.join(", "))
}

/// HTTP-shaped function result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

/// Bucket and decoded key of the first record in a raw S3 notification.
fn first_object(event: &Value) -> Result<ObjectRef> {
    let notification = S3Notification::deserialize(event)
        .map_err(|e| LabAccessError::Event(format!("malformed S3 notification: {e}")))?;
    notification
        .records
        .first()
        .ok_or_else(|| LabAccessError::Event("notification has no records".into()))?
        .object_ref()
}

pub struct RosterSync {
    directory: Arc<dyn IdentityDirectory>,
    objects: Arc<dyn ObjectStore>,
    slack: SlackNotifier,
    config: RosterSyncConfig,
}

impl RosterSync {
    pub fn new(
        directory: Arc<dyn IdentityDirectory>,
        objects: Arc<dyn ObjectStore>,
        slack: SlackNotifier,
        config: RosterSyncConfig,
    ) -> Self {
        Self {
            directory,
            objects,
            slack,
            config,
        }
    }

    pub fn config(&self) -> &RosterSyncConfig {
        &self.config
    }

    /// Run the sync for the first object in `event` and shape the result.
    ///
    /// A malformed payload counts as an invocation-level error: it is posted
    /// to chat and returned as a 500.
    pub async fn handle_event(&self, event: &Value) -> SyncResponse {
        let result = match first_object(event) {
            Ok(object) => self.run(&object).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(summary) => {
                let body = summary.message();
                info!("{body}");
                self.slack.notify(&body).await;
                SyncResponse {
                    status_code: 200,
                    body,
                }
            }
            Err(e) => {
                let body = format!("Lambda error: {e}");
                error!(error = %e, "roster sync failed");
                self.slack.notify(&body).await;
                SyncResponse {
                    status_code: 500,
                    body,
                }
            }
        }
    }

    /// Sync every row of the roster at `object`.
    ///
    /// Incomplete rows are skipped without being counted. A failure creating a
    /// user or adding it to a group aborts the run.
    pub async fn run(&self, object: &ObjectRef) -> Result<SyncSummary> {
        let data = self.objects.get_object(&object.bucket, &object.key).await?;
        let rows: Vec<RosterRow> = parse_roster(&data)?;
        info!(%object, rows = rows.len(), "syncing roster");

        let mut summary = SyncSummary::default();
        for row in &rows {
            if !row.is_complete() {
                warn!(?row, "skipping row with missing data");
                continue;
            }

            let username = row.normalized_username();
            if self.user_exists(&username).await {
                info!(username = %username, "user already exists, skipping");
                summary.skipped.push(username);
                continue;
            }

            let new_user = NewDirectoryUser::new(
                &username,
                row.first_name.trim(),
                row.last_name.trim(),
                row.email.trim(),
            )
            .with_email_type(WORK_EMAIL_TYPE);
            info!(username = %username, email = %new_user.email, "creating user");
            let user_id = self.directory.create_user(&new_user).await?;

            for group_id in &self.config.group_ids {
                match self.directory.create_group_membership(group_id, &user_id).await? {
                    MembershipOutcome::Created => {
                        debug!(username = %username, group_id = %group_id, "added to group")
                    }
                    MembershipOutcome::AlreadyMember => {
                        debug!(username = %username, group_id = %group_id, "already in group")
                    }
                }
            }

            summary.created.push(username);
        }

        Ok(summary)
    }

    /// Exact `UserName` lookup. Lookup errors count as "not found".
    pub async fn user_exists(&self, username: &str) -> bool {
        match self.directory.find_user_by_username(username).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                warn!(username, error = %e, "user lookup failed");
                false
            }
        }
    }
}
