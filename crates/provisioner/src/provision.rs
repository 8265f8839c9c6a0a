//! Per-row provisioning: user, group membership, account assignment, status,
//! notifications.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use lab_access_core::config::ProvisionerConfig;
use lab_access_core::error::{LabAccessError, Result};
use lab_access_core::models::assignment::{AssignmentOutcome, AssignmentRequest, AssignmentTarget};
use lab_access_core::models::directory::{MembershipOutcome, NewDirectoryUser};
use lab_access_core::models::roster::StudentRow;
use lab_access_core::models::status::{ProvisionStatus, StatusRecord};
use lab_access_core::services::{AccountAccess, IdentityDirectory, Mailer, ObjectStore, StatusStore};
use lab_access_core::slack::SlackNotifier;

use crate::email::welcome_email;
use crate::poll::{wait_for_assignment, PollPolicy};

/// `UserType` given to users this function creates.
pub const STUDENT_USER_TYPE: &str = "Student";

/// Service handles, built once per cold start.
#[derive(Clone)]
pub struct ProvisionerServices {
    pub directory: Arc<dyn IdentityDirectory>,
    pub access: Arc<dyn AccountAccess>,
    pub status: Arc<dyn StatusStore>,
    pub mailer: Arc<dyn Mailer>,
    pub objects: Arc<dyn ObjectStore>,
}

/// What happened to one roster row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// A COMPLETED record already existed; nothing was touched.
    AlreadyCompleted,
    Completed,
    Failed,
}

/// The User Provisioner pipeline.
pub struct UserProvisioner {
    pub(crate) services: ProvisionerServices,
    pub(crate) slack: SlackNotifier,
    pub(crate) config: ProvisionerConfig,
    poll: PollPolicy,
}

impl UserProvisioner {
    pub fn new(services: ProvisionerServices, slack: SlackNotifier, config: ProvisionerConfig) -> Self {
        Self {
            services,
            slack,
            config,
            poll: PollPolicy::default(),
        }
    }

    /// Override the assignment poll cadence.
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn config(&self) -> &ProvisionerConfig {
        &self.config
    }

    /// Provision one roster row.
    ///
    /// Errors are row-scoped: a missing field, a failed user creation or a
    /// failed status write. Callers log them and move on to the next row.
    pub async fn process_record(&self, row: &StudentRow) -> Result<RowOutcome> {
        let row = row.trimmed();
        let missing = row.missing_fields();
        if !missing.is_empty() {
            return Err(LabAccessError::InvalidRow(format!(
                "missing required fields {missing:?} in row {row:?}"
            )));
        }

        if let Some(existing) = self.services.status.get_status(&row.username).await? {
            let written_at = existing.written_at().map(|t| t.to_rfc3339());
            if existing.is_completed() {
                info!(username = %row.username, written_at = ?written_at, "already COMPLETED, skipping");
                return Ok(RowOutcome::AlreadyCompleted);
            }
            debug!(
                username = %row.username,
                status = existing.status.as_str(),
                written_at = ?written_at,
                "reprocessing"
            );
        }

        let user_id = self.ensure_user(&row).await?;
        self.ensure_group_membership(&user_id).await;
        let outcome = self.ensure_account_assignment(&user_id).await;
        info!(username = %row.username, user_id = %user_id, %outcome, "assignment settled");

        if outcome.is_success() {
            self.services
                .status
                .put_status(&StatusRecord::new(&row.username, ProvisionStatus::Completed, &row.email))
                .await?;
            self.send_welcome_email(&row).await;
            self.slack
                .notify(&format!(
                    "✅ Provisioned {} ({}) in account {}",
                    row.username, row.email, self.config.target_account_id
                ))
                .await;
            Ok(RowOutcome::Completed)
        } else {
            self.services
                .status
                .put_status(&StatusRecord::new(&row.username, ProvisionStatus::Failed, &row.email))
                .await?;
            self.slack
                .notify(&format!("❌ Failed provisioning {} ({})", row.username, row.email))
                .await;
            Ok(RowOutcome::Failed)
        }
    }

    /// Find the student's directory user by username, then by email, creating
    /// it when neither matches. Returns the user id.
    pub async fn ensure_user(&self, row: &StudentRow) -> Result<String> {
        let directory = &self.services.directory;

        match directory.find_user_by_username(&row.username).await {
            Ok(Some(user)) => return Ok(user.user_id),
            Ok(None) => {}
            Err(e) => warn!(username = %row.username, error = %e, "lookup by username failed"),
        }

        match directory.find_user_by_email(&row.email).await {
            Ok(Some(user)) => {
                debug!(username = %row.username, user_id = %user.user_id, "matched existing user by email");
                return Ok(user.user_id);
            }
            Ok(None) => {}
            Err(e) => warn!(username = %row.username, error = %e, "lookup by email failed"),
        }

        let new_user = NewDirectoryUser::new(&row.username, &row.first_name, &row.last_name, &row.email)
            .with_user_type(STUDENT_USER_TYPE);
        directory.create_user(&new_user).await
    }

    /// Add the user to the configured student group. Never fails the row.
    pub async fn ensure_group_membership(&self, user_id: &str) {
        let Some(group_name) = self.config.student_group_name.as_deref() else {
            return;
        };

        let directory = &self.services.directory;
        let group_id = match directory.find_group_by_name(group_name).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                warn!(group_name, "student group not found, skipping membership");
                return;
            }
            Err(e) => {
                warn!(group_name, error = %e, "group lookup failed");
                return;
            }
        };

        match directory.create_group_membership(&group_id, user_id).await {
            Ok(MembershipOutcome::Created) => {
                info!(group_name, user_id, "added to student group");
            }
            Ok(MembershipOutcome::AlreadyMember) => {
                debug!(group_name, user_id, "already in student group");
            }
            Err(e) => {
                warn!(group_name, user_id, error = %e, "group membership failed");
            }
        }
    }

    /// Grant the permission set on the target account and wait for it to
    /// settle. Errors are logged and reported as [`AssignmentOutcome::Failed`].
    pub async fn ensure_account_assignment(&self, user_id: &str) -> AssignmentOutcome {
        let target = AssignmentTarget {
            account_id: self.config.target_account_id.clone(),
            permission_set_arn: self.config.permission_set_arn.clone(),
        };

        let request_id = match self.services.access.request_assignment(user_id, &target).await {
            Ok(AssignmentRequest::Submitted { request_id }) => request_id,
            Ok(AssignmentRequest::AlreadyAssigned) => {
                info!(user_id, "assignment already exists");
                return AssignmentOutcome::AlreadyAssigned;
            }
            Err(e) => {
                error!(user_id, error = %e, "assignment request failed");
                return AssignmentOutcome::Failed;
            }
        };

        match wait_for_assignment(self.services.access.as_ref(), &request_id, self.poll).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(user_id, request_id = %request_id, error = %e, "assignment status check failed");
                AssignmentOutcome::Failed
            }
        }
    }

    async fn send_welcome_email(&self, row: &StudentRow) {
        let message = match welcome_email(&self.config, row) {
            Ok(message) => message,
            Err(e) => {
                error!(username = %row.username, error = %e, "welcome email not rendered");
                return;
            }
        };
        if let Err(e) = self.services.mailer.send_email(&message).await {
            warn!(username = %row.username, error = %e, "welcome email not sent");
        }
    }
}
