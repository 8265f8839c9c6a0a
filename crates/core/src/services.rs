//! Traits for the managed services the pipelines call into.
//!
//! Conflicts that the pipelines treat as success are part of each method's
//! return type rather than an error variant.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    assignment::{AssignmentRequest, AssignmentStatus, AssignmentTarget},
    directory::{DirectoryUser, MembershipOutcome, NewDirectoryUser},
    status::StatusRecord,
};

#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Exact match on the `UserName` attribute.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<DirectoryUser>>;
    /// Exact match on any `Emails.Value`.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<DirectoryUser>>;
    /// Create a user, returning its directory-assigned id.
    async fn create_user(&self, user: &NewDirectoryUser) -> Result<String>;
    /// Exact match on the group `DisplayName`, returning the group id.
    async fn find_group_by_name(&self, display_name: &str) -> Result<Option<String>>;
    async fn create_group_membership(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<MembershipOutcome>;
}

#[async_trait]
pub trait AccountAccess: Send + Sync {
    async fn request_assignment(
        &self,
        principal_id: &str,
        target: &AssignmentTarget,
    ) -> Result<AssignmentRequest>;
    async fn assignment_status(&self, request_id: &str) -> Result<AssignmentStatus>;
}

#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn get_status(&self, username: &str) -> Result<Option<StatusRecord>>;
    async fn put_status(&self, record: &StatusRecord) -> Result<()>;
}

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> Result<()>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}
