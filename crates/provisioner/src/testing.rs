//! In-memory service fakes shared by the pipeline tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use lab_access_core::config::ProvisionerConfig;
use lab_access_core::error::{LabAccessError, Result};
use lab_access_core::models::assignment::{AssignmentRequest, AssignmentStatus, AssignmentTarget};
use lab_access_core::models::directory::{DirectoryUser, MembershipOutcome, NewDirectoryUser};
use lab_access_core::models::status::StatusRecord;
use lab_access_core::services::{
    AccountAccess, EmailMessage, IdentityDirectory, Mailer, ObjectStore, StatusStore,
};
use lab_access_core::slack::SlackNotifier;

use crate::poll::PollPolicy;
use crate::provision::{ProvisionerServices, UserProvisioner};

pub const STUDENT_GROUP: &str = "Students";
pub const STUDENT_GROUP_ID: &str = "g-students";

pub fn config() -> ProvisionerConfig {
    ProvisionerConfig {
        identity_store_id: "d-1234567890".into(),
        instance_arn: "arn:aws:sso:::instance/ssoins-1234".into(),
        permission_set_arn: "arn:aws:sso:::permissionSet/ssoins-1234/ps-5678".into(),
        target_account_id: "111122223333".into(),
        ses_sender: "labs@example.com".into(),
        status_table: "provisioning-status".into(),
        csv_bucket: "rosters".into(),
        csv_prefix: "incoming/".into(),
        slack_webhook_param: None,
        access_portal_url: "https://d-1234567890.awsapps.com/start".into(),
        student_group_name: Some(STUDENT_GROUP.into()),
        email_sign_off: None,
    }
}

pub fn fast_poll() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(5),
        timeout: Duration::from_millis(60),
    }
}

pub fn provisioner(fakes: &Fakes, slack: SlackNotifier) -> UserProvisioner {
    UserProvisioner::new(fakes.services(), slack, config()).with_poll_policy(fast_poll())
}

#[derive(Default)]
pub struct FakeDirectory {
    pub existing: Mutex<Vec<(String, String, String)>>,
    pub created: Mutex<Vec<NewDirectoryUser>>,
    pub memberships: Mutex<Vec<(String, String)>>,
    pub groups: Mutex<HashMap<String, String>>,
    pub membership_conflict: Mutex<bool>,
    pub fail_lookups: Mutex<bool>,
    pub fail_create: Mutex<bool>,
    pub fail_group_lookup: Mutex<bool>,
    pub fail_membership: Mutex<bool>,
    pub user_lookups: Mutex<u32>,
}

#[async_trait]
impl IdentityDirectory for FakeDirectory {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<DirectoryUser>> {
        *self.user_lookups.lock().unwrap() += 1;
        if *self.fail_lookups.lock().unwrap() {
            return Err(LabAccessError::Directory("ListUsers throttled".into()));
        }
        Ok(self
            .existing
            .lock()
            .unwrap()
            .iter()
            .find(|(_, name, _)| name == username)
            .map(|(id, name, _)| DirectoryUser {
                user_id: id.clone(),
                user_name: Some(name.clone()),
            }))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<DirectoryUser>> {
        *self.user_lookups.lock().unwrap() += 1;
        if *self.fail_lookups.lock().unwrap() {
            return Err(LabAccessError::Directory("ListUsers throttled".into()));
        }
        Ok(self
            .existing
            .lock()
            .unwrap()
            .iter()
            .find(|(_, _, mail)| mail == email)
            .map(|(id, name, _)| DirectoryUser {
                user_id: id.clone(),
                user_name: Some(name.clone()),
            }))
    }

    async fn create_user(&self, user: &NewDirectoryUser) -> Result<String> {
        if *self.fail_create.lock().unwrap() {
            return Err(LabAccessError::Directory("CreateUser denied".into()));
        }
        let id = format!("u-{}", user.user_name);
        self.existing
            .lock()
            .unwrap()
            .push((id.clone(), user.user_name.clone(), user.email.clone()));
        self.created.lock().unwrap().push(user.clone());
        Ok(id)
    }

    async fn find_group_by_name(&self, display_name: &str) -> Result<Option<String>> {
        if *self.fail_group_lookup.lock().unwrap() {
            return Err(LabAccessError::Directory("ListGroups throttled".into()));
        }
        Ok(self.groups.lock().unwrap().get(display_name).cloned())
    }

    async fn create_group_membership(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<MembershipOutcome> {
        if *self.fail_membership.lock().unwrap() {
            return Err(LabAccessError::Directory(format!(
                "CreateGroupMembership {group_id} failed: AccessDenied"
            )));
        }
        if *self.membership_conflict.lock().unwrap() {
            return Ok(MembershipOutcome::AlreadyMember);
        }
        self.memberships
            .lock()
            .unwrap()
            .push((group_id.to_string(), user_id.to_string()));
        Ok(MembershipOutcome::Created)
    }
}

/// How the fake SSO service answers assignment requests.
#[derive(Debug, Clone)]
pub enum AccessScript {
    Settles(AssignmentStatus),
    Conflict,
    RequestError,
}

pub struct FakeAccess {
    pub script: Mutex<AccessScript>,
    pub requests: Mutex<Vec<(String, AssignmentTarget)>>,
    pub status_calls: Mutex<u32>,
}

impl Default for FakeAccess {
    fn default() -> Self {
        Self {
            script: Mutex::new(AccessScript::Settles(AssignmentStatus::Succeeded)),
            requests: Mutex::new(Vec::new()),
            status_calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl AccountAccess for FakeAccess {
    async fn request_assignment(
        &self,
        principal_id: &str,
        target: &AssignmentTarget,
    ) -> Result<AssignmentRequest> {
        self.requests
            .lock()
            .unwrap()
            .push((principal_id.to_string(), target.clone()));
        match &*self.script.lock().unwrap() {
            AccessScript::Settles(_) => Ok(AssignmentRequest::Submitted {
                request_id: format!("req-{principal_id}"),
            }),
            AccessScript::Conflict => Ok(AssignmentRequest::AlreadyAssigned),
            AccessScript::RequestError => {
                Err(LabAccessError::Assignment("CreateAccountAssignment denied".into()))
            }
        }
    }

    async fn assignment_status(&self, _request_id: &str) -> Result<AssignmentStatus> {
        *self.status_calls.lock().unwrap() += 1;
        match &*self.script.lock().unwrap() {
            AccessScript::Settles(status) => Ok(status.clone()),
            _ => Err(LabAccessError::Assignment("no such request".into())),
        }
    }
}

#[derive(Default)]
pub struct FakeStatusStore {
    pub records: Mutex<HashMap<String, StatusRecord>>,
    pub writes: Mutex<Vec<StatusRecord>>,
    /// Usernames whose reads fail.
    pub failing_reads: Mutex<Vec<String>>,
    /// Usernames whose writes fail.
    pub failing_writes: Mutex<Vec<String>>,
}

#[async_trait]
impl StatusStore for FakeStatusStore {
    async fn get_status(&self, username: &str) -> Result<Option<StatusRecord>> {
        if self.failing_reads.lock().unwrap().iter().any(|u| u == username) {
            return Err(LabAccessError::StatusStore(format!("GetItem {username} failed: throttled")));
        }
        Ok(self.records.lock().unwrap().get(username).cloned())
    }

    async fn put_status(&self, record: &StatusRecord) -> Result<()> {
        if self.failing_writes.lock().unwrap().contains(&record.username) {
            return Err(LabAccessError::StatusStore(format!(
                "PutItem {} failed: throttled",
                record.username
            )));
        }
        self.records
            .lock()
            .unwrap()
            .insert(record.username.clone(), record.clone());
        self.writes.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: Mutex<bool>,
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send_email(&self, message: &EmailMessage) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(LabAccessError::Email("MessageRejected".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeObjects {
    pub objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    pub fetches: Mutex<u32>,
}

#[async_trait]
impl ObjectStore for FakeObjects {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        *self.fetches.lock().unwrap() += 1;
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| LabAccessError::Storage(format!("s3://{bucket}/{key}: NoSuchKey")))
    }
}

/// One fake per service, with accessors for assertions.
pub struct Fakes {
    pub directory: Arc<FakeDirectory>,
    pub access: Arc<FakeAccess>,
    pub status: Arc<FakeStatusStore>,
    pub mailer: Arc<FakeMailer>,
    pub objects: Arc<FakeObjects>,
}

impl Fakes {
    /// Fakes with the student group present and assignments that succeed.
    pub fn new() -> Self {
        let fakes = Self {
            directory: Arc::new(FakeDirectory::default()),
            access: Arc::new(FakeAccess::default()),
            status: Arc::new(FakeStatusStore::default()),
            mailer: Arc::new(FakeMailer::default()),
            objects: Arc::new(FakeObjects::default()),
        };
        fakes
            .directory
            .groups
            .lock()
            .unwrap()
            .insert(STUDENT_GROUP.into(), STUDENT_GROUP_ID.into());
        fakes
    }

    pub fn services(&self) -> ProvisionerServices {
        ProvisionerServices {
            directory: self.directory.clone(),
            access: self.access.clone(),
            status: self.status.clone(),
            mailer: self.mailer.clone(),
            objects: self.objects.clone(),
        }
    }

    pub fn put_object(&self, bucket: &str, key: &str, body: &str) {
        self.objects
            .objects
            .lock()
            .unwrap()
            .insert((bucket.into(), key.into()), body.as_bytes().to_vec());
    }

    pub fn add_existing_user(&self, user_id: &str, username: &str, email: &str) {
        self.directory
            .existing
            .lock()
            .unwrap()
            .push((user_id.into(), username.into(), email.into()));
    }

    pub fn script_access(&self, script: AccessScript) {
        *self.access.script.lock().unwrap() = script;
    }

    pub fn created_usernames(&self) -> Vec<String> {
        self.directory
            .created
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.user_name.clone())
            .collect()
    }

    pub fn fail_status_reads_for(&self, username: &str) {
        self.status.failing_reads.lock().unwrap().push(username.into());
    }

    pub fn fail_status_writes_for(&self, username: &str) {
        self.status.failing_writes.lock().unwrap().push(username.into());
    }

    pub fn user_lookups(&self) -> u32 {
        *self.directory.user_lookups.lock().unwrap()
    }

    pub fn memberships(&self) -> Vec<(String, String)> {
        self.directory.memberships.lock().unwrap().clone()
    }

    pub fn assignment_requests(&self) -> usize {
        self.access.requests.lock().unwrap().len()
    }

    pub fn status_calls(&self) -> u32 {
        *self.access.status_calls.lock().unwrap()
    }

    pub fn status_of(&self, username: &str) -> Option<StatusRecord> {
        self.status.records.lock().unwrap().get(username).cloned()
    }

    pub fn status_writes(&self) -> usize {
        self.status.writes.lock().unwrap().len()
    }

    pub fn emails_sent(&self) -> usize {
        self.mailer.sent.lock().unwrap().len()
    }

    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.mailer.sent.lock().unwrap().clone()
    }

    pub fn object_fetches(&self) -> u32 {
        *self.objects.fetches.lock().unwrap()
    }
}
