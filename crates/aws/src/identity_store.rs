//! IAM Identity Center identity store as the user directory.

use async_trait::async_trait;
use aws_sdk_identitystore::error::DisplayErrorContext;
use aws_sdk_identitystore::operation::create_group_membership::CreateGroupMembershipError;
use aws_sdk_identitystore::types::{Email, Filter, MemberId, Name, User};
use aws_sdk_identitystore::Client;
use tracing::{debug, info};

use lab_access_core::error::{LabAccessError, Result};
use lab_access_core::models::directory::{DirectoryUser, MembershipOutcome, NewDirectoryUser};
use lab_access_core::services::IdentityDirectory;

const ATTR_USER_NAME: &str = "UserName";
const ATTR_EMAIL: &str = "Emails.Value";
const ATTR_GROUP_NAME: &str = "DisplayName";

/// Identity store client bound to one store id.
#[derive(Clone, Debug)]
pub struct IdentityStoreDirectory {
    client: Client,
    identity_store_id: String,
}

impl IdentityStoreDirectory {
    pub fn new(sdk_config: &aws_config::SdkConfig, identity_store_id: &str) -> Self {
        Self::from_client(Client::new(sdk_config), identity_store_id)
    }

    /// Create from a pre-built client.
    pub fn from_client(client: Client, identity_store_id: &str) -> Self {
        Self {
            client,
            identity_store_id: identity_store_id.to_string(),
        }
    }

    fn filter(attribute_path: &str, value: &str) -> Result<Filter> {
        Filter::builder()
            .attribute_path(attribute_path)
            .attribute_value(value)
            .build()
            .map_err(|e| LabAccessError::Directory(format!("invalid {attribute_path} filter: {e}")))
    }

    async fn find_user(&self, attribute_path: &str, value: &str) -> Result<Option<DirectoryUser>> {
        let output = self
            .client
            .list_users()
            .identity_store_id(&self.identity_store_id)
            .filters(Self::filter(attribute_path, value)?)
            .max_results(1)
            .send()
            .await
            .map_err(|e| {
                LabAccessError::Directory(format!(
                    "ListUsers by {attribute_path} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let user = output.users().first().map(directory_user);
        debug!(attribute_path, found = user.is_some(), "directory user lookup");
        Ok(user)
    }
}

fn directory_user(user: &User) -> DirectoryUser {
    DirectoryUser {
        user_id: user.user_id().to_string(),
        user_name: user.user_name().map(str::to_string),
    }
}

#[async_trait]
impl IdentityDirectory for IdentityStoreDirectory {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<DirectoryUser>> {
        self.find_user(ATTR_USER_NAME, username).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<DirectoryUser>> {
        self.find_user(ATTR_EMAIL, email).await
    }

    async fn create_user(&self, user: &NewDirectoryUser) -> Result<String> {
        let email = Email::builder()
            .value(&user.email)
            .set_type(user.email_type.clone())
            .primary(true)
            .build();
        let name = Name::builder()
            .given_name(&user.given_name)
            .family_name(&user.family_name)
            .build();

        let output = self
            .client
            .create_user()
            .identity_store_id(&self.identity_store_id)
            .user_name(&user.user_name)
            .display_name(user.display_name())
            .name(name)
            .emails(email)
            .set_user_type(user.user_type.clone())
            .send()
            .await
            .map_err(|e| {
                LabAccessError::Directory(format!(
                    "CreateUser {} failed: {}",
                    user.user_name,
                    DisplayErrorContext(&e)
                ))
            })?;

        info!(user_name = %user.user_name, user_id = output.user_id(), "directory user created");
        Ok(output.user_id().to_string())
    }

    async fn find_group_by_name(&self, display_name: &str) -> Result<Option<String>> {
        let output = self
            .client
            .list_groups()
            .identity_store_id(&self.identity_store_id)
            .filters(Self::filter(ATTR_GROUP_NAME, display_name)?)
            .max_results(1)
            .send()
            .await
            .map_err(|e| {
                LabAccessError::Directory(format!(
                    "ListGroups by {ATTR_GROUP_NAME} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(output.groups().first().map(|g| g.group_id().to_string()))
    }

    async fn create_group_membership(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<MembershipOutcome> {
        let result = self
            .client
            .create_group_membership()
            .identity_store_id(&self.identity_store_id)
            .group_id(group_id)
            .member_id(MemberId::UserId(user_id.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => {
                info!(group_id, user_id, "group membership created");
                Ok(MembershipOutcome::Created)
            }
            Err(err)
                if matches!(
                    err.as_service_error(),
                    Some(CreateGroupMembershipError::ConflictException(_))
                ) =>
            {
                debug!(group_id, user_id, "group membership already exists");
                Ok(MembershipOutcome::AlreadyMember)
            }
            Err(err) => Err(LabAccessError::Directory(format!(
                "CreateGroupMembership {group_id} failed: {}",
                DisplayErrorContext(&err)
            ))),
        }
    }
}
