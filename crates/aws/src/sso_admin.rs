//! Account assignments through the SSO Admin API.

use async_trait::async_trait;
use aws_sdk_ssoadmin::error::DisplayErrorContext;
use aws_sdk_ssoadmin::operation::create_account_assignment::CreateAccountAssignmentError;
use aws_sdk_ssoadmin::types::{PrincipalType, StatusValues, TargetType};
use aws_sdk_ssoadmin::Client;
use tracing::info;

use lab_access_core::error::{LabAccessError, Result};
use lab_access_core::models::assignment::{AssignmentRequest, AssignmentStatus, AssignmentTarget};
use lab_access_core::services::AccountAccess;

/// SSO Admin client bound to one Identity Center instance.
#[derive(Clone, Debug)]
pub struct SsoAccountAccess {
    client: Client,
    instance_arn: String,
}

impl SsoAccountAccess {
    pub fn new(sdk_config: &aws_config::SdkConfig, instance_arn: &str) -> Self {
        Self::from_client(Client::new(sdk_config), instance_arn)
    }

    /// Create from a pre-built client.
    pub fn from_client(client: Client, instance_arn: &str) -> Self {
        Self {
            client,
            instance_arn: instance_arn.to_string(),
        }
    }
}

/// Map an SSO Admin status value onto the assignment lifecycle.
fn assignment_status(status: Option<&StatusValues>, reason: Option<&str>) -> AssignmentStatus {
    match status {
        Some(StatusValues::Succeeded) => AssignmentStatus::Succeeded,
        Some(StatusValues::Failed) => AssignmentStatus::Failed {
            reason: reason.map(str::to_string),
        },
        _ => AssignmentStatus::InProgress,
    }
}

#[async_trait]
impl AccountAccess for SsoAccountAccess {
    async fn request_assignment(
        &self,
        principal_id: &str,
        target: &AssignmentTarget,
    ) -> Result<AssignmentRequest> {
        let result = self
            .client
            .create_account_assignment()
            .instance_arn(&self.instance_arn)
            .target_id(&target.account_id)
            .target_type(TargetType::AwsAccount)
            .permission_set_arn(&target.permission_set_arn)
            .principal_type(PrincipalType::User)
            .principal_id(principal_id)
            .send()
            .await;

        match result {
            Ok(output) => {
                let request_id = output
                    .account_assignment_creation_status()
                    .and_then(|s| s.request_id())
                    .ok_or_else(|| {
                        LabAccessError::Assignment(
                            "CreateAccountAssignment returned no request id".into(),
                        )
                    })?;
                info!(principal_id, request_id, account_id = %target.account_id, "account assignment requested");
                Ok(AssignmentRequest::Submitted {
                    request_id: request_id.to_string(),
                })
            }
            Err(err)
                if matches!(
                    err.as_service_error(),
                    Some(CreateAccountAssignmentError::ConflictException(_))
                ) =>
            {
                Ok(AssignmentRequest::AlreadyAssigned)
            }
            Err(err) => Err(LabAccessError::Assignment(format!(
                "CreateAccountAssignment for {principal_id} failed: {}",
                DisplayErrorContext(&err)
            ))),
        }
    }

    async fn assignment_status(&self, request_id: &str) -> Result<AssignmentStatus> {
        let output = self
            .client
            .describe_account_assignment_creation_status()
            .instance_arn(&self.instance_arn)
            .account_assignment_creation_request_id(request_id)
            .send()
            .await
            .map_err(|e| {
                LabAccessError::Assignment(format!(
                    "DescribeAccountAssignmentCreationStatus {request_id} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let status = output.account_assignment_creation_status();
        Ok(assignment_status(
            status.and_then(|s| s.status()),
            status.and_then(|s| s.failure_reason()),
        ))
    }
}
