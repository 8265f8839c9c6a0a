//! Secrets from SSM Parameter Store.

use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::Client;

use lab_access_core::error::{LabAccessError, Result};

#[derive(Clone, Debug)]
pub struct ParameterStore {
    client: Client,
}

impl ParameterStore {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::from_client(Client::new(sdk_config))
    }

    /// Create from a pre-built client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch a parameter value, decrypting SecureStrings.
    pub async fn get_decrypted(&self, name: &str) -> Result<Option<String>> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| {
                LabAccessError::Parameter(format!(
                    "GetParameter {name} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string))
    }
}
