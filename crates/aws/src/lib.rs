//! AWS SDK implementations of the lab access service traits.

pub mod dynamodb;
pub mod identity_store;
pub mod s3;
pub mod ses;
pub mod ssm;
pub mod sso_admin;

pub use dynamodb::DynamoStatusStore;
pub use identity_store::IdentityStoreDirectory;
pub use s3::S3ObjectStore;
pub use ses::SesMailer;
pub use ssm::ParameterStore;
pub use sso_admin::SsoAccountAccess;

/// Load the shared SDK configuration from the Lambda environment.
pub async fn load_sdk_config() -> aws_config::SdkConfig {
    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await
}
