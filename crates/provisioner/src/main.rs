use std::sync::Arc;

use anyhow::Context;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};
use tracing::{info, warn};

use lab_access_aws::{
    load_sdk_config, DynamoStatusStore, IdentityStoreDirectory, ParameterStore, S3ObjectStore,
    SesMailer, SsoAccountAccess,
};
use lab_access_core::config::ProvisionerConfig;
use lab_access_core::events::SqsEvent;
use lab_access_core::logging;
use lab_access_core::slack::SlackNotifier;
use lab_access_provisioner::{ProvisionerServices, UserProvisioner};

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();

    let provisioner = build_provisioner().await?;
    info!(
        bucket = %provisioner.config().csv_bucket,
        prefix = %provisioner.config().csv_prefix,
        "provisioner ready"
    );

    lambda_runtime::run(service_fn(|event: LambdaEvent<SqsEvent>| {
        handle(&provisioner, event)
    }))
    .await
}

async fn handle(provisioner: &UserProvisioner, event: LambdaEvent<SqsEvent>) -> Result<Value, Error> {
    let (payload, context) = event.into_parts();
    info!(request_id = %context.request_id, messages = payload.records.len(), "invocation started");

    provisioner.handle_event(&payload).await?;
    Ok(json!({ "status": "ok" }))
}

async fn build_provisioner() -> anyhow::Result<UserProvisioner> {
    let config = ProvisionerConfig::from_env().context("invalid provisioner configuration")?;
    let sdk_config = load_sdk_config().await;

    let webhook_url = match config.slack_webhook_param.as_deref() {
        Some(name) => match ParameterStore::new(&sdk_config).get_decrypted(name).await {
            Ok(url) => url,
            Err(e) => {
                warn!(parameter = name, error = %e, "chat webhook unavailable, notifications disabled");
                None
            }
        },
        None => None,
    };
    let slack = SlackNotifier::new(webhook_url).context("failed to build chat client")?;

    let services = ProvisionerServices {
        directory: Arc::new(IdentityStoreDirectory::new(&sdk_config, &config.identity_store_id)),
        access: Arc::new(SsoAccountAccess::new(&sdk_config, &config.instance_arn)),
        status: Arc::new(DynamoStatusStore::new(&sdk_config, &config.status_table)),
        mailer: Arc::new(SesMailer::new(&sdk_config)),
        objects: Arc::new(S3ObjectStore::new(&sdk_config)),
    };

    Ok(UserProvisioner::new(services, slack, config))
}
