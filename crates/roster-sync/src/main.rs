use std::sync::Arc;

use anyhow::Context;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info;

use lab_access_aws::{load_sdk_config, IdentityStoreDirectory, S3ObjectStore};
use lab_access_core::config::RosterSyncConfig;
use lab_access_core::logging;
use lab_access_core::slack::SlackNotifier;
use lab_access_roster_sync::{RosterSync, SyncResponse};

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();

    let sync = build_sync().await?;
    info!(groups = sync.config().group_ids.len(), "roster sync ready");

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
        handle(&sync, event)
    }))
    .await
}

async fn handle(sync: &RosterSync, event: LambdaEvent<Value>) -> Result<SyncResponse, Error> {
    let (payload, context) = event.into_parts();
    info!(request_id = %context.request_id, "invocation started");
    Ok(sync.handle_event(&payload).await)
}

async fn build_sync() -> anyhow::Result<RosterSync> {
    let config = RosterSyncConfig::from_env().context("invalid roster sync configuration")?;
    let sdk_config = load_sdk_config().await;
    let slack = SlackNotifier::new(Some(config.slack_webhook_url.clone()))
        .context("failed to build chat client")?;

    Ok(RosterSync::new(
        Arc::new(IdentityStoreDirectory::new(&sdk_config, &config.identity_store_id)),
        Arc::new(S3ObjectStore::new(&sdk_config)),
        slack,
        config,
    ))
}
