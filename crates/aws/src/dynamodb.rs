//! DynamoDB-backed status store.
//!
//! Item layout, keyed by `username`:
//!
//! | attribute  | type | value                         |
//! |------------|------|-------------------------------|
//! | `username` | S    | roster username               |
//! | `status`   | S    | `COMPLETED` / `FAILED`        |
//! | `ts`       | N    | unix seconds of the write     |
//! | `details`  | S    | JSON, e.g. `{"email": "..."}` |

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::{debug, warn};

use lab_access_core::error::{LabAccessError, Result};
use lab_access_core::models::status::{ProvisionStatus, StatusDetails, StatusRecord};
use lab_access_core::services::StatusStore;

const ATTR_USERNAME: &str = "username";
const ATTR_STATUS: &str = "status";
const ATTR_TS: &str = "ts";
const ATTR_DETAILS: &str = "details";

/// Status records in one DynamoDB table.
#[derive(Clone, Debug)]
pub struct DynamoStatusStore {
    client: Client,
    table_name: String,
}

impl DynamoStatusStore {
    pub fn new(sdk_config: &aws_config::SdkConfig, table_name: &str) -> Self {
        Self::from_client(Client::new(sdk_config), table_name)
    }

    /// Create from a pre-built client.
    pub fn from_client(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }

    /// Convert a DynamoDB item into a record; `None` without a username.
    fn item_to_record(item: &HashMap<String, AttributeValue>) -> Option<StatusRecord> {
        let username = item.get(ATTR_USERNAME)?.as_s().ok()?;
        let status = item
            .get(ATTR_STATUS)
            .and_then(|v| v.as_s().ok())
            .map(|s| ProvisionStatus::parse(s))
            .unwrap_or_else(|| ProvisionStatus::Other(String::new()));
        let ts = item
            .get(ATTR_TS)
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        let details = item
            .get(ATTR_DETAILS)
            .and_then(|v| v.as_s().ok())
            .and_then(|s| match serde_json::from_str::<StatusDetails>(s) {
                Ok(details) => Some(details),
                Err(e) => {
                    warn!(username = %username, error = %e, "unreadable status details");
                    None
                }
            });

        Some(StatusRecord {
            username: username.clone(),
            status,
            ts,
            details,
        })
    }

    fn record_to_item(record: &StatusRecord) -> Result<HashMap<String, AttributeValue>> {
        let mut item = HashMap::from([
            (
                ATTR_USERNAME.to_string(),
                AttributeValue::S(record.username.clone()),
            ),
            (
                ATTR_STATUS.to_string(),
                AttributeValue::S(record.status.as_str().to_string()),
            ),
            (ATTR_TS.to_string(), AttributeValue::N(record.ts.to_string())),
        ]);

        if let Some(details) = &record.details {
            let json = serde_json::to_string(details).map_err(|e| {
                LabAccessError::Serialization(format!("failed to serialize status details: {e}"))
            })?;
            item.insert(ATTR_DETAILS.to_string(), AttributeValue::S(json));
        }

        Ok(item)
    }
}

#[async_trait]
impl StatusStore for DynamoStatusStore {
    async fn get_status(&self, username: &str) -> Result<Option<StatusRecord>> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ATTR_USERNAME, AttributeValue::S(username.to_string()))
            .send()
            .await
            .map_err(|e| {
                LabAccessError::StatusStore(format!(
                    "GetItem {username} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(response.item().and_then(Self::item_to_record))
    }

    async fn put_status(&self, record: &StatusRecord) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(Self::record_to_item(record)?))
            .send()
            .await
            .map_err(|e| {
                LabAccessError::StatusStore(format!(
                    "PutItem {} failed: {}",
                    record.username,
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!(username = %record.username, status = record.status.as_str(), "status recorded");
        Ok(())
    }
}
