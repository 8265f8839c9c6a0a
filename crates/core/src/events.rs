//! Lambda trigger payloads: S3 object notifications and SQS batches.
//!
//! Only the fields the pipelines read are modelled; everything else in the
//! payload is ignored during deserialization.

use serde::{Deserialize, Serialize};

use crate::error::{LabAccessError, Result};

/// An S3 event notification, delivered directly or inside an SQS body.
///
/// S3 also publishes a `s3:TestEvent` without `Records` when a notification
/// is configured; it deserializes to an empty record list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3Notification {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3EventRecord {
    #[serde(default)]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Object {
    /// URL-encoded object key, as S3 delivers it.
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl S3EventRecord {
    /// Bucket and decoded key of the object this record refers to.
    pub fn object_ref(&self) -> Result<ObjectRef> {
        Ok(ObjectRef {
            bucket: self.s3.bucket.name.clone(),
            key: decode_object_key(&self.s3.object.key)?,
        })
    }
}

/// An SQS batch as delivered to a Lambda function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqsEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<SqsMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqsMessage {
    #[serde(default)]
    pub message_id: Option<String>,
    pub body: String,
}

impl SqsMessage {
    /// Parse the message body as a wrapped S3 notification.
    pub fn s3_notification(&self) -> Result<S3Notification> {
        serde_json::from_str(&self.body).map_err(|e| {
            LabAccessError::Event(format!(
                "message {} body is not an S3 notification: {e}",
                self.message_id.as_deref().unwrap_or("<unknown>")
            ))
        })
    }
}

/// Location of a roster object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Decode an S3 notification key: `+` encodes a space, the rest is
/// percent-encoded UTF-8.
pub fn decode_object_key(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|k| k.into_owned())
        .map_err(|e| LabAccessError::Event(format!("object key {raw:?} is not valid UTF-8: {e}")))
}
