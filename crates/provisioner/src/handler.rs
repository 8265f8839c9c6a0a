//! Queue-event entry point: unwrap S3 notifications, filter by prefix, fetch
//! each roster and dispatch its rows.

use tracing::{error, info, warn};

use lab_access_core::error::Result;
use lab_access_core::events::{ObjectRef, SqsEvent};
use lab_access_core::models::roster::StudentRow;
use lab_access_core::roster_csv::parse_roster;

use crate::provision::{RowOutcome, UserProvisioner};

/// Counters for one invocation, logged when it finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationSummary {
    pub objects_processed: usize,
    pub keys_ignored: usize,
    pub rows_completed: usize,
    pub rows_failed: usize,
    pub rows_skipped: usize,
    pub row_errors: usize,
}

impl InvocationSummary {
    fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Completed => self.rows_completed += 1,
            RowOutcome::Failed => self.rows_failed += 1,
            RowOutcome::AlreadyCompleted => self.rows_skipped += 1,
        }
    }
}

impl UserProvisioner {
    /// Process every roster referenced by an SQS batch.
    ///
    /// Row errors are logged and counted. Malformed message bodies, object
    /// fetch failures and undecodable rosters abort the invocation.
    pub async fn handle_event(&self, event: &SqsEvent) -> Result<InvocationSummary> {
        let mut summary = InvocationSummary::default();

        for message in &event.records {
            let notification = message.s3_notification()?;
            if notification.records.is_empty() {
                info!(
                    message_id = message.message_id.as_deref().unwrap_or(""),
                    "notification without records, ignoring"
                );
                continue;
            }

            for record in &notification.records {
                let object = record.object_ref()?;
                if !object.key.starts_with(&self.config.csv_prefix) {
                    info!(bucket = %object.bucket, key = %object.key, prefix = %self.config.csv_prefix, "key outside prefix, ignoring");
                    summary.keys_ignored += 1;
                    continue;
                }
                if object.bucket != self.config.csv_bucket {
                    warn!(bucket = %object.bucket, expected = %self.config.csv_bucket, "event for unexpected bucket");
                }

                self.process_object(&object, &mut summary).await?;
                summary.objects_processed += 1;
            }
        }

        info!(
            objects = summary.objects_processed,
            ignored = summary.keys_ignored,
            completed = summary.rows_completed,
            failed = summary.rows_failed,
            skipped = summary.rows_skipped,
            errors = summary.row_errors,
            "invocation finished"
        );
        Ok(summary)
    }

    async fn process_object(&self, object: &ObjectRef, summary: &mut InvocationSummary) -> Result<()> {
        let data = self
            .services
            .objects
            .get_object(&object.bucket, &object.key)
            .await?;
        let rows: Vec<StudentRow> = parse_roster(&data)?;
        info!(%object, rows = rows.len(), "processing roster");

        for (index, row) in rows.iter().enumerate() {
            match self.process_record(row).await {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    error!(%object, row = index + 1, error = %e, "row failed");
                    summary.row_errors += 1;
                }
            }
        }
        Ok(())
    }
}
