//! Bounded wait for an account assignment request to settle.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use lab_access_core::error::Result;
use lab_access_core::models::assignment::{AssignmentOutcome, AssignmentStatus};
use lab_access_core::services::AccountAccess;

/// Fixed-interval polling within a wall-clock budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            timeout: Duration::from_secs(90),
        }
    }
}

/// Poll `request_id` until it succeeds, fails, or the budget runs out.
///
/// A status-call error ends the wait with that error.
pub async fn wait_for_assignment(
    access: &dyn AccountAccess,
    request_id: &str,
    policy: PollPolicy,
) -> Result<AssignmentOutcome> {
    let start = Instant::now();
    let mut attempts = 0u32;

    while start.elapsed() < policy.timeout {
        attempts += 1;
        match access.assignment_status(request_id).await? {
            AssignmentStatus::Succeeded => return Ok(AssignmentOutcome::Succeeded),
            AssignmentStatus::Failed { reason } => {
                warn!(request_id, reason = reason.as_deref().unwrap_or("unknown"), "account assignment failed");
                return Ok(AssignmentOutcome::Failed);
            }
            AssignmentStatus::InProgress => {
                debug!(request_id, attempts, "account assignment in progress");
            }
        }
        sleep(policy.interval).await;
    }

    warn!(request_id, attempts, timeout_secs = policy.timeout.as_secs(), "account assignment timed out");
    Ok(AssignmentOutcome::TimedOut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lab_access_core::error::LabAccessError;
    use lab_access_core::models::assignment::{AssignmentRequest, AssignmentTarget};
    use std::sync::Mutex;

    /// Replays a fixed sequence of statuses, repeating the last one.
    struct ScriptedAccess {
        statuses: Mutex<Vec<Result<AssignmentStatus>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedAccess {
        fn new(statuses: Vec<Result<AssignmentStatus>>) -> Self {
            Self {
                statuses: Mutex::new(statuses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl AccountAccess for ScriptedAccess {
        async fn request_assignment(
            &self,
            _principal_id: &str,
            _target: &AssignmentTarget,
        ) -> Result<AssignmentRequest> {
            unreachable!("polling never creates assignments")
        }

        async fn assignment_status(&self, _request_id: &str) -> Result<AssignmentStatus> {
            *self.calls.lock().unwrap() += 1;
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.remove(0)
            } else {
                match &statuses[0] {
                    Ok(status) => Ok(status.clone()),
                    Err(_) => Err(LabAccessError::Assignment("throttled".into())),
                }
            }
        }
    }

    fn fast() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(5),
            timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn default_cadence_is_three_seconds_within_ninety() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(3));
        assert_eq!(policy.timeout, Duration::from_secs(90));
    }

    #[tokio::test]
    async fn returns_succeeded_after_progress() {
        let access = ScriptedAccess::new(vec![
            Ok(AssignmentStatus::InProgress),
            Ok(AssignmentStatus::InProgress),
            Ok(AssignmentStatus::Succeeded),
        ]);
        let outcome = wait_for_assignment(&access, "req-1", fast()).await.unwrap();
        assert_eq!(outcome, AssignmentOutcome::Succeeded);
        assert_eq!(access.calls(), 3);
    }

    #[tokio::test]
    async fn returns_failed_immediately() {
        let access = ScriptedAccess::new(vec![Ok(AssignmentStatus::Failed {
            reason: Some("permission set missing".into()),
        })]);
        let outcome = wait_for_assignment(&access, "req-1", fast()).await.unwrap();
        assert_eq!(outcome, AssignmentOutcome::Failed);
        assert_eq!(access.calls(), 1);
    }

    #[tokio::test]
    async fn times_out_when_never_terminal() {
        let access = ScriptedAccess::new(vec![Ok(AssignmentStatus::InProgress)]);
        let policy = PollPolicy {
            interval: Duration::from_millis(10),
            timeout: Duration::from_millis(50),
        };
        let outcome = wait_for_assignment(&access, "req-1", policy).await.unwrap();
        assert_eq!(outcome, AssignmentOutcome::TimedOut);
        assert!(access.calls() >= 1);
        assert!(access.calls() <= 6);
    }

    #[tokio::test]
    async fn status_error_ends_wait() {
        let access = ScriptedAccess::new(vec![
            Ok(AssignmentStatus::InProgress),
            Err(LabAccessError::Assignment("throttled".into())),
        ]);
        let result = wait_for_assignment(&access, "req-1", fast()).await;
        assert!(result.is_err());
        assert_eq!(access.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn default_policy_polls_every_three_seconds_for_ninety() {
        let access = ScriptedAccess::new(vec![Ok(AssignmentStatus::InProgress)]);
        let start = Instant::now();

        let outcome = wait_for_assignment(&access, "req-1", PollPolicy::default())
            .await
            .unwrap();

        assert_eq!(outcome, AssignmentOutcome::TimedOut);
        assert!((29..=31).contains(&access.calls()), "calls: {}", access.calls());
        assert!(start.elapsed() >= Duration::from_secs(90));
        assert!(start.elapsed() < Duration::from_secs(94));
    }
}
