//! Account assignment requests and their lifecycle.
//!
//! ```text
//! REQUESTED --poll--> SUCCEEDED | FAILED | TIMEOUT
//! CONFLICT  --------> SUCCEEDED
//! ```

use std::fmt;

/// The account and permission set a principal is granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentTarget {
    pub account_id: String,
    pub permission_set_arn: String,
}

/// Response to an assignment creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentRequest {
    /// Accepted for asynchronous provisioning; poll with this id.
    Submitted { request_id: String },
    /// The assignment already exists (conflict on creation).
    AlreadyAssigned,
}

/// Provisioning status reported for a submitted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentStatus {
    InProgress,
    Succeeded,
    Failed { reason: Option<String> },
}

impl AssignmentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Terminal outcome of ensuring an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOutcome {
    Succeeded,
    AlreadyAssigned,
    Failed,
    TimedOut,
}

impl AssignmentOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded | Self::AlreadyAssigned)
    }
}

impl fmt::Display for AssignmentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Succeeded => "SUCCEEDED",
            Self::AlreadyAssigned => "CONFLICT",
            Self::Failed => "FAILED",
            Self::TimedOut => "TIMEOUT",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_in_progress_is_non_terminal() {
        assert!(!AssignmentStatus::InProgress.is_terminal());
        assert!(AssignmentStatus::Succeeded.is_terminal());
        assert!(AssignmentStatus::Failed { reason: None }.is_terminal());
    }

    #[test]
    fn conflict_counts_as_success() {
        assert!(AssignmentOutcome::Succeeded.is_success());
        assert!(AssignmentOutcome::AlreadyAssigned.is_success());
        assert!(!AssignmentOutcome::Failed.is_success());
        assert!(!AssignmentOutcome::TimedOut.is_success());
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(AssignmentOutcome::TimedOut.to_string(), "TIMEOUT");
        assert_eq!(AssignmentOutcome::AlreadyAssigned.to_string(), "CONFLICT");
    }
}
