//! User Provisioner: turns roster files dropped under a key prefix into
//! Identity Center users with group membership, account access, a status
//! record and a welcome email.
//!
//! The pipeline is written against the service traits in
//! [`lab_access_core::services`]; `main.rs` wires in the AWS adapters.

pub mod email;
pub mod handler;
pub mod poll;
pub mod provision;

#[cfg(test)]
mod testing;

pub use handler::InvocationSummary;
pub use poll::PollPolicy;
pub use provision::{ProvisionerServices, RowOutcome, UserProvisioner};
