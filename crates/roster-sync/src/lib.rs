//! Roster Sync: creates Identity Center users for new roster entries and
//! adds them to a fixed list of groups.

pub mod sync;

pub use sync::{RosterSync, SyncResponse, SyncSummary};
