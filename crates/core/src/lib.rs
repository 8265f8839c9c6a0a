//! Roster parsing, configuration, domain models and the
//! service traits shared by the Roster Sync and User Provisioner functions.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod roster_csv;
pub mod services;
pub mod slack;
