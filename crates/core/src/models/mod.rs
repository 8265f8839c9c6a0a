//! Domain models shared by both provisioning functions.

pub mod assignment;
pub mod directory;
pub mod roster;
pub mod status;
