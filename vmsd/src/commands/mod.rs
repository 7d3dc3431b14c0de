//! Command implementations

pub mod config;
pub mod drain;
pub mod run;
pub mod version;
