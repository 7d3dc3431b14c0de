//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`
//! sockets. All functions are synchronous and take data in, returning data out.

pub mod batch;
pub mod config;
pub mod error;
pub mod plan;
pub mod retrieval;
pub mod transition;

pub use batch::{CommandBatch, Step};
pub use config::{AddressPool, DaemonConfig};
pub use error::{ConfigError, DispatchError, ResolveError, TargetError};
pub use plan::UpdatePlan;
