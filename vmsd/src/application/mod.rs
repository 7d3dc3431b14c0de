//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain`, never on `crate::infra` or
//! `crate::commands`.

pub mod ports;
pub mod services;

pub use ports::{
    ArtifactWriter, CommandExtension, CommandRunner, CommandStore, ExtensionLoader,
    ManifestBuilder, ManifestFactory, McpTarget, TargetSession,
};
pub use services::extensions::ExtensionRegistry;
pub use services::orchestrator::{Orchestrator, OrchestratorSettings};
pub use services::update::TargetNetwork;
