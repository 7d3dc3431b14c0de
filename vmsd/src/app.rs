//! Application context: the wired set of adapters every command runs on.
//!
//! `AppContext` is built once from the loaded configuration. Command
//! handlers borrow it and build an [`Orchestrator`] over its adapters; no
//! handler constructs its own store or target.

use anyhow::Result;
use tracing::debug;

use crate::application::{ExtensionRegistry, Orchestrator, OrchestratorSettings, TargetNetwork};
use crate::domain::DaemonConfig;
use crate::infra::artifacts::FsArtifactWriter;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::read_password;
use crate::infra::extensions::ExecutableLoader;
use crate::infra::json_store::JsonStore;
use crate::infra::manifest::JsonManifestFactory;
use crate::infra::target::{McpConnection, McpCtlTarget};

/// Orchestrator over the production adapters.
pub type DaemonOrchestrator<'a> =
    Orchestrator<'a, JsonStore, McpCtlTarget<TokioCommandRunner>, JsonManifestFactory, FsArtifactWriter>;

/// Production adapters plus the configuration they were built from.
pub struct AppContext {
    pub config: DaemonConfig,
    pub store: JsonStore,
    pub target: McpCtlTarget<TokioCommandRunner>,
    pub manifests: JsonManifestFactory,
    pub artifacts: FsArtifactWriter,
    pub extensions: ExtensionRegistry<JsonStore>,
}

impl AppContext {
    /// Wire the adapters for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured password file cannot be read.
    pub fn new(config: DaemonConfig) -> Result<Self> {
        let runner = TokioCommandRunner::new(config.mcp_timeout());
        let password = read_password(&config)?;
        let target = McpCtlTarget::new(runner.clone(), McpConnection::from_config(&config, password));

        let mut extensions = ExtensionRegistry::new();
        if let Some(dir) = &config.extensions_dir {
            debug!(dir = %dir.display(), "loading command extensions on demand");
            extensions = extensions.with_loader(Box::new(ExecutableLoader::new(dir, runner)));
        }

        Ok(Self {
            store: JsonStore::new(&config.store_dir),
            manifests: JsonManifestFactory::new(&config.manifest_dir),
            artifacts: FsArtifactWriter,
            target,
            extensions,
            config,
        })
    }

    #[must_use]
    pub fn settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            network: TargetNetwork {
                address: self.config.mcp_address.clone(),
                pool: self.config.domu_ip_range,
            },
            output_dir: self.config.output_dir.clone(),
            call_destination: self.config.call_destination.clone(),
            default_interval: crate::infra::json_store::DEFAULT_COMMAND_POLL_RATE,
            status_interval: self.config.status_interval(),
        }
    }

    #[must_use]
    pub fn orchestrator(&self) -> DaemonOrchestrator<'_> {
        Orchestrator::new(
            &self.store,
            &self.target,
            &self.manifests,
            &self.artifacts,
            &self.extensions,
            self.settings(),
        )
    }
}
