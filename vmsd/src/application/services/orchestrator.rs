//! Application service: the drain cycle.
//!
//! One cycle fetches the pending batch, hands each bucket to its handler in
//! priority order and returns the delay before the next poll. Handlers take
//! their bucket before acting, so every pass shrinks the batch and the cycle
//! always terminates.

use std::cell::Cell;
use std::path::PathBuf;
use std::time::Duration;

use qs_common::CommandKind;
use tracing::{debug, warn};

use crate::application::ports::{ArtifactWriter, CommandStore, ManifestFactory, McpTarget};
use crate::application::services::extensions::ExtensionRegistry;
use crate::application::services::lifecycle::{self, TargetOp};
use crate::application::services::retrieval;
use crate::application::services::update::{self, TargetNetwork};
use crate::domain::batch::retrieval_command;
use crate::domain::{CommandBatch, Step};

/// Shortest delay the drain loop will wait between polls.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Static parameters of the drain cycle.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub network: TargetNetwork,
    /// Directory receiving retrieval artifacts.
    pub output_dir: PathBuf,
    /// Number dialled by CALL.
    pub call_destination: String,
    /// Poll interval used until the store reports one.
    pub default_interval: Duration,
    /// Fixed delay between radio status refreshes.
    pub status_interval: Duration,
}

/// Routes pending commands to their handlers.
pub struct Orchestrator<'a, S, T, M, W> {
    store: &'a S,
    target: &'a T,
    manifests: &'a M,
    artifacts: &'a W,
    extensions: &'a ExtensionRegistry<S>,
    settings: OrchestratorSettings,
    last_interval: Cell<Duration>,
}

impl<'a, S, T, M, W> Orchestrator<'a, S, T, M, W>
where
    S: CommandStore,
    T: McpTarget,
    M: ManifestFactory,
    W: ArtifactWriter,
{
    #[must_use]
    pub fn new(
        store: &'a S,
        target: &'a T,
        manifests: &'a M,
        artifacts: &'a W,
        extensions: &'a ExtensionRegistry<S>,
        settings: OrchestratorSettings,
    ) -> Self {
        let last_interval = Cell::new(settings.default_interval.max(MIN_POLL_INTERVAL));
        Self {
            store,
            target,
            manifests,
            artifacts,
            extensions,
            settings,
            last_interval,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Run one drain cycle and return the delay before the next one.
    pub async fn drain_cycle(&self) -> Duration {
        match self.store.pending_commands().await {
            Ok(mut batch) => {
                if !batch.is_empty() {
                    debug!(count = batch.len(), "draining pending commands");
                }
                while let Some(step) = batch.next_step() {
                    self.run_step(step, &mut batch).await;
                }
            }
            Err(err) => warn!(error = ?err, "failed to fetch pending commands"),
        }
        self.poll_interval().await
    }

    /// Take the buckets owned by `step` out of `batch` and handle them.
    pub async fn run_step(&self, step: Step, batch: &mut CommandBatch) {
        debug!(?step, "running step");
        match step {
            Step::Update => {
                let add = batch.take(&CommandKind::AddVmApp);
                let remove = batch.take(&CommandKind::RemoveVmApp);
                update::apply_update(
                    self.store,
                    self.target,
                    self.manifests,
                    &self.settings.network,
                    add,
                    remove,
                )
                .await;
            }
            Step::UploadToGateway => defer(batch, &CommandKind::UploadVmAppToGateway),
            Step::DeleteFromGateway => defer(batch, &CommandKind::DeleteVmAppFromGateway),
            Step::Start => self.target_op(batch, &CommandKind::Start, TargetOp::Start).await,
            Step::Stop => self.target_op(batch, &CommandKind::Stop, TargetOp::Stop).await,
            Step::Restart => self.target_op(batch, &CommandKind::Restart, TargetOp::Restart).await,
            Step::Retrieve(kind) => {
                let commands = batch.take(&retrieval_command(kind));
                retrieval::run_retrievals(
                    self.store,
                    self.artifacts,
                    &self.settings.output_dir,
                    kind,
                    commands,
                )
                .await;
            }
            Step::CreateRecSession => {
                let commands = batch.take(&CommandKind::CreateRecSession);
                lifecycle::run_create_rec_sessions(self.store, commands).await;
            }
            Step::Call => {
                let commands = batch.take(&CommandKind::Call);
                lifecycle::run_call(self.store, &self.settings.call_destination, commands).await;
            }
            Step::Hangup => {
                let commands = batch.take(&CommandKind::Hangup);
                lifecycle::run_hangup(self.store, commands).await;
            }
            Step::Extension(name) => {
                let commands = batch.take(&CommandKind::Other(name.clone()));
                self.extensions.dispatch(self.store, &name, commands).await;
            }
        }
    }

    /// Refresh the radio status and return the delay before the next refresh.
    pub async fn refresh_status(&self) -> Duration {
        if let Err(err) = self.store.refresh_radio_status().await {
            warn!(error = ?err, "radio status refresh failed");
        }
        self.settings.status_interval
    }

    /// Store-recommended poll interval, clamped to [`MIN_POLL_INTERVAL`].
    ///
    /// Falls back to the last good interval when the store cannot be read.
    pub async fn poll_interval(&self) -> Duration {
        match self.store.command_poll_interval().await {
            Ok(interval) => {
                let interval = interval.max(MIN_POLL_INTERVAL);
                self.last_interval.set(interval);
                interval
            }
            Err(err) => {
                let kept = self.last_interval.get();
                warn!(error = ?err, interval_secs = kept.as_secs(), "keeping previous poll interval");
                kept
            }
        }
    }

    async fn target_op(&self, batch: &mut CommandBatch, kind: &CommandKind, op: TargetOp) {
        let commands = batch.take(kind);
        lifecycle::run_target_op(self.store, self.target, op, commands).await;
    }
}

/// Placeholder handling: drop the bucket for this cycle without completing
/// it, so the store delivers it again on the next poll.
fn defer(batch: &mut CommandBatch, kind: &CommandKind) {
    let deferred = batch.take(kind);
    debug!(%kind, count = deferred.len(), "command type not handled yet; deferring");
}
