//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `qs_common`, never from
//! `crate::infra` or `crate::commands`.

use std::path::Path;
use std::process::Output;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use qs_common::{Application, Command, RecordFilter, RecordKind, StateChange};

use crate::domain::{AddressPool, CommandBatch};

// ── Command Store Port ────────────────────────────────────────────────────────

/// Persistent queue of operator commands plus the records they act on.
#[allow(async_fn_in_trait)]
pub trait CommandStore {
    /// Every command without a completion record, grouped by type.
    async fn pending_commands(&self) -> Result<CommandBatch>;
    /// Every VM-app record.
    async fn applications(&self) -> Result<Vec<Application>>;
    /// Persist a state transition for `app`.
    async fn set_application_state(&self, app: &Application, change: &StateChange) -> Result<()>;
    /// Write the completion record for `commands`.
    ///
    /// This is the only effect that marks a command as done.
    async fn complete_commands(
        &self,
        commands: &[Command],
        success: bool,
        diagnostic: Option<&str>,
    ) -> Result<()>;
    /// Start a new recording session, returning its number.
    async fn increment_session(&self) -> Result<i64>;
    /// Currently recommended delay between command polls.
    async fn command_poll_interval(&self) -> Result<Duration>;
    /// Query command logs, system messages or flight data.
    async fn retrieve_records(
        &self,
        kind: RecordKind,
        filter: &RecordFilter,
    ) -> Result<serde_json::Value>;
    /// Place a call to `destination`.
    async fn call(&self, destination: &str) -> Result<()>;
    /// End the current call.
    async fn hangup(&self) -> Result<()>;
    /// Retrieve and store the current radio status.
    async fn refresh_radio_status(&self) -> Result<()>;
}

// ── MCP Target Ports ──────────────────────────────────────────────────────────

/// Factory for scoped connections to the MCP target.
#[allow(async_fn_in_trait)]
pub trait McpTarget {
    type Session: TargetSession;

    /// Open a session. The caller must hand it back through
    /// [`TargetSession::close`] on every path.
    async fn connect(&self) -> Result<Self::Session>;
}

/// One open connection to the MCP target.
#[allow(async_fn_in_trait)]
pub trait TargetSession {
    /// Delete app files from the target.
    async fn remove_files(&self, names: &[String]) -> Result<()>;
    /// Upload app files to the target. Uploading a present file is harmless.
    async fn add_files(&self, names: &[String]) -> Result<()>;
    /// Reload the target with the manifest at `manifest`.
    async fn reload(&self, manifest: &Path) -> Result<()>;
    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    async fn restart(&self) -> Result<()>;
    /// Close the session.
    async fn close(self) -> Result<()>;
}

// ── Manifest Ports ────────────────────────────────────────────────────────────

/// Creates manifest builders; one builder per update.
pub trait ManifestFactory {
    type Builder: ManifestBuilder;

    /// # Errors
    ///
    /// Returns an error if the backing artifact cannot be created.
    fn create(&self) -> Result<Self::Builder>;
}

/// A manifest under construction.
pub trait ManifestBuilder {
    /// Add `apps` with the network parameters they run under.
    ///
    /// # Errors
    ///
    /// Returns an error if the apps cannot be recorded (e.g. address pool exhausted).
    fn add_applications(
        &mut self,
        apps: &[Application],
        target_address: &str,
        pool: &AddressPool,
    ) -> Result<()>;
    /// Location of the manifest artifact; stays valid after [`close`](Self::close).
    fn path(&self) -> &Path;
    /// Release the builder's resources.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be finalized.
    fn close(self) -> Result<()>;
}

// ── Artifact Port ─────────────────────────────────────────────────────────────

/// Writes retrieval results for operators to collect.
#[allow(async_fn_in_trait)]
pub trait ArtifactWriter {
    async fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<()>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with extra environment variables.
    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<Output>;
}

// ── Extension Ports ───────────────────────────────────────────────────────────

/// Handler for `namespace.verb` command types.
///
/// `Ok(flag)` is recorded verbatim as the command's success flag; `Err`
/// fails only the command being processed.
#[async_trait::async_trait(?Send)]
pub trait CommandExtension<S> {
    async fn process(&self, store: &S, verb: &str, payload: &str) -> Result<bool>;
}

/// Looks up extensions that were not registered at startup.
pub trait ExtensionLoader<S> {
    /// # Errors
    ///
    /// Returns an error if no extension exists for `namespace`.
    fn load(&self, namespace: &str) -> Result<Arc<dyn CommandExtension<S>>>;
}
