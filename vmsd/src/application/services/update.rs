//! Application service: ADD_VMAPP / REMOVE_VMAPP.
//!
//! Both buckets are handled as one update: resolve the referenced apps,
//! push the file changes and a rebuilt manifest to the target, then commit
//! the state transitions one command at a time.
//!
//! Each command is dropped from its in-memory list *before* its success is
//! recorded. When a later step fails, only commands still in the lists are
//! marked failed, so an applied and completed transition is never reported
//! as a failure.

use std::path::PathBuf;

use anyhow::{Context, Result};
use qs_common::{Application, Command};
use tracing::{debug, info};

use crate::application::ports::{
    CommandStore, ManifestBuilder, ManifestFactory, McpTarget, TargetSession,
};
use crate::application::services::completion;
use crate::application::services::session::with_session;
use crate::domain::error::ResolveError;
use crate::domain::plan::{UpdatePlan, resolve_apps};
use crate::domain::transition;
use crate::domain::AddressPool;

/// Network parameters baked into every manifest.
#[derive(Debug, Clone)]
pub struct TargetNetwork {
    /// Address of the MCP target.
    pub address: String,
    /// Guest address pool.
    pub pool: AddressPool,
}

/// Apply a combined add/remove update.
///
/// Never fails: every command ends with a completion record, either success
/// from the commit loop or failure for whatever was left when an error hit.
pub async fn apply_update<S, T, M>(
    store: &S,
    target: &T,
    manifests: &M,
    network: &TargetNetwork,
    mut add: Vec<Command>,
    mut remove: Vec<Command>,
) where
    S: CommandStore,
    T: McpTarget,
    M: ManifestFactory,
{
    info!(add = add.len(), remove = remove.len(), "updating MCP target apps");
    if let Err(err) = update_target(store, target, manifests, network, &mut add, &mut remove).await
    {
        let remaining: Vec<Command> = add.into_iter().chain(remove).collect();
        completion::fail(store, &remaining, &err).await;
    }
}

async fn update_target<S, T, M>(
    store: &S,
    target: &T,
    manifests: &M,
    network: &TargetNetwork,
    add: &mut Vec<Command>,
    remove: &mut Vec<Command>,
) -> Result<()>
where
    S: CommandStore,
    T: McpTarget,
    M: ManifestFactory,
{
    let apps = store
        .applications()
        .await
        .context("loading application records")?;
    let removing = resolve_apps(remove, &apps).context("resolving REMOVE_VMAPP commands")?;
    let adding = resolve_apps(add, &apps).context("resolving ADD_VMAPP commands")?;

    let plan = UpdatePlan::new(&apps, &removing, &adding);
    debug!(
        members = ?plan.required_files(),
        remove_files = ?plan.remove_files,
        add_files = ?plan.add_files,
        "update plan"
    );

    with_session(target, async |session| {
        push_plan(session, manifests, network, &plan).await
    })
    .await?;

    commit(store, remove, transition::on_remove).await?;
    commit(store, add, transition::on_add).await?;
    Ok(())
}

async fn push_plan(
    session: &impl TargetSession,
    manifests: &impl ManifestFactory,
    network: &TargetNetwork,
    plan: &UpdatePlan,
) -> Result<()> {
    session
        .remove_files(&plan.remove_files)
        .await
        .context("removing app files from MCP target")?;
    session
        .add_files(&plan.add_files)
        .await
        .context("adding app files to MCP target")?;

    let manifest = build_manifest(manifests, &plan.membership, network)?;
    session
        .reload(&manifest)
        .await
        .with_context(|| format!("reloading MCP target with {}", manifest.display()))
}

/// Build the manifest and release the builder whether or not it succeeded.
fn build_manifest(
    manifests: &impl ManifestFactory,
    apps: &[Application],
    network: &TargetNetwork,
) -> Result<PathBuf> {
    let mut builder = manifests.create().context("creating manifest")?;
    let added = builder.add_applications(apps, &network.address, &network.pool);
    let path = builder.path().to_path_buf();
    let closed = builder.close();
    added.context("adding applications to manifest")?;
    closed.context("releasing manifest builder")?;
    Ok(path)
}

/// Drop-then-complete commit loop.
async fn commit(
    store: &impl CommandStore,
    commands: &mut Vec<Command>,
    change_for: fn(&Application) -> qs_common::StateChange,
) -> Result<()> {
    while let Some(command) = commands.first() {
        let app = command
            .app
            .as_ref()
            .ok_or(ResolveError::Unresolved(command.id))?;
        let change = change_for(app);
        store
            .set_application_state(app, &change)
            .await
            .with_context(|| format!("setting state {} for app {}", change.code, app.id))?;

        let done = commands.remove(0);
        store
            .complete_commands(std::slice::from_ref(&done), true, None)
            .await
            .with_context(|| format!("completing command {}", done.id))?;
        info!(command_id = done.id, kind = %done.kind, code = %change.code, "app state updated");
    }
    Ok(())
}
