//! Application service: target lifecycle, recording sessions and calls.
//!
//! START/STOP/RESTART, CALL and HANGUP are all-or-nothing: the whole bucket
//! shares one outcome. CREATE_REC_SESSION is completed command by command.

use anyhow::{Context, Result};
use qs_common::Command;
use tracing::info;

use crate::application::ports::{CommandStore, McpTarget, TargetSession};
use crate::application::services::completion;
use crate::application::services::session::with_session;

/// Power operations run against the MCP target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOp {
    Start,
    Stop,
    Restart,
}

impl TargetOp {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }

    async fn apply(self, session: &impl TargetSession) -> Result<()> {
        match self {
            Self::Start => session.start().await,
            Self::Stop => session.stop().await,
            Self::Restart => session.restart().await,
        }
    }
}

/// Run `op` once for the whole bucket and settle every command with its outcome.
pub async fn run_target_op<S, T>(store: &S, target: &T, op: TargetOp, commands: Vec<Command>)
where
    S: CommandStore,
    T: McpTarget,
{
    info!(op = op.as_str(), count = commands.len(), "running MCP target operation");
    let outcome = with_session(target, async |session| {
        op.apply(session)
            .await
            .with_context(|| format!("MCP target {}", op.as_str()))
    })
    .await;
    completion::settle(store, &commands, outcome).await;
}

/// Start a new recording session for each command.
pub async fn run_create_rec_sessions(store: &impl CommandStore, commands: Vec<Command>) {
    for command in &commands {
        let outcome = store
            .increment_session()
            .await
            .context("incrementing recording session")
            .map(|session| {
                info!(command_id = command.id, session, "recording session created");
            });
        completion::settle_one(store, command, outcome).await;
    }
}

/// Dial `destination` once for the whole bucket.
pub async fn run_call(store: &impl CommandStore, destination: &str, commands: Vec<Command>) {
    info!(destination, count = commands.len(), "placing call");
    let outcome = store
        .call(destination)
        .await
        .with_context(|| format!("calling {destination}"));
    completion::settle(store, &commands, outcome).await;
}

/// Hang up once for the whole bucket.
pub async fn run_hangup(store: &impl CommandStore, commands: Vec<Command>) {
    info!(count = commands.len(), "hanging up");
    let outcome = store.hangup().await.context("hanging up call");
    completion::settle(store, &commands, outcome).await;
}
