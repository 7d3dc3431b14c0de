//! Completion recording shared by every handler.
//!
//! Handlers never propagate errors past their boundary; they end every path
//! here. A completion that cannot be written is logged and the command stays
//! pending in the store.

use std::slice;

use qs_common::Command;
use tracing::{error, warn};

use crate::application::ports::CommandStore;

/// Full causal trace of `err`, one `Caused by:` entry per layer.
#[must_use]
pub fn diagnostic(err: &anyhow::Error) -> String {
    format!("{err:?}")
}

/// Write a completion record, logging instead of propagating failures.
pub async fn record(
    store: &impl CommandStore,
    commands: &[Command],
    success: bool,
    diagnostic: Option<&str>,
) {
    if commands.is_empty() {
        return;
    }
    if let Err(err) = store.complete_commands(commands, success, diagnostic).await {
        error!(
            ids = ?ids(commands),
            success,
            error = ?err,
            "failed to record command completion; commands remain pending"
        );
    }
}

/// Mark `commands` failed with the trace of `err`.
pub async fn fail(store: &impl CommandStore, commands: &[Command], err: &anyhow::Error) {
    if commands.is_empty() {
        return;
    }
    warn!(ids = ?ids(commands), error = %err, "commands failed");
    record(store, commands, false, Some(&diagnostic(err))).await;
}

/// Record `outcome` for all of `commands` at once.
pub async fn settle(store: &impl CommandStore, commands: &[Command], outcome: anyhow::Result<()>) {
    match outcome {
        Ok(()) => record(store, commands, true, None).await,
        Err(err) => fail(store, commands, &err).await,
    }
}

/// Record `outcome` for a single command.
pub async fn settle_one(store: &impl CommandStore, command: &Command, outcome: anyhow::Result<()>) {
    settle(store, slice::from_ref(command), outcome).await;
}

pub(crate) fn ids(commands: &[Command]) -> Vec<u64> {
    commands.iter().map(|c| c.id).collect()
}
