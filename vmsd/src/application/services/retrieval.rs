//! Application service: RETRIEVE_* commands.
//!
//! Each command is parsed, queried, written and completed on its own, so a
//! malformed payload fails only the command that carries it.

use std::path::Path;

use anyhow::{Context, Result};
use qs_common::{Command, RecordKind};
use tracing::{debug, info};

use crate::application::ports::{ArtifactWriter, CommandStore};
use crate::application::services::completion;
use crate::domain::retrieval::{artifact_name, parse_filter};

/// Retrieve records of `kind` for every command and write one artifact each.
pub async fn run_retrievals<S, W>(
    store: &S,
    artifacts: &W,
    output_dir: &Path,
    kind: RecordKind,
    commands: Vec<Command>,
) where
    S: CommandStore,
    W: ArtifactWriter,
{
    for command in &commands {
        let outcome = retrieve_one(store, artifacts, output_dir, kind, command).await;
        completion::settle_one(store, command, outcome).await;
    }
}

async fn retrieve_one(
    store: &impl CommandStore,
    artifacts: &impl ArtifactWriter,
    output_dir: &Path,
    kind: RecordKind,
    command: &Command,
) -> Result<()> {
    let filter = parse_filter(&command.data)?;
    debug!(command_id = command.id, ?filter, category = kind.category(), "retrieving records");

    let records = store
        .retrieve_records(kind, &filter)
        .await
        .with_context(|| format!("retrieving {} records", kind.category()))?;

    let path = output_dir.join(artifact_name(kind, command));
    artifacts
        .write_json(&path, &records)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    info!(command_id = command.id, path = %path.display(), "records written");
    Ok(())
}
