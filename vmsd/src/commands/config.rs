//! Config command: print the effective configuration.

use anyhow::{Context, Result};

use crate::domain::DaemonConfig;

/// Print `config` as pretty JSON.
///
/// Only the password file path is shown, never its contents.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized.
pub fn run(config: &DaemonConfig) -> Result<()> {
    let rendered = serde_json::to_string_pretty(config).context("serializing configuration")?;
    println!("{rendered}");
    Ok(())
}
