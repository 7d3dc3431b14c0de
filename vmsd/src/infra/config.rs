//! Environment-backed daemon configuration.

use anyhow::{Context, Result};

use crate::domain::DaemonConfig;

/// Prefix shared by every daemon environment variable.
pub const ENV_PREFIX: &str = "QS_VMS_";

/// Load and validate the configuration from `QS_VMS_*` variables.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed or the result is invalid.
pub fn load_from_env() -> Result<DaemonConfig> {
    let config: DaemonConfig = envy::prefixed(ENV_PREFIX)
        .from_env()
        .with_context(|| format!("failed to load config from {ENV_PREFIX}* env vars"))?;
    config.validate().context("invalid daemon configuration")?;
    Ok(config)
}

/// Read the MCP target password, if a password file is configured.
///
/// Surrounding whitespace (including the trailing newline of secret files)
/// is stripped.
///
/// # Errors
///
/// Returns an error if the file is configured but unreadable.
pub fn read_password(config: &DaemonConfig) -> Result<Option<String>> {
    let Some(path) = &config.mcp_password_file else {
        return Ok(None);
    };
    let secret = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read password from {}", path.display()))?;
    Ok(Some(secret.trim().to_string()))
}
