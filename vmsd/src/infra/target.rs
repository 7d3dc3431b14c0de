//! `McpTarget` adapter driving the MCP control tool.
//!
//! Every operation is one invocation of
//! `<ctl> --host <addr> --port <port> --user <user> <subcommand> [args..]`.
//! The password, when configured, travels in the `MCP_PASSWORD` environment
//! variable so it never shows up in the process list.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::{CommandRunner, McpTarget, TargetSession};
use crate::domain::DaemonConfig;
use crate::domain::error::TargetError;

/// Environment variable carrying the target password.
pub const PASSWORD_ENV: &str = "MCP_PASSWORD";

/// Connection parameters for the control tool.
#[derive(Clone)]
pub struct McpConnection {
    pub ctl: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
}

impl McpConnection {
    #[must_use]
    pub fn from_config(config: &DaemonConfig, password: Option<String>) -> Self {
        Self {
            ctl: config.mcp_ctl.clone(),
            host: config.mcp_address.clone(),
            port: config.mcp_port,
            user: config.mcp_username.clone(),
            password,
        }
    }
}

struct Inner<R> {
    runner: R,
    connection: McpConnection,
}

impl<R: CommandRunner> Inner<R> {
    async fn invoke(&self, operation: &str, extra: &[&str]) -> Result<()> {
        let conn = &self.connection;
        let port = conn.port.to_string();
        let mut args = vec![
            "--host",
            conn.host.as_str(),
            "--port",
            port.as_str(),
            "--user",
            conn.user.as_str(),
            operation,
        ];
        args.extend_from_slice(extra);

        let env: Vec<(&str, &str)> = conn
            .password
            .as_deref()
            .map(|password| (PASSWORD_ENV, password))
            .into_iter()
            .collect();

        debug!(ctl = %conn.ctl, operation, args = extra.len(), "invoking MCP control tool");
        let output = self
            .runner
            .run_with_env(&conn.ctl, &args, &env)
            .await
            .with_context(|| format!("running {} {operation}", conn.ctl))?;

        if !output.status.success() {
            return Err(TargetError::CommandFailed {
                operation: operation.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// MCP target reached through the control tool.
pub struct McpCtlTarget<R> {
    inner: Arc<Inner<R>>,
}

impl<R: CommandRunner> McpCtlTarget<R> {
    #[must_use]
    pub fn new(runner: R, connection: McpConnection) -> Self {
        Self {
            inner: Arc::new(Inner { runner, connection }),
        }
    }
}

impl<R: CommandRunner> McpTarget for McpCtlTarget<R> {
    type Session = McpCtlSession<R>;

    async fn connect(&self) -> Result<Self::Session> {
        self.inner.invoke("ping", &[]).await?;
        debug!(host = %self.inner.connection.host, "MCP target session opened");
        Ok(McpCtlSession {
            inner: Arc::clone(&self.inner),
        })
    }
}

/// An open session; each call is a separate control tool invocation.
pub struct McpCtlSession<R> {
    inner: Arc<Inner<R>>,
}

impl<R: CommandRunner> McpCtlSession<R> {
    async fn with_files(&self, operation: &str, names: &[String]) -> Result<()> {
        if names.is_empty() {
            debug!(operation, "no files; skipping");
            return Ok(());
        }
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        self.inner.invoke(operation, &names).await
    }
}

impl<R: CommandRunner> TargetSession for McpCtlSession<R> {
    async fn remove_files(&self, names: &[String]) -> Result<()> {
        self.with_files("remove-files", names).await
    }

    async fn add_files(&self, names: &[String]) -> Result<()> {
        self.with_files("add-files", names).await
    }

    async fn reload(&self, manifest: &Path) -> Result<()> {
        let path = manifest
            .to_str()
            .with_context(|| format!("manifest path {} is not UTF-8", manifest.display()))?;
        self.inner.invoke("reload", &[path]).await
    }

    async fn start(&self) -> Result<()> {
        self.inner.invoke("start", &[]).await
    }

    async fn stop(&self) -> Result<()> {
        self.inner.invoke("stop", &[]).await
    }

    async fn restart(&self) -> Result<()> {
        self.inner.invoke("restart", &[]).await
    }

    async fn close(self) -> Result<()> {
        debug!(host = %self.inner.connection.host, "MCP target session closed");
        Ok(())
    }
}
