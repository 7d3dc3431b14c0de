//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::commands;
use crate::infra::config::load_from_env;

/// Gateway VM-app management daemon
#[derive(Parser)]
#[command(
    name = "qs-vmsd",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Log filter, overriding RUST_LOG (e.g. `debug`, `qs_vmsd=trace`)
    #[arg(long, global = true, env = "QS_VMS_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Poll the command store until interrupted
    Run,

    /// Run one drain cycle and print the next poll interval
    Drain,

    /// Print the effective configuration
    Config,

    /// Show version
    Version(commands::version::VersionArgs),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the command fails.
    pub async fn run(self) -> Result<()> {
        init_tracing(self.log_level.as_deref());
        match self.command {
            Command::Version(args) => {
                commands::version::run(&args);
                Ok(())
            }
            Command::Config => commands::config::run(&load_from_env()?),
            Command::Drain => {
                let ctx = AppContext::new(load_from_env()?)?;
                commands::drain::run(&ctx).await
            }
            Command::Run => {
                let ctx = AppContext::new(load_from_env()?)?;
                commands::run::run(&ctx).await
            }
        }
    }
}

/// Install the stderr `fmt` subscriber; `info` unless overridden.
fn init_tracing(level: Option<&str>) {
    let filter = level
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    // A subscriber may already be installed (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
