//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application` or `tokio`. All error types implement
//! `thiserror::Error` and convert to `anyhow::Error` via the `?` operator.

use std::net::Ipv4Addr;

use thiserror::Error;

// ── Resolution errors ─────────────────────────────────────────────────────────

/// A command referenced an application the store does not know.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("app {reference} not found in application records [{known}]")]
    AppNotFound { reference: String, known: String },

    #[error("command {0} has no resolved application")]
    Unresolved(u64),
}

// ── Dispatch errors ───────────────────────────────────────────────────────────

/// Errors raised while routing a command to its handler.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown command {kind}:{id}")]
    UnknownCommand { kind: String, id: u64 },

    #[error("no command extension registered for namespace '{0}'")]
    ExtensionNotRegistered(String),

    #[error("invalid extension namespace '{0}'")]
    InvalidNamespace(String),

    #[error(
        "retrieval payload '{0}' is neither a session number nor a timestamp (YYYY-MM-DD HH:MM:SS)"
    )]
    InvalidRetrievalPayload(String),
}

// ── Target errors ─────────────────────────────────────────────────────────────

/// Failures reported by the MCP target control tool.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("MCP target {operation} failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        operation: String,
        code: Option<i32>,
        stderr: String,
    },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to daemon configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid guest address pool '{0}': expected FIRST-LAST, e.g. 10.0.0.10-10.0.0.250")]
    InvalidAddressPool(String),

    #[error("guest address pool is inverted: {first} comes after {last}")]
    InvertedAddressPool { first: Ipv4Addr, last: Ipv4Addr },

    #[error("{0} must be at least one second")]
    ZeroInterval(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}
