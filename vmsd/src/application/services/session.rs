//! Scoped MCP target sessions.
//!
//! A session is opened at handler entry and closed on every exit path. It is
//! never stored, so it cannot outlive the handler that opened it.

use anyhow::{Context, Result};
use tracing::warn;

use crate::application::ports::{McpTarget, TargetSession};

/// Open a session, run `body` against it, and close it whatever happened.
///
/// When both `body` and the close fail, the body's error wins and the close
/// error is logged.
///
/// # Errors
///
/// Returns the first failure among connect, `body`, and close.
pub async fn with_session<T, R>(
    target: &T,
    body: impl AsyncFnOnce(&T::Session) -> Result<R>,
) -> Result<R>
where
    T: McpTarget,
{
    let session = target.connect().await.context("connecting to MCP target")?;
    let outcome = body(&session).await;
    let closed = session.close().await.context("closing MCP target session");
    match outcome {
        Ok(value) => closed.map(|()| value),
        Err(err) => {
            if let Err(close_err) = closed {
                warn!(error = ?close_err, "session close failed after an earlier error");
            }
            Err(err)
        }
    }
}
