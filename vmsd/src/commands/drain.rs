//! Drain command: one pass over the pending commands.

use anyhow::Result;

use crate::app::AppContext;

/// Run a single drain cycle and print the delay before the next poll.
///
/// # Errors
///
/// Never fails once the context is built; handler failures end up in the
/// store as completion records.
pub async fn run(ctx: &AppContext) -> Result<()> {
    let next = ctx.orchestrator().drain_cycle().await;
    println!("next poll in {}s", next.as_secs());
    Ok(())
}
