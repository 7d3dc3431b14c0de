//! Periodic task runner.
//!
//! A task is invoked, returns the delay before its next run, and is invoked
//! again once that delay has elapsed. The stop signal is only observed while
//! sleeping, so an invocation that has started always runs to completion.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

/// Create a linked stop handle and signal.
#[must_use]
pub fn stop_channel() -> (Stopper, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (Stopper(tx), StopSignal(rx))
}

/// Owner side of the stop channel.
#[derive(Debug)]
pub struct Stopper(watch::Sender<bool>);

impl Stopper {
    /// Ask every task holding a linked [`StopSignal`] to stop.
    pub fn stop(&self) {
        self.0.send_replace(true);
    }
}

/// Cloneable stop notification.
#[derive(Debug, Clone)]
pub struct StopSignal(watch::Receiver<bool>);

impl StopSignal {
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once stop has been requested or the [`Stopper`] is dropped.
    pub async fn stopped(&mut self) {
        // A dropped sender also ends the wait.
        let _ = self.0.wait_for(|stopped| *stopped).await;
    }
}

/// Run `task` every time the interval it last returned has elapsed.
///
/// The first invocation happens after `initial`. Returns how many times the
/// task ran.
pub async fn run_periodic<F, Fut>(
    name: &str,
    initial: Duration,
    mut task: F,
    mut stop: StopSignal,
) -> u64
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Duration>,
{
    info!(task = name, interval_secs = initial.as_secs(), "periodic task started");
    let mut interval = initial;
    let mut runs = 0;
    loop {
        if stop.is_stopped() {
            break;
        }
        tokio::select! {
            () = stop.stopped() => break,
            () = tokio::time::sleep(interval) => {}
        }
        interval = task().await;
        runs += 1;
        debug!(task = name, interval_secs = interval.as_secs(), "next run scheduled");
    }
    info!(task = name, runs, "periodic task stopped");
    runs
}
