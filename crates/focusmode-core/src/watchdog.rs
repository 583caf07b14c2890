use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;

use crate::blocker::{report_outcomes, ProcessBlocker, Verbosity};
use crate::cancel::CancellationToken;

/// Background loop that keeps re-blocking apps for the length of a session
pub struct Watchdog {
    blocker: Arc<ProcessBlocker>,
    apps: Vec<String>,
    interval: Duration,
}

impl Watchdog {
    #[must_use]
    pub fn new(blocker: Arc<ProcessBlocker>, apps: Vec<String>, interval: Duration) -> Self {
        Self {
            blocker,
            apps,
            interval,
        }
    }

    /// Start the loop on the runtime. It runs until `token` is cancelled.
    #[must_use]
    pub fn spawn(self, token: CancellationToken) -> WatchdogHandle {
        let task = tokio::spawn(self.run(token.clone()));
        WatchdogHandle { token, task }
    }

    async fn run(self, token: CancellationToken) -> u32 {
        log::debug!(
            "Watchdog started for {} app(s), every {:?}",
            self.apps.len(),
            self.interval
        );
        let mut passes = 0;

        while !token.is_cancelled() {
            let outcomes = self.blocker.block_apps(&self.apps).await;
            passes += 1;
            report_outcomes(&outcomes, Verbosity::Quiet);

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = token.cancelled() => {}
            }
        }

        log::debug!("Watchdog stopped after {passes} pass(es)");
        passes
    }
}

/// Controller side of a running watchdog
pub struct WatchdogHandle {
    token: CancellationToken,
    task: JoinHandle<u32>,
}

impl WatchdogHandle {
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancel the loop and wait for it to exit.
    ///
    /// Once this returns no further blocking pass can start. Returns the
    /// number of passes made.
    ///
    /// # Errors
    ///
    /// Returns an error if the watchdog task panicked
    pub async fn stop(self) -> Result<u32> {
        self.token.cancel();
        self.task.await.context("Watchdog task failed")
    }
}
