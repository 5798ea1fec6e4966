//! Liveness watchdog.
//!
//! If we are receiving events, we must be connected. After a silence
//! window with no inbound messages, probe the chat API from our end; if
//! the probe fails, terminate the process and let external supervision
//! restart it. This is the one fatal condition in the bot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{error, info, warn};

use super::client::SlackClient;

/// Default silence window before probing.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Inactivity watchdog. Cheap to clone; `touch` from the message loop,
/// `run` as its own task.
#[derive(Debug, Clone)]
pub struct Watchdog {
    activity: Arc<Notify>,
    timeout: Duration,
}

impl Watchdog {
    pub fn new(timeout: Duration) -> Self {
        Self {
            activity: Arc::new(Notify::new()),
            timeout,
        }
    }

    /// Records channel activity. Any inbound event counts, command or
    /// not - chatter from other users proves the connection is alive.
    pub fn touch(&self) {
        self.activity.notify_one();
    }

    /// Runs the watchdog loop.
    ///
    /// After a successful probe the timer stays disarmed until the next
    /// message arrives; a dead-quiet channel only triggers one probe.
    pub async fn run(self, client: SlackClient) {
        info!(
            "Watchdog armed: {}s silence window",
            self.timeout.as_secs()
        );

        loop {
            tokio::select! {
                _ = self.activity.notified() => {
                    // Activity - restart the silence window.
                }
                _ = tokio::time::sleep(self.timeout) => {
                    warn!(
                        "{}s without any messages, probing chat API",
                        self.timeout.as_secs()
                    );
                    match client.auth_test().await {
                        Ok(()) => {
                            info!("Liveness probe ok, waiting for traffic");
                            self.activity.notified().await;
                        }
                        Err(e) => {
                            error!("Liveness probe failed, exiting for restart: {}", e);
                            std::process::exit(1);
                        }
                    }
                }
            }
        }
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_touch_stores_a_permit() {
        let watchdog = Watchdog::new(Duration::from_secs(60));
        watchdog.touch();
        // The stored permit resolves immediately.
        watchdog.activity.notified().await;
    }

    #[test]
    fn test_clones_share_the_notifier() {
        let watchdog = Watchdog::default();
        let clone = watchdog.clone();
        assert!(Arc::ptr_eq(&watchdog.activity, &clone.activity));
        assert_eq!(watchdog.timeout, DEFAULT_TIMEOUT);
    }
}
