//! Proactive refresh task: polls the session expiry and refreshes before the
//! access token runs out, so well-behaved callers never see a 401.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::session::SessionClient;

/// How often the expiry is checked, and how close to expiry a refresh fires.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub poll_interval: Duration,
    pub refresh_margin: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            refresh_margin: Duration::from_secs(5 * 60),
        }
    }
}

/// Handle to the running refresh task. Owned by the session client; dropped
/// or stopped on logout and teardown.
pub struct RefreshScheduler {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl RefreshScheduler {
    pub fn start(client: SessionClient, config: SchedulerConfig) -> Self {
        let token = CancellationToken::new();
        let child = token.clone();
        let handle = tokio::spawn(run(client, config, child));
        Self { token, handle }
    }

    pub fn stop(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

async fn run(client: SessionClient, config: SchedulerConfig, token: CancellationToken) {
    let margin_secs = config.refresh_margin.as_secs() as i64;
    // The first tick completes immediately, so expiry is checked once at
    // startup before settling into the polling cadence.
    let mut ticker = tokio::time::interval(config.poll_interval);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let Some(remaining) = client.seconds_until_expiry() else {
                    continue;
                };

                // Only a live-but-expiring session is refreshed here. An
                // already-expired one is left for the 401 path to resolve.
                if remaining > 0 && remaining <= margin_secs {
                    debug!("Session expires in {remaining}s; refreshing");
                    if client.refresh().await.is_err() {
                        // refresh() already emitted the expiry event.
                        break;
                    }
                }
            }
        }
    }
}
