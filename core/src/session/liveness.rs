//! Liveness probe
//!
//! A background task that pings a channel on a fixed interval while the
//! agent is connected. The probe is advisory: results are logged and never
//! change connection state.

use crate::session::api_client::SessionApi;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Shortest period a probe will tick at
pub const MIN_PING_INTERVAL: Duration = Duration::from_millis(100);
/// Longest period a probe will tick at
pub const MAX_PING_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Handle to a running probe task
///
/// The task is aborted when the handle is stopped or dropped, so a probe
/// can never outlive the value that owns it.
#[derive(Debug)]
pub struct LivenessProbe {
    channel: String,
    handle: JoinHandle<()>,
}

impl LivenessProbe {
    /// Spawn a probe pinging `channel` every `period`
    ///
    /// The first ping fires one full period after start. `period` is
    /// clamped to [`MIN_PING_INTERVAL`]..=[`MAX_PING_INTERVAL`]. Must be
    /// called from within a tokio runtime.
    pub fn start(api: Arc<dyn SessionApi>, channel: String, period: Duration) -> Self {
        let clamped = period.clamp(MIN_PING_INTERVAL, MAX_PING_INTERVAL);
        if clamped != period {
            warn!(
                requested_ms = period.as_millis() as u64,
                period_ms = clamped.as_millis() as u64,
                "Liveness period out of range, clamped"
            );
        }
        let period = clamped;
        debug!(channel = %channel, period_ms = period.as_millis() as u64, "Starting liveness probe");

        let task_channel = channel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match api.ping(&task_channel).await {
                    Ok(response) if response.code.is_success() => {
                        debug!(channel = %task_channel, "Liveness ping ok");
                    }
                    Ok(response) => {
                        warn!(
                            channel = %task_channel,
                            code = %response.code,
                            msg = %response.message(),
                            "Liveness ping reported inactive session"
                        );
                    }
                    Err(e) => {
                        warn!(channel = %task_channel, error = %e, "Liveness ping failed");
                    }
                }
            }
        });

        Self { channel, handle }
    }

    /// Channel being probed
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Whether the task is still scheduled
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop probing
    pub fn stop(self) {
        // Drop aborts the task
        debug!(channel = %self.channel, "Stopping liveness probe");
    }
}

impl Drop for LivenessProbe {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
