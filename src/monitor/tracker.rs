use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    session_api::{SessionApi, SessionCheck},
    utils::clock::Clock,
};

use super::{
    expiry::{ExpiryCause, ExpirySequence},
    sampler::PingSampler,
    ActivityKind, MonitorConfig,
};

/// Event loop owning the rolling inactivity deadline and the fixed-period
/// server poll. Runs as a single task, so all state mutation happens between
/// awaits and nothing needs locking.
pub struct InactivityTracker {
    events: mpsc::Receiver<ActivityKind>,
    api: Arc<dyn SessionApi>,
    teardown: CancellationToken,
    sampler: PingSampler,
    expiry: ExpirySequence,
    config: MonitorConfig,
    clock: Arc<dyn Clock>,
    last_activity_at: DateTime<Utc>,
}

impl InactivityTracker {
    pub(super) fn new(
        events: mpsc::Receiver<ActivityKind>,
        api: Arc<dyn SessionApi>,
        teardown: CancellationToken,
        sampler: PingSampler,
        expiry: ExpirySequence,
        config: MonitorConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let last_activity_at = clock.time();
        Self {
            events,
            api,
            teardown,
            sampler,
            expiry,
            config,
            clock,
            last_activity_at,
        }
    }

    /// Restarts the deadline. Cheap enough to run on every event of a
    /// pointer-move storm.
    fn on_activity(&mut self, kind: ActivityKind) -> tokio::time::Instant {
        self.last_activity_at = self.clock.time();
        debug!(
            "Activity ({kind:?}) at {}, deadline reset",
            self.last_activity_at
        );

        if self.sampler.should_ping() {
            let api = self.api.clone();
            tokio::spawn(async move {
                if let Err(e) = api.ping_activity().await {
                    debug!("Activity ping failed: {e:?}");
                }
            });
        }

        self.clock.instant() + self.config.inactivity_timeout
    }

    /// Executes the tracker event loop. Returns after expiry or teardown;
    /// both pending deferred actions die with the loop.
    pub async fn run(mut self) -> Result<()> {
        info!(
            "Starting inactivity tracking, timeout {:?}, server poll every {:?}",
            self.config.inactivity_timeout, self.config.poll_period
        );
        // Session checks run off the loop and report back over this channel,
        // so a stalled server can't starve the deadline or the activity feed.
        let (check_results, mut check_outcomes) = mpsc::channel::<Result<SessionCheck>>(1);
        let mut deadline = self.clock.instant() + self.config.inactivity_timeout;
        let mut next_poll = self.clock.instant() + self.config.poll_period;
        loop {
            tokio::select! {
                _ = self.teardown.cancelled() => {
                    debug!("Tracker torn down");
                    return Ok(());
                }
                event = self.events.recv() => match event {
                    Some(kind) => deadline = self.on_activity(kind),
                    // Every handle dropped, same as an explicit teardown.
                    None => {
                        self.teardown.cancel();
                        return Ok(());
                    }
                },
                _ = self.clock.sleep_until(deadline) => {
                    self.teardown.cancel();
                    self.expiry.run(ExpiryCause::LocalTimeout).await;
                    return Ok(());
                }
                _ = self.clock.sleep_until(next_poll) => {
                    next_poll += self.config.poll_period;
                    let api = self.api.clone();
                    let results = check_results.clone();
                    tokio::spawn(async move {
                        // The receiver is gone once the loop exits; an
                        // undeliverable outcome is simply dropped.
                        let _ = results.send(api.check_session().await).await;
                    });
                }
                Some(result) = check_outcomes.recv() => match result {
                    Ok(SessionCheck::Valid) => debug!("Server session still valid"),
                    Ok(SessionCheck::Invalid) => {
                        warn!("Server reports the session invalid");
                        self.teardown.cancel();
                        self.expiry.run(ExpiryCause::ServerInvalidated).await;
                        return Ok(());
                    }
                    // Best-effort. The local deadline stays authoritative
                    // while the server is unreachable.
                    Err(e) => debug!("Session check failed: {e:?}"),
                }
            }
        }
    }
}
