//! Session activity monitor: wiring between the activity feed, the inactivity
//! tracker and the expiry sequence.

pub mod args;
pub mod expiry;
pub mod sampler;
pub mod tracker;

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{session_api::SessionApi, surface::ExpirySurface, utils::clock::Clock};

use expiry::ExpirySequence;
use sampler::PingSampler;
use tracker::InactivityTracker;

/// Local timeout after which, absent activity, the logout sequence fires.
pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(60 * 10);
/// Period of the server-side validity poll. Kept well below the local timeout
/// so a server invalidation is seen before the local deadline would fire.
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(60 * 2);
/// How long the expiry notice stays up before navigation.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(2);
/// Fraction of activity events that also ping the server.
pub const DEFAULT_PING_RATE: f64 = 0.1;
/// Login entry point, with the marker signalling an expiry-induced redirect.
pub const DEFAULT_LOGIN_REDIRECT: &str = "/login?expired=true";

const ACTIVITY_CHANNEL_CAPACITY: usize = 64;

/// Interaction kinds that qualify as activity, mirroring the listener set a
/// storefront page registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    PointerDown,
    PointerMove,
    KeyDown,
    KeyPress,
    Scroll,
    TouchStart,
    Click,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub inactivity_timeout: Duration,
    pub poll_period: Duration,
    pub redirect_delay: Duration,
    pub ping_rate: f64,
    pub login_redirect: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: DEFAULT_INACTIVITY_TIMEOUT,
            poll_period: DEFAULT_POLL_PERIOD,
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            ping_rate: DEFAULT_PING_RATE,
            login_redirect: DEFAULT_LOGIN_REDIRECT.to_string(),
        }
    }
}

/// Sender half handed to whatever produces activity events, plus the teardown
/// switch for page unload.
#[derive(Clone)]
pub struct ActivityHandle {
    events: mpsc::Sender<ActivityKind>,
    teardown: CancellationToken,
}

impl ActivityHandle {
    /// Records an activity event without blocking. Dropping an event during a
    /// pointer-move storm is harmless: a neighboring event resets the same
    /// deadline.
    pub fn record(&self, kind: ActivityKind) {
        if let Err(e) = self.events.try_send(kind) {
            debug!("Activity event dropped: {e}");
        }
    }

    /// Stops the tracker. Idempotent.
    pub fn teardown(&self) {
        self.teardown.cancel();
    }

    /// Resolves once the monitor has been torn down or has expired.
    pub async fn closed(&self) {
        self.teardown.cancelled().await
    }
}

/// Builds the monitor. Returns [None] when the user is not authenticated; the
/// caller supplies that flag explicitly, the monitor never inspects the page
/// itself. Build at most one monitor per page session, a second one would
/// double-track the same activity feed.
pub fn build_monitor(
    config: MonitorConfig,
    api: Arc<dyn SessionApi>,
    surface: Arc<dyn ExpirySurface>,
    clock: Arc<dyn Clock>,
    authenticated: bool,
) -> Option<(ActivityHandle, InactivityTracker)> {
    if !authenticated {
        info!("User not authenticated, skipping inactivity tracking");
        return None;
    }
    let sampler = PingSampler::from_rate(config.ping_rate);
    Some(create_tracker(config, api, surface, clock, sampler))
}

fn create_tracker(
    config: MonitorConfig,
    api: Arc<dyn SessionApi>,
    surface: Arc<dyn ExpirySurface>,
    clock: Arc<dyn Clock>,
    sampler: PingSampler,
) -> (ActivityHandle, InactivityTracker) {
    let (sender, receiver) = mpsc::channel(ACTIVITY_CHANNEL_CAPACITY);
    let teardown = CancellationToken::new();
    let expiry = ExpirySequence::new(
        api.clone(),
        surface,
        clock.clone(),
        config.redirect_delay,
        config.login_redirect.clone(),
    );
    let tracker = InactivityTracker::new(
        receiver,
        api,
        teardown.clone(),
        sampler,
        expiry,
        config,
        clock,
    );
    let handle = ActivityHandle {
        events: sender,
        teardown,
    };
    (handle, tracker)
}
