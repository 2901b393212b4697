//! Contract between the monitor and the server-side session service.
//! [http::HttpSessionApi] is the production implementation; tests substitute
//! a mock at this seam.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;

/// Outcome of a server-side session validity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    Valid,
    /// The server no longer considers the session live. Promoted to an expiry
    /// signal by the tracker.
    Invalid,
}

/// Server endpoints the monitor talks to. Every call here is best-effort:
/// callers log failures and never retry them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionApi: Send + Sync + 'static {
    /// Lightweight liveness ping, sent for a sampled fraction of activity
    /// events to keep the server-side session roughly in sync.
    async fn ping_activity(&self) -> Result<()>;

    /// Queries the session-status endpoint.
    async fn check_session(&self) -> Result<SessionCheck>;

    /// Server-side logout. The expiry sequence ignores the outcome.
    async fn logout(&self) -> Result<()>;
}
