//! User-visible outputs of the expiry sequence. The browser original shows a
//! toast and rewrites the location; here the surface is a trait so the
//! terminal binary and the tests can each supply their own.

use ansi_term::Colour;
use tracing::info;

pub trait ExpirySurface: Send + Sync + 'static {
    /// Non-blocking notification that the session has ended.
    fn notify_session_expired(&self);

    /// Navigates the user to `url`. Called at most once, after the display
    /// delay has passed.
    fn redirect(&self, url: &str);
}

/// Prints the expiry notice to the terminal.
pub struct TerminalSurface;

impl ExpirySurface for TerminalSurface {
    fn notify_session_expired(&self) {
        println!(
            "{}",
            Colour::Yellow
                .paint("Your session has expired due to inactivity. Redirecting to login...")
        );
    }

    fn redirect(&self, url: &str) {
        info!("Session over, directing user to {url}");
        println!("Session ended. Log in again at {url}");
    }
}
