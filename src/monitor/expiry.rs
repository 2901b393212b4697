use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::{session_api::SessionApi, surface::ExpirySurface, utils::clock::Clock};

/// Which signal tripped the expiry. Only ever logged.
#[derive(Debug, Clone, Copy)]
pub enum ExpiryCause {
    LocalTimeout,
    ServerInvalidated,
}

/// The one-shot terminal transition: notify the user, fire a best-effort
/// server logout, and after the display delay navigate to the login entry
/// point. The local deadline and a server poll can trip this back to back,
/// so running it again is a no-op.
pub struct ExpirySequence {
    api: Arc<dyn SessionApi>,
    surface: Arc<dyn ExpirySurface>,
    clock: Arc<dyn Clock>,
    redirect_delay: Duration,
    login_redirect: String,
    fired: bool,
}

impl ExpirySequence {
    pub(crate) fn new(
        api: Arc<dyn SessionApi>,
        surface: Arc<dyn ExpirySurface>,
        clock: Arc<dyn Clock>,
        redirect_delay: Duration,
        login_redirect: String,
    ) -> Self {
        Self {
            api,
            surface,
            clock,
            redirect_delay,
            login_redirect,
            fired: false,
        }
    }

    pub async fn run(&mut self, cause: ExpiryCause) {
        if self.fired {
            debug!("Expiry already handled, ignoring {cause:?}");
            return;
        }
        self.fired = true;
        warn!("Session expired ({cause:?}), starting logout sequence");

        self.surface.notify_session_expired();

        // Fire-and-forget. Awaiting the logout would delay the redirect by
        // however long the server takes.
        let api = self.api.clone();
        tokio::spawn(async move {
            if let Err(e) = api.logout().await {
                debug!("Logout call failed: {e:?}");
            }
        });

        self.clock.sleep(self.redirect_delay).await;
        self.surface.redirect(&self.login_redirect);
    }
}
