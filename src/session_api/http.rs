use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, StatusCode};
use serde::Deserialize;

use super::{SessionApi, SessionCheck};

pub const ACTIVITY_ENDPOINT: &str = "/api/update-activity";
pub const SESSION_CHECK_ENDPOINT: &str = "/api/check-session";
pub const LOGOUT_ENDPOINT: &str = "/auth/logout";

const CSRF_HEADER: &str = "X-CSRFToken";

/// Kept well below the poll period so a black-holed request degrades into the
/// best-effort error path instead of outliving the next poll.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct SessionStatus {
    session_valid: bool,
}

/// Client for the storefront session endpoints. The CSRF token is the opaque
/// page-embedded credential; the caller reads it from wherever the server
/// planted it and hands it over as-is.
pub struct HttpSessionApi {
    base_url: String,
    csrf_token: String,
    client: reqwest::Client,
}

impl HttpSessionApi {
    pub fn new(base_url: impl Into<String>, csrf_token: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_url,
            csrf_token: csrf_token.into(),
            client: reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn ping_activity(&self) -> Result<()> {
        self.client
            .post(self.url(ACTIVITY_ENDPOINT))
            .header(CONTENT_TYPE, "application/json")
            .header(CSRF_HEADER, &self.csrf_token)
            .send()
            .await
            .context("activity ping failed")?;
        Ok(())
    }

    async fn check_session(&self) -> Result<SessionCheck> {
        let response = self
            .client
            .get(self.url(SESSION_CHECK_ENDPOINT))
            .send()
            .await
            .context("session check unreachable")?;

        let status = response.status();
        // A 401 means the session is gone no matter what the body says, so
        // decide before even trying to read it.
        if status == StatusCode::UNAUTHORIZED {
            return Ok(SessionCheck::Invalid);
        }
        let body = response
            .bytes()
            .await
            .context("session check body unreadable")?;
        interpret_check_response(status, &body)
    }

    async fn logout(&self) -> Result<()> {
        self.client
            .post(self.url(LOGOUT_ENDPOINT))
            .header(CSRF_HEADER, &self.csrf_token)
            .send()
            .await
            .context("logout call failed")?;
        Ok(())
    }
}

/// Maps a session-check response to a check outcome. 401 short-circuits to
/// invalid even with an unparsable body; any other non-2xx status or a broken
/// payload is an error the caller is expected to log and ignore.
fn interpret_check_response(status: StatusCode, body: &[u8]) -> Result<SessionCheck> {
    if status == StatusCode::UNAUTHORIZED {
        return Ok(SessionCheck::Invalid);
    }
    if !status.is_success() {
        bail!("session check returned status {status}");
    }
    let payload: SessionStatus =
        serde_json::from_slice(body).context("session check payload was not parsable")?;
    if payload.session_valid {
        Ok(SessionCheck::Valid)
    } else {
        Ok(SessionCheck::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_invalid_even_with_garbage_body() {
        let result = interpret_check_response(StatusCode::UNAUTHORIZED, b"<html>nope</html>");
        assert_eq!(result.unwrap(), SessionCheck::Invalid);
    }

    #[test]
    fn payload_decides_validity_on_success() {
        let valid = interpret_check_response(StatusCode::OK, br#"{"session_valid": true}"#);
        assert_eq!(valid.unwrap(), SessionCheck::Valid);

        let invalid = interpret_check_response(StatusCode::OK, br#"{"session_valid": false}"#);
        assert_eq!(invalid.unwrap(), SessionCheck::Invalid);
    }

    #[test]
    fn other_statuses_are_best_effort_errors() {
        assert!(interpret_check_response(StatusCode::INTERNAL_SERVER_ERROR, b"").is_err());
        assert!(interpret_check_response(StatusCode::BAD_GATEWAY, b"busy").is_err());
    }

    #[test]
    fn unparsable_success_body_is_an_error() {
        assert!(interpret_check_response(StatusCode::OK, b"{oops").is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = HttpSessionApi::new("http://shop.local/", "token").unwrap();
        assert_eq!(
            api.url(SESSION_CHECK_ENDPOINT),
            "http://shop.local/api/check-session"
        );
    }
}
