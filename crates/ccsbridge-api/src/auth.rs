// Session authentication
//
// The device issues an opaque session id from `POST /api/login`.
// Every authenticated request carries it back as a `sid` cookie.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{DeviceClient, decode};
use crate::error::Error;
use crate::models::{LoginRequest, LoginResponse};

/// Opaque session credential issued by the device at login.
#[derive(Debug, Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    pub fn new(sid: impl Into<String>) -> Self {
        Self(SecretString::from(sid.into()))
    }

    /// The raw session id.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Value for the `Cookie` request header.
    pub fn cookie_header(&self) -> String {
        format!("sid={}", self.0.expose_secret())
    }
}

impl DeviceClient {
    /// Authenticate with username/password and return the session token.
    ///
    /// Always sends `override: true`, so a stale session held by the same
    /// user is taken over rather than blocking the login. A success status
    /// without a `sid` in the body is treated as a failed login.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<SessionToken, Error> {
        let url = self.api_url("login")?;
        debug!("logging in at {}", url);

        let body = LoginRequest {
            override_session: true,
            username,
            password: password.expose_secret(),
        };

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let text = resp.text().await.map_err(|e| self.map_send_error(e))?;
        let parsed: LoginResponse = decode(&text)?;

        match parsed.sid {
            Some(sid) if !sid.is_empty() => {
                debug!("login successful");
                Ok(SessionToken::new(sid))
            }
            _ => Err(Error::Authentication {
                message: "login response carried no session id".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_uses_sid_name() {
        let token = SessionToken::new("abc123");
        assert_eq!(token.cookie_header(), "sid=abc123");
        assert_eq!(token.expose(), "abc123");
    }

    #[test]
    fn debug_output_hides_the_token() {
        let token = SessionToken::new("super-secret");
        assert!(!format!("{token:?}").contains("super-secret"));
    }
}
