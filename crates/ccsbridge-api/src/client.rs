// Device HTTP client
//
// Wraps `reqwest::Client` with device URL construction, session cookie
// injection and status mapping. Endpoint methods live in `auth.rs` and
// `speakers.rs` as inherent impls to keep this module focused on
// transport mechanics.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::SessionToken;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for one conference system controller.
///
/// Holds no session state: the token returned by [`login`](Self::login) is
/// owned by the caller and passed back into every authenticated call.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_ms: u64,
}

impl DeviceClient {
    /// Create a client for `host` (an IPv4 address, optionally with
    /// `:port`). The device only serves plain HTTP.
    pub fn new(host: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = base_url_for_host(host)?;
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout_ms: transport.timeout_ms(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout_ms: TransportConfig::default().timeout_ms(),
        }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(&format!("api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) fn map_send_error(&self, err: reqwest::Error) -> Error {
        Error::from_send(err, self.timeout_ms)
    }

    /// Send an authenticated GET and decode the JSON body.
    ///
    /// A 401 becomes [`Error::SessionExpired`]; every other non-success
    /// status becomes [`Error::UnexpectedStatus`].
    pub(crate) async fn get_authenticated<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &SessionToken,
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header(reqwest::header::COOKIE, token.cookie_header())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;
        decode(&body)
    }
}

/// Decode a JSON body, keeping the raw text on failure.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_owned(),
    })
}

fn base_url_for_host(host: &str) -> Result<Url, Error> {
    let host = host.trim().trim_end_matches('/');
    Ok(Url::parse(&format!("http://{host}/"))?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builds_api_urls_from_host() {
        let client = DeviceClient::new("192.168.0.40", &TransportConfig::default()).unwrap();
        assert_eq!(
            client.api_url("speakers").unwrap().as_str(),
            "http://192.168.0.40/api/speakers"
        );
    }

    #[test]
    fn keeps_explicit_port() {
        let client = DeviceClient::new("10.0.0.5:8080", &TransportConfig::default()).unwrap();
        assert_eq!(
            client.api_url("login").unwrap().as_str(),
            "http://10.0.0.5:8080/api/login"
        );
    }

    #[test]
    fn decode_keeps_raw_body() {
        let err = decode::<Vec<u32>>("not json").unwrap_err();
        match err {
            Error::Deserialization { body, .. } => assert_eq!(body, "not json"),
            other => panic!("expected Deserialization, got {other:?}"),
        }
    }
}
