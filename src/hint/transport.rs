//! HTTP transport seam.
//!
//! [`HintClient`](super::HintClient) talks to the network only through the
//! [`Transport`] trait, so tests can count and script calls.

use crate::error::HintError;
use std::time::Duration;
use tracing::debug;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    /// Returns whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Trait for issuing one JSON POST.
pub trait Transport {
    /// Posts `body` to `url` and returns the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`HintError::Transport`] on network-level failure.
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<TransportResponse, HintError>;
}

/// Blocking `reqwest` transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Creates a transport with the given timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HintError::Transport`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> std::result::Result<Self, HintError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cluekit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HintError::Transport(format!("failed to build client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<TransportResponse, HintError> {
        debug!(url, "posting generation request");
        let response = self.client.post(url).json(body).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        debug!(status, len = body.len(), "generation response received");
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success() {
        let ok = TransportResponse {
            status: 200,
            body: String::new(),
        };
        assert!(ok.is_success());
        let not_found = TransportResponse {
            status: 404,
            body: String::new(),
        };
        assert!(!not_found.is_success());
    }

    #[test]
    fn test_http_transport_builds() {
        assert!(HttpTransport::new(DEFAULT_TIMEOUT).is_ok());
    }

    #[test]
    fn test_unreachable_endpoint_is_transport_error() {
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        let err = transport
            .post_json("http://127.0.0.1:1/v1/generate", &serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(err, HintError::Transport(_)));
    }
}
