//! HTTP transport seam for the device session.
//!
//! The session core never touches sockets directly: it goes through the
//! [`Transport`] trait, which performs one POST and returns the raw status
//! and body.  Production code uses [`HttpTransport`] (reqwest); tests
//! substitute [`mock::MockTransport`] to script device responses without a
//! network.
//!
//! No retries and no status interpretation happen here: a non-success
//! status is returned to the caller as data, and it is the session layer
//! that decides whether that is fatal (it is, during bootstrap).

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub mod mock;

/// Errors raised by a transport implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The POST could not be performed (connection refused, DNS failure,
    /// invalid URL, timeout).
    #[error("POST to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client itself could not be constructed.
    #[error("failed to construct HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The response body could not be read.
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The transport is unavailable for a reason outside HTTP itself.
    /// Used by non-HTTP implementations such as the test mock.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Raw result of one SOAP POST, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl SoapResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One-shot SOAP POST transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `body` to `url` and returns the raw response.  One attempt,
    /// one result.
    async fn post(&self, url: &str, body: &str) -> Result<SoapResponse, TransportError>;
}

/// Per-request timeout applied when the caller does not configure one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Production transport backed by a reqwest client.  Cloning shares the
/// underlying connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the underlying HTTP client
    /// cannot be constructed (for example, TLS backend initialization
    /// failure).
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, body: &str) -> Result<SoapResponse, TransportError> {
        debug!(url = %url, bytes = body.len(), "sending SOAP request");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/soap+xml; charset=utf-8")
            .body(body.to_string())
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Body {
                url: url.to_string(),
                source,
            })?;

        debug!(url = %url, status, "received SOAP response");
        Ok(SoapResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_2xx_statuses_are_success() {
        let resp = SoapResponse {
            status: 200,
            body: String::new(),
        };
        assert!(resp.is_success());
        let resp = SoapResponse {
            status: 204,
            body: String::new(),
        };
        assert!(resp.is_success());
    }

    #[test]
    fn test_http_transport_builds_with_configured_timeout() {
        assert!(HttpTransport::new(Duration::from_secs(5)).is_ok());
        assert!(HttpTransport::new(DEFAULT_TIMEOUT).is_ok());
    }

    #[test]
    fn test_non_2xx_statuses_are_not_success() {
        for status in [199, 301, 400, 401, 500] {
            let resp = SoapResponse {
                status,
                body: String::new(),
            };
            assert!(!resp.is_success(), "status {status} should not be success");
        }
    }
}
