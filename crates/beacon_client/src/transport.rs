//! Transport layer abstraction for manifest fetches.

use beacon_protocol::ConfigResponse;
use bytes::Bytes;
use parking_lot::Mutex;
use thiserror::Error;

/// Error returned by a transport implementation.
///
/// The client never retries these itself; retry and backoff policy belongs
/// to the external scheduler.
#[derive(Debug, Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Creates a transport error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The resumption cursor sent with every fetch.
///
/// Echoes the repository's current targets version and opaque backend
/// state so the backend may answer with a delta or a no-change response
/// keyed to what the client already has.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchRequest {
    /// The targets version the repository currently holds.
    pub targets_version: u64,
    /// The opaque backend cursor from the last successful sync.
    pub opaque_backend_state: Option<Bytes>,
}

/// A transport performs the fetch exchange with the configuration backend.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP agents, unix sockets, mocks for testing). The
/// fetch is blocking; timeouts are the implementation's responsibility.
pub trait ConfigTransport: Send + Sync {
    /// Fetches the current manifest, given the client's resumption cursor.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the exchange itself fails (the
    /// connection, not the response status: non-success statuses come back
    /// as a [`ConfigResponse`] carrying the code).
    fn fetch(&self, request: &FetchRequest) -> Result<ConfigResponse, TransportError>;
}

impl<T: ConfigTransport + ?Sized> ConfigTransport for std::sync::Arc<T> {
    fn fetch(&self, request: &FetchRequest) -> Result<ConfigResponse, TransportError> {
        (**self).fetch(request)
    }
}

/// A mock transport for testing.
///
/// Returns whatever response was last set, and records every request it
/// receives so tests can assert on the echoed cursor.
#[derive(Debug, Default)]
pub struct MockTransport {
    response: Mutex<Option<ConfigResponse>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl MockTransport {
    /// Creates a new mock transport with no response set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the response returned by subsequent fetches.
    pub fn set_response(&self, response: ConfigResponse) {
        *self.response.lock() = Some(response);
    }

    /// Returns every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }

    /// Returns the number of fetches performed.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl ConfigTransport for MockTransport {
    fn fetch(&self, request: &FetchRequest) -> Result<ConfigResponse, TransportError> {
        self.requests.lock().push(request.clone());
        self.response
            .lock()
            .clone()
            .ok_or_else(|| TransportError::new("no mock response set"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_set_response() {
        let transport = MockTransport::new();
        transport.set_response(ConfigResponse::error(401));

        let response = transport.fetch(&FetchRequest::default()).unwrap();
        assert_eq!(response.status, 401);
        assert_eq!(transport.fetch_count(), 1);
    }

    #[test]
    fn mock_without_response_fails() {
        let transport = MockTransport::new();
        assert!(transport.fetch(&FetchRequest::default()).is_err());
    }

    #[test]
    fn mock_records_requests() {
        let transport = MockTransport::new();
        transport.set_response(ConfigResponse::error(200));

        let request = FetchRequest {
            targets_version: 42,
            opaque_backend_state: Some(Bytes::from_static(b"cursor")),
        };
        let _ = transport.fetch(&request);

        let seen = transport.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].targets_version, 42);
    }
}
