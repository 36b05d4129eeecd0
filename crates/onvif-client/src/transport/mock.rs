//! Mock transport for unit and integration testing.
//!
//! Lets tests script a sequence of device responses and inspect every
//! request the session sent, without binding a socket.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{SoapResponse, Transport, TransportError};

/// A request recorded by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub body: String,
}

/// Scripted [`Transport`] implementation.
///
/// Responses are consumed in FIFO order, one per `post` call.  Posting with
/// an empty script returns [`TransportError::Unavailable`].
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<SoapResponse, String>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response with the given status and body.
    pub fn push_response(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .expect("lock poisoned")
            .push_back(Ok(SoapResponse {
                status,
                body: body.to_string(),
            }));
    }

    /// Queues a transport-level failure.
    pub fn push_error(&self, message: &str) {
        self.responses
            .lock()
            .expect("lock poisoned")
            .push_back(Err(message.to_string()));
    }

    /// All requests posted so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, url: &str, body: &str) -> Result<SoapResponse, TransportError> {
        self.requests
            .lock()
            .expect("lock poisoned")
            .push(RecordedRequest {
                url: url.to_string(),
                body: body.to_string(),
            });

        match self.responses.lock().expect("lock poisoned").pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::Unavailable(message)),
            None => Err(TransportError::Unavailable(
                "no scripted response left".to_string(),
            )),
        }
    }
}
