//! Scripted in-memory transport for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use http::StatusCode;

use crate::error::TransportError;
use crate::transport::{Transport, TransportResponse};

/// Request seen by a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub authorization: String,
}

/// Replays queued responses in order and records every request.
/// Runs out of responses -> `TransportError::Connection`.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        self.push(Ok(TransportResponse::new(status, body)));
        self
    }

    pub fn ok(self, body: impl Into<Vec<u8>>) -> Self {
        self.respond(StatusCode::OK, body)
    }

    pub fn fail(self, err: TransportError) -> Self {
        self.push(Err(err));
        self
    }

    fn push(&self, response: Result<TransportResponse, TransportError>) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

impl Transport for RecordingTransport {
    async fn get(&self, url: &str, authorization: &str) -> Result<TransportResponse, TransportError> {
        self.requests.lock().expect("requests lock").push(RecordedRequest {
            url: url.to_owned(),
            authorization: authorization.to_owned(),
        });
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection(format!("no scripted response for {}", url))))
    }
}
