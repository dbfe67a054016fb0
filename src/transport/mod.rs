//! Transport module
//!
//! The single network capability the engine needs: GET a url with an
//! `Authorization` header and hand back status and body. Production code uses
//! [`http::HttpTransport`]; tests script responses through `RecordingTransport`.

use ::http::StatusCode;

use crate::error::{body_excerpt, AuthError, ContactsError, FetchError, TransportError};

pub mod http;
#[cfg(test)]
pub mod recording;

pub use self::http::HttpTransport;

pub trait Transport {
    fn get(
        &self,
        url: &str,
        authorization: &str,
    ) -> impl std::future::Future<Output = Result<TransportResponse, TransportError>> + Send;
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    /// OK, Created and Found count as success; redirects are not followed.
    pub fn is_success(&self) -> bool {
        matches!(self.status, StatusCode::OK | StatusCode::CREATED | StatusCode::FOUND)
    }
}

/// Which side of the service a request went to; decides how a failure status is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// AuthSub token endpoints: every failure status is an authorization failure.
    Token,
    /// Feed pages and photos: only 401 is an authorization failure.
    Resource,
}

/// Turns a non-success response into the matching error.
pub fn ensure_success(
    kind: RequestKind,
    url: &str,
    response: TransportResponse,
) -> Result<TransportResponse, ContactsError> {
    if response.is_success() {
        return Ok(response);
    }
    let body = body_excerpt(&response.body);
    let status = response.status;
    match kind {
        RequestKind::Token => Err(AuthError::Rejected { endpoint: url.to_owned(), status, body }.into()),
        RequestKind::Resource if status == StatusCode::UNAUTHORIZED => {
            Err(AuthError::Rejected { endpoint: url.to_owned(), status, body }.into())
        }
        RequestKind::Resource => Err(FetchError::Status { url: url.to_owned(), status, body }.into()),
    }
}
