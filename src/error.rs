//! Error taxonomy of the fetch engine.
//!
//! Every failure surfaces as one [`ContactsError`]; the only condition handled
//! locally is an entry without a primary email, which is skipped by the parser.

use http::StatusCode;
use thiserror::Error;

/// Upper bound for response bodies carried inside errors.
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum ContactsError {
    #[error("authorization failed: {0}")]
    Auth(#[from] AuthError),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("feed parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
}

impl ContactsError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ContactsError::Auth(_) => "auth",
            ContactsError::Fetch(_) => "fetch",
            ContactsError::Parse(_) => "parse",
            ContactsError::Transport(_) => "transport",
        }
    }
}

/// The remote service refused the credential, or the credential is unusable.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{endpoint} returned {status}: {body}")]
    Rejected {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    /// Session token response did not carry a `Token=` line.
    #[error("session token response from {endpoint} carries no Token= line")]
    MissingToken { endpoint: String },
    #[error("credential was revoked and cannot be exchanged again")]
    Revoked,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url} returned {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("contact has no photo link")]
    NoPhoto,
    #[error("feed still links a next page after {0} pages")]
    PageLimitExceeded(u32),
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("feed is missing required field '{0}'")]
    MissingFeedField(&'static str),
    #[error("entry #{index} is missing required field '{field}'")]
    MissingEntryField { index: usize, field: &'static str },
    #[error("document root is '{0}', expected an Atom feed")]
    UnexpectedRoot(String),
    #[error("malformed xml: {0}")]
    Xml(String),
}

/// Lower-level failure reported by a [`crate::transport::Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("could not read response body: {0}")]
    Body(String),
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Renders a response body for diagnostics, lossy and truncated.
pub(crate) fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut excerpt: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
    if text.chars().count() > MAX_ERROR_BODY_CHARS {
        excerpt.push_str("...");
    }
    excerpt.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_excerpt_truncates_long_bodies() {
        let body = "x".repeat(MAX_ERROR_BODY_CHARS + 10);
        let excerpt = body_excerpt(body.as_bytes());
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), MAX_ERROR_BODY_CHARS + 3);
    }

    #[test]
    fn kind_labels_follow_variant() {
        let err: ContactsError = FetchError::NoPhoto.into();
        assert_eq!(err.kind(), "fetch");
        let err: ContactsError = AuthError::Revoked.into();
        assert_eq!(err.kind(), "auth");
        let err: ContactsError = ParseError::MissingFeedField("id").into();
        assert_eq!(err.kind(), "parse");
    }
}
