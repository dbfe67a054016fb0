use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

/// Lifecycle of the AuthSub credential.
///
/// `Unexchanged -> Active` on a successful session token exchange,
/// `Active -> Revoked` on a successful revoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// request-scoped token from the AuthSub redirect, not upgraded yet
    Unexchanged,
    /// session-scoped token
    Active,
    /// token was revoked; its value is kept but never sent for new work
    Revoked,
}

/// The credential used for every outbound request.
#[derive(Debug)]
pub struct Session {
    token: SecretString,
    state: SessionState,
}

impl Session {
    /// Token handed back by the AuthSub redirect, still to be exchanged.
    pub fn request_token(token: impl Into<String>) -> Self {
        Self::new(token, false)
    }

    /// Previously stored session token, usable as is.
    pub fn session_token(token: impl Into<String>) -> Self {
        Self::new(token, true)
    }

    pub fn new(token: impl Into<String>, is_session: bool) -> Self {
        let state = if is_session {
            SessionState::Active
        } else {
            SessionState::Unexchanged
        };
        Self {
            token: SecretString::from(token.into()),
            state,
        }
    }

    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_session(&self) -> bool {
        self.state == SessionState::Active
    }

    /// `AuthSub token="<credential>"`
    pub fn authorization_header_value(&self) -> String {
        format!("AuthSub token=\"{}\"", self.token.expose_secret())
    }

    pub(crate) fn upgrade(&mut self, token: String) {
        self.token = SecretString::from(token);
        self.state = SessionState::Active;
    }

    pub(crate) fn mark_revoked(&mut self) {
        self.state = SessionState::Revoked;
    }
}
