use tracing::{debug, info, warn};

use crate::auth::authsub_url::build_authorization_url;
use crate::auth::session::{Session, SessionState};
use crate::config::endpoints::Endpoints;
use crate::error::{AuthError, ContactsError};
use crate::observability::metrics::get_metrics;
use crate::transport::{ensure_success, RequestKind, Transport};

static EXCHANGE_OP: &str = "exchange";
static REVOKE_OP: &str = "revoke";

/// Owns the AuthSub credential for one fetch session.
#[derive(Debug)]
pub struct TokenManager {
    session: Session,
    endpoints: Endpoints,
}

impl TokenManager {
    pub fn new(session: Session, endpoints: Endpoints) -> Self {
        Self { session, endpoints }
    }

    pub fn authorization_url(
        &self,
        next_url: &str,
        secure: bool,
        session: bool,
        domain: Option<&str>,
    ) -> String {
        build_authorization_url(&self.endpoints, next_url, secure, session, domain)
    }

    /// Header value for the current credential, including after an upgrade.
    pub fn authorization_header_value(&self) -> String {
        self.session.authorization_header_value()
    }

    /// Current credential. Changes once a request token is upgraded, so
    /// callers wanting to store the session token read it after a fetch.
    pub fn token(&self) -> &str {
        self.session.token()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_session(&self) -> bool {
        self.session.is_session()
    }

    /// Upgrades a request token to a session token.
    ///
    /// No request is made when the credential is already session-scoped.
    pub async fn ensure_session<T: Transport>(&mut self, transport: &T) -> Result<(), ContactsError> {
        match self.session.state() {
            SessionState::Active => {
                debug!("session token already active, exchange skipped");
                return Ok(());
            }
            SessionState::Revoked => return Err(AuthError::Revoked.into()),
            SessionState::Unexchanged => {}
        }

        let metrics = get_metrics();
        let url = self.endpoints.session_token_url();
        info!("exchanging request token for a session token");

        let result = self.exchange(transport, &url).await;
        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics.token_operations.with_label_values(&[EXCHANGE_OP, outcome]).inc();

        let token = result?;
        self.session.upgrade(token);
        info!("session token acquired");
        Ok(())
    }

    async fn exchange<T: Transport>(&self, transport: &T, url: &str) -> Result<String, ContactsError> {
        let response = transport.get(url, &self.authorization_header_value()).await?;
        let response = ensure_success(RequestKind::Token, url, response)?;
        let body = String::from_utf8_lossy(&response.body);
        parse_session_token(&body)
            .ok_or_else(|| AuthError::MissingToken { endpoint: url.to_owned() }.into())
    }

    /// Revokes the credential.
    ///
    /// Sends the request in any state, including before an exchange; callers
    /// that only want to release an active session check [`Self::is_session`] first.
    pub async fn revoke<T: Transport>(&mut self, transport: &T) -> Result<(), ContactsError> {
        if self.session.state() == SessionState::Unexchanged {
            warn!("revoking a token that was never exchanged for a session token");
        }
        let metrics = get_metrics();
        let url = self.endpoints.revoke_token_url();

        let result = match transport.get(&url, &self.authorization_header_value()).await {
            Ok(response) => ensure_success(RequestKind::Token, &url, response).map(|_| ()),
            Err(err) => Err(err.into()),
        };
        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics.token_operations.with_label_values(&[REVOKE_OP, outcome]).inc();

        result?;
        self.session.mark_revoked();
        info!("token revoked");
        Ok(())
    }
}

/// Value of the first `Token=` line of a session token response.
fn parse_session_token(body: &str) -> Option<String> {
    body.lines()
        .find_map(|line| line.strip_prefix("Token="))
        .map(|token| token.trim_end().to_owned())
}
