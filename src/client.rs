//! Fetch facade: one client per credential, tying the token lifecycle, the
//! page walk and the parser together.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Result as AnyResult;
use tracing::{error, info, warn};

use crate::auth::{Session, SessionState, TokenManager};
use crate::config::endpoints::Endpoints;
use crate::config::settings::ServiceConfig;
use crate::contacts::{ContactList, PhotoRef};
use crate::error::{AuthError, ContactsError};
use crate::feed::{FeedParser, PageWalker};
use crate::observability::metrics::get_metrics;
use crate::transport::{ensure_success, HttpTransport, RequestKind, Transport};

/// Work run by [`ContactsClient::fetch_contacts_with`] while the session is still valid.
pub type SessionWork<'c> = Pin<Box<dyn Future<Output = Result<(), ContactsError>> + 'c>>;

pub struct ContactsClient<T: Transport> {
    transport: T,
    endpoints: Endpoints,
    tokens: TokenManager,
    max_pages: Option<u32>,
}

impl ContactsClient<HttpTransport> {
    /// Client talking to the endpoints and timeout named in `config`.
    pub fn from_config(config: &ServiceConfig, session: Session) -> AnyResult<Self> {
        let settings = &config.settings;
        let transport = HttpTransport::new(Duration::from_millis(settings.timeout_ms()))?;
        let endpoints = Endpoints::from_config(&settings.service());
        Ok(Self::new(transport, endpoints, session).with_max_pages(settings.max_pages()))
    }
}

impl<T: Transport> ContactsClient<T> {
    pub fn new(transport: T, endpoints: Endpoints, session: Session) -> Self {
        let tokens = TokenManager::new(session, endpoints.clone());
        Self {
            transport,
            endpoints,
            tokens,
            max_pages: None,
        }
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// AuthSubRequest url the user visits to grant access.
    pub fn authorization_url(
        &self,
        next_url: &str,
        secure: bool,
        session: bool,
        domain: Option<&str>,
    ) -> String {
        self.tokens.authorization_url(next_url, secure, session, domain)
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Appends every contact of `account` to `contacts` and returns how many
    /// this call added.
    ///
    /// With `revoke_after`, an active session is revoked once the walk is
    /// over, whether it succeeded or not. On failure `contacts` keeps what the
    /// pages before the failing one produced.
    pub async fn fetch_contacts(
        &mut self,
        account: &str,
        revoke_after: bool,
        contacts: &mut ContactList,
    ) -> Result<usize, ContactsError> {
        self.fetch_contacts_with(account, revoke_after, contacts, |_, _| {
            Box::pin(async { Ok::<(), ContactsError>(()) })
        })
        .await
    }

    /// Like [`Self::fetch_contacts`], running `work` after a successful walk
    /// and before the revoke, so requests it makes (photos, say) still carry
    /// a live session token. A failure in `work` fails the fetch.
    pub async fn fetch_contacts_with<F>(
        &mut self,
        account: &str,
        revoke_after: bool,
        contacts: &mut ContactList,
        work: F,
    ) -> Result<usize, ContactsError>
    where
        F: for<'c> FnOnce(&'c Self, &'c ContactList) -> SessionWork<'c>,
    {
        info!("fetching contacts of {}", account);
        let fetched = match self.walk_feed(account, contacts).await {
            Ok(count) => work(&*self, &*contacts).await.map(|()| count),
            Err(e) => Err(e),
        };

        let result = if revoke_after && self.tokens.is_session() {
            match (fetched, self.revoke().await) {
                (Ok(count), Ok(())) => Ok(count),
                (Ok(_), Err(revoke_err)) => Err(revoke_err),
                (Err(fetch_err), Err(revoke_err)) => {
                    warn!("token revoke after failed fetch also failed: {}", revoke_err);
                    Err(fetch_err)
                }
                (Err(fetch_err), Ok(())) => Err(fetch_err),
            }
        } else {
            fetched
        };

        match &result {
            Ok(count) => info!("fetched {} contacts of {}", count, account),
            Err(e) => {
                get_metrics().fetch_failures.with_label_values(&[e.kind()]).inc();
                error!("fetching contacts of {} failed: {}", account, e);
            }
        }
        result
    }

    /// Fetches several accounts into one list under a single session.
    ///
    /// With `revoke_after` the session is revoked once, after the last
    /// account, or right after the first account that fails.
    pub async fn fetch_accounts<S: AsRef<str>>(
        &mut self,
        accounts: &[S],
        revoke_after: bool,
        contacts: &mut ContactList,
    ) -> Result<usize, ContactsError> {
        let mut total = 0;
        for (i, account) in accounts.iter().enumerate() {
            let last = i + 1 == accounts.len();
            match self.fetch_contacts(account.as_ref(), revoke_after && last, contacts).await {
                Ok(count) => total += count,
                Err(e) => {
                    if revoke_after && !last && self.tokens.is_session() {
                        if let Err(revoke_err) = self.revoke().await {
                            warn!("token revoke after failed fetch also failed: {}", revoke_err);
                        }
                    }
                    return Err(e);
                }
            }
        }
        Ok(total)
    }

    /// Revokes the credential, see [`TokenManager::revoke`].
    pub async fn revoke(&mut self) -> Result<(), ContactsError> {
        self.tokens.revoke(&self.transport).await
    }

    async fn walk_feed(&mut self, account: &str, contacts: &mut ContactList) -> Result<usize, ContactsError> {
        self.tokens.ensure_session(&self.transport).await?;

        let start_url = self.endpoints.contacts_feed_url(account)?;
        let mut parser = FeedParser::new(contacts);
        let pages = PageWalker::new(&self.transport, self.tokens.authorization_header_value())
            .with_max_pages(self.max_pages)
            .walk(start_url, &mut parser)
            .await?;

        info!("{} pages parsed, {} entries without primary email skipped", pages, parser.skipped());
        Ok(parser.appended())
    }

    /// Raw photo bytes. Fails before any request when the contact has no
    /// photo link or the token was revoked.
    pub async fn fetch_photo(&self, photo: PhotoRef<'_>) -> Result<Vec<u8>, ContactsError> {
        let url = photo.resolve()?;
        if self.tokens.state() == SessionState::Revoked {
            return Err(AuthError::Revoked.into());
        }
        let metrics = get_metrics();

        let result = match self.transport.get(url, &self.tokens.authorization_header_value()).await {
            Ok(response) => ensure_success(RequestKind::Resource, url, response).map(|r| r.body),
            Err(err) => Err(err.into()),
        };
        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics.photo_fetches.with_label_values(&[outcome]).inc();

        match &result {
            Ok(bytes) => info!("photo fetched, {} bytes", bytes.len()),
            Err(e) => warn!("photo fetch from {} failed: {}", url, e),
        }
        result
    }
}
