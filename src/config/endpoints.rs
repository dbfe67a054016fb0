use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::config::settings::ServiceEndpointsConfig;
use crate::error::FetchError;
use crate::utils::constants::{DEFAULT_AUTH_BASE_URL, DEFAULT_FEED_BASE_URL};

/// Resolved base urls of the AuthSub and contacts feed endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    auth_base: String,
    feed_base: String,
}

impl Endpoints {
    pub fn new(auth_base: impl Into<String>, feed_base: impl Into<String>) -> Self {
        Self {
            auth_base: auth_base.into().trim_end_matches('/').to_owned(),
            feed_base: feed_base.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn from_config(config: &ServiceEndpointsConfig) -> Self {
        Self::new(config.auth_base_url.as_str(), config.feed_base_url.as_str())
    }

    pub fn auth_request_url(&self) -> String {
        format!("{}/accounts/AuthSubRequest", self.auth_base)
    }

    pub fn session_token_url(&self) -> String {
        format!("{}/accounts/AuthSubSessionToken", self.auth_base)
    }

    pub fn revoke_token_url(&self) -> String {
        format!("{}/accounts/AuthSubRevokeToken", self.auth_base)
    }

    /// First page of the contacts feed for `account`, the address url-encoded.
    pub fn contacts_feed_url(&self, account: &str) -> Result<Url, FetchError> {
        let encoded: String = byte_serialize(account.as_bytes()).collect();
        let raw = format!("{}/m8/feeds/contacts/{}/full", self.feed_base, encoded);
        Url::parse(&raw).map_err(|e| FetchError::InvalidUrl { url: raw, reason: e.to_string() })
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_AUTH_BASE_URL, DEFAULT_FEED_BASE_URL)
    }
}
