use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_AUTH_BASE_URL, DEFAULT_FEED_BASE_URL, DEFAULT_HTTP_TIMEOUT_MS,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    pub service: Option<ServiceEndpointsConfig>,
    pub http: Option<HttpConfig>,
    pub pagination: Option<PaginationConfig>,
    pub logging: Option<LoggingConfig>,
    pub metrics: Option<MetricsConfig>,
}

/// Base urls of the AuthSub endpoints and of the contacts feed.
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceEndpointsConfig {
    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,
    #[serde(default = "default_feed_base_url")]
    pub feed_base_url: String,
}

impl Default for ServiceEndpointsConfig {
    fn default() -> Self {
        Self {
            auth_base_url: default_auth_base_url(),
            feed_base_url: default_feed_base_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_ms: default_timeout_ms() }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PaginationConfig {
    /// unset: follow `next` links until the feed stops sending them
    pub max_pages: Option<u32>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MetricsConfig {
    #[serde(default)]
    pub is_enabled: bool,
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info".to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

impl SettingsConfig {
    pub fn service(&self) -> ServiceEndpointsConfig {
        self.service.clone().unwrap_or_default()
    }

    pub fn timeout_ms(&self) -> u64 {
        self.http.as_ref().map(|h| h.timeout_ms).unwrap_or(DEFAULT_HTTP_TIMEOUT_MS)
    }

    pub fn max_pages(&self) -> Option<u32> {
        self.pagination.as_ref().and_then(|p| p.max_pages)
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics.as_ref().map(|m| m.is_enabled).unwrap_or(false)
    }
}

fn default_auth_base_url() -> String {
    DEFAULT_AUTH_BASE_URL.to_owned()
}

fn default_feed_base_url() -> String {
    DEFAULT_FEED_BASE_URL.to_owned()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}
