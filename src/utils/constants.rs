//! Shared constants and defaults

pub const DEFAULT_CONFIG_PATH: &str = "contacts-agent.yaml";

pub const DEFAULT_AUTH_BASE_URL: &str = "https://www.google.com";
pub const DEFAULT_FEED_BASE_URL: &str = "http://www.google.com";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;

pub const DEFAULT_LOG_LEVEL: &str = "info";
