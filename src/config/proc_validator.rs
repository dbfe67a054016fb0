//! Configuration validation with aggregated errors.
//! - every issue is collected into one Vec<String>
//! - base urls must parse and use http/https
//! - http timeout and pagination guard must be positive
//! - logging level must be one tracing understands

use tracing::{error, info};
use url::Url;

use crate::config::settings::{ServiceConfig, SettingsConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(service) = &settings.service {
        validate_base_url("settings.service.auth_base_url", &service.auth_base_url, errors);
        validate_base_url("settings.service.feed_base_url", &service.feed_base_url, errors);
    }

    if let Some(http) = &settings.http {
        if http.timeout_ms == 0 {
            errors.push("settings.http.timeout_ms must be greater than 0".to_string());
        }
    }

    if let Some(0) = settings.max_pages() {
        errors.push("settings.pagination.max_pages must be at least 1 when set".to_string());
    }

    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_base_url(field: &str, value: &str, errors: &mut Vec<String>) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            if url.query().is_some() {
                errors.push(format!("{} '{}' must not carry a query string", field, value));
            }
        }
        Ok(url) => errors.push(format!(
            "{} '{}' has unsupported scheme '{}' (only http/https allowed)",
            field,
            value,
            url.scheme()
        )),
        Err(e) => errors.push(format!("{} '{}' is not a valid url: {}", field, value, e)),
    }
}
