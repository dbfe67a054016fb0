use crate::config::settings::{HttpConfig, LoggingConfig, PaginationConfig, ServiceConfig};

/// Fills every optional settings block with its default so later stages can rely on it.
pub fn initiate_default_values(mut config: ServiceConfig) -> ServiceConfig {
    let settings = &mut config.settings;
    if settings.service.is_none() {
        settings.service = Some(Default::default());
    }
    if settings.http.is_none() {
        settings.http = Some(HttpConfig::default());
    }
    if settings.pagination.is_none() {
        settings.pagination = Some(PaginationConfig::default());
    }
    if settings.logging.is_none() {
        settings.logging = Some(LoggingConfig::default());
    }
    if let Some(service) = settings.service.as_mut() {
        // trailing slashes would double up when endpoint paths are appended
        service.auth_base_url = service.auth_base_url.trim_end_matches('/').to_owned();
        service.feed_base_url = service.feed_base_url.trim_end_matches('/').to_owned();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{LogFormat, ServiceEndpointsConfig, SettingsConfig};

    #[test]
    fn empty_config_gets_defaults() {
        let config = initiate_default_values(ServiceConfig::default());
        let settings = &config.settings;
        assert_eq!(settings.service().auth_base_url, "https://www.google.com");
        assert_eq!(settings.service().feed_base_url, "http://www.google.com");
        assert_eq!(settings.timeout_ms(), 5000);
        assert_eq!(settings.max_pages(), None);
        assert_eq!(settings.logging.as_ref().unwrap().format, LogFormat::Compact);
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = ServiceConfig {
            settings: SettingsConfig {
                service: Some(ServiceEndpointsConfig {
                    auth_base_url: "http://127.0.0.1:8080/".into(),
                    feed_base_url: "http://127.0.0.1:8081//".into(),
                }),
                ..Default::default()
            },
        };
        let config = initiate_default_values(config);
        assert_eq!(config.settings.service().auth_base_url, "http://127.0.0.1:8080");
        assert_eq!(config.settings.service().feed_base_url, "http://127.0.0.1:8081");
    }
}
