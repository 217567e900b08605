//! Configuration validation with aggregated errors.
//! Every issue is collected so a single startup failure reports all of them.

use tracing::info;

use crate::config::service::ServiceConfig;
use crate::config::settings::SettingsConfig;
use crate::config::upstream::UpstreamConfig;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_upstream(&cfg.upstream, &mut errors);

    if errors.is_empty() {
        info!("config validated");
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be a valid port number",
            settings.server.port
        ));
    }

    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }

    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }

    if settings.http_timeout_ms == Some(0) {
        errors.push("settings.http_timeout_ms must be greater than 0".to_string());
    }
}

fn validate_upstream(upstream: &UpstreamConfig, errors: &mut Vec<String>) {
    validate_url("upstream.base_url", &upstream.base_url, errors);
    if let Some(login_url) = &upstream.login_url {
        validate_url("upstream.login_url", login_url, errors);
    }

    if upstream.email.trim().is_empty() {
        errors.push("upstream.email is required".to_string());
    }
    if upstream.password.trim().is_empty() {
        errors.push("upstream.password is required".to_string());
    }

    if let Some(service) = &upstream.service {
        if service.is_empty() || service.contains('/') {
            errors.push(format!(
                "upstream.service '{}' must be a single path segment",
                service
            ));
        }
    }

    if upstream.reference_ttl_seconds == Some(0) {
        errors.push("upstream.reference_ttl_seconds must be greater than 0".to_string());
    }
}

fn validate_url(field: &str, value: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("{} is required", field));
    } else if !(value.starts_with("http://") || value.starts_with("https://")) {
        errors.push(format!(
            "{} '{}' must start with http:// or https://",
            field, value
        ));
    }
}
