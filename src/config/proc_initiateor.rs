use crate::config::service::ServiceConfig;
use crate::config::settings::{LogFormat, LoggingConfig};
use crate::utils::constants::{DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_REFERENCE_TTL_SECS, DEFAULT_SERVICE_NAME};

pub fn initiate_default_values(mut config: ServiceConfig) -> ServiceConfig {
    let settings = &mut config.settings;
    if settings.logging.is_none() {
        settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }
    if settings.http_timeout_ms.is_none() {
        settings.http_timeout_ms = Some(DEFAULT_HTTP_TIMEOUT_MS);
    }

    let upstream = &mut config.upstream;
    // trailing slash would double up with the `/api/...` paths
    upstream.base_url = upstream.base_url.trim().trim_end_matches('/').to_owned();
    upstream.service = Some(
        upstream
            .service
            .take()
            .map(|s| s.trim().trim_matches('/').to_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_owned()),
    );
    // `${BOXLEO_LOGIN_URL:}` expands to an empty string when unset
    upstream.login_url = upstream
        .login_url
        .take()
        .map(|u| u.trim().to_owned())
        .filter(|u| !u.is_empty());
    if upstream.reference_ttl_seconds.is_none() {
        upstream.reference_ttl_seconds = Some(DEFAULT_REFERENCE_TTL_SECS);
    }

    config
}
