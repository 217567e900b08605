use serde::Deserialize;

use crate::config::{settings::SettingsConfig, upstream::UpstreamConfig};
use crate::utils::constants::{DEFAULT_REFERENCE_TTL_SECS, DEFAULT_SERVICE_NAME, LOGIN_PATH};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub upstream: UpstreamConfig,
}

impl ServiceConfig {
    pub fn service_name(&self) -> &str {
        self.upstream.service.as_deref().unwrap_or(DEFAULT_SERVICE_NAME)
    }

    pub fn login_url(&self) -> String {
        self.upstream
            .login_url
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.upstream.base_url, LOGIN_PATH))
    }

    pub fn reference_ttl_seconds(&self) -> u64 {
        self.upstream
            .reference_ttl_seconds
            .unwrap_or(DEFAULT_REFERENCE_TTL_SECS)
    }
}
