use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProxyError {
    /// Missing or malformed configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Login call failed or returned no token. The cached token is left as is.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Upstream answered 401 again after one refresh-and-retry.
    #[error("upstream rejected the refreshed token (401 Unauthorized)")]
    UpstreamAuth,

    #[error("upstream request failed{}: {detail}", .status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    Upstream { status: Option<u16>, detail: String },

    /// Reference table could not be fetched. Swallowed by the reference cache.
    #[error("reference data unavailable: {0}")]
    ReferenceData(String),

    #[error("invalid orders payload: {0}")]
    Decode(String),

    /// Inbound query string that does not bind to the route parameters.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl ProxyError {
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Config(_) => "config",
            ProxyError::Auth(_) => "auth",
            ProxyError::UpstreamAuth => "upstream_auth",
            ProxyError::Upstream { .. } => "upstream",
            ProxyError::ReferenceData(_) => "reference_data",
            ProxyError::Decode(_) => "decode",
            ProxyError::InvalidQuery(_) => "invalid_query",
        }
    }

    pub fn upstream(status: Option<u16>, detail: impl Into<String>) -> Self {
        ProxyError::Upstream {
            status,
            detail: detail.into(),
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        let detail = if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            err.to_string()
        };
        ProxyError::upstream(err.status().map(|s| s.as_u16()), detail)
    }
}

/// Failure at the request boundary: a fixed route-level summary plus the cause.
#[derive(Debug)]
pub struct ApiError {
    pub error: &'static str,
    pub source: ProxyError,
}

impl ApiError {
    pub fn new(error: &'static str, source: ProxyError) -> Self {
        Self { error, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error,
            "message": self.source.to_string(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
