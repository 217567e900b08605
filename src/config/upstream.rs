use serde::Deserialize;

/// ================================
/// Upstream courier API
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// path segment of the inbound routes: `/api/<service>/orders`
    pub service: Option<String>,
    pub base_url: String,
    /// defaults to `<base_url>/api/login`
    pub login_url: Option<String>,
    pub email: String,
    pub password: String,
    /// lifetime of the cancellation reasons table
    pub reference_ttl_seconds: Option<u64>,
}

/// Login credentials posted to the auth endpoint.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl UpstreamConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.to_owned(),
            password: self.password.to_owned(),
        }
    }
}
