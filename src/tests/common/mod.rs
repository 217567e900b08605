// tests/common/mod.rs
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use httpmock::prelude::*;
use httpmock::Mock;
use reqwest::Client;
use serde_json::json;
use tokio::task::JoinHandle;

use crate::config::service::ServiceConfig;
use crate::config::settings::{LogFormat, LoggingConfig, MetricsConfig, ServerConfig, SettingsConfig};
use crate::config::upstream::UpstreamConfig;
use crate::observability::metrics::get_metrics;
use crate::server::server::{app, AppState};
use crate::sources::upstream::BoxleoClient;

pub const EMAIL: &str = "ops@example.com";
pub const PASSWORD: &str = "secret";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn service_config(base_url: &str) -> ServiceConfig {
    ServiceConfig {
        settings: SettingsConfig {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: "0".into(),
            },
            metrics: MetricsConfig::default(),
            logging: Some(LoggingConfig::new("debug".into(), LogFormat::Compact)),
            http_timeout_ms: Some(5_000),
        },
        upstream: UpstreamConfig {
            service: Some("boxleo".into()),
            base_url: base_url.to_owned(),
            login_url: None,
            email: EMAIL.into(),
            password: PASSWORD.into(),
            reference_ttl_seconds: Some(86_400),
        },
    }
}

pub fn boxleo_client(server: &MockServer) -> Arc<BoxleoClient> {
    let cfg = service_config(&server.base_url());
    Arc::new(BoxleoClient::from_config(&cfg).expect("client"))
}

/// Login endpoint answering every valid credential post with `token`.
pub async fn mock_login<'a>(server: &'a MockServer, token: &str) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/login")
                .json_body(json!({"email": EMAIL, "password": PASSWORD}));
            then.status(200).json_body(json!({"token": token}));
        })
        .await
}

/// Proxy app wired to the mock upstream, served on an ephemeral port.
pub async fn spawn_proxy(server: &MockServer) -> (JoinHandle<()>, SocketAddr) {
    spawn_proxy_with(service_config(&server.base_url())).await
}

pub async fn spawn_proxy_with(cfg: ServiceConfig) -> (JoinHandle<()>, SocketAddr) {
    let client = Arc::new(BoxleoClient::from_config(&cfg).expect("client"));
    let state = AppState::new(get_metrics().await, client, cfg.service_name());
    spawn_axum(app(state, &cfg.settings)).await
}
