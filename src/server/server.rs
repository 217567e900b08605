use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::service::ServiceConfig;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::orders::OrdersState;
use crate::sources::upstream::BoxleoClient;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub orders_state: OrdersState,
}

impl AppState {
    pub fn new(metrics: &Metrics, client: Arc<BoxleoClient>, service: &str) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            orders_state: OrdersState::new(client, service),
        }
    }
}

/// Full application router: order routes, optional metrics, permissive CORS
/// for the browser front-end.
pub fn app(state: AppState, settings_config: &SettingsConfig) -> Router {
    Router::new()
        .merge(state.metrics_state.router(&settings_config.metrics))
        .merge(state.orders_state.router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured address and serve until ctrl-c.
pub async fn start(service_config: &ServiceConfig, client: Arc<BoxleoClient>) -> Result<()> {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, client, service_config.service_name());
    let app = app(state, &service_config.settings);

    let server = &service_config.settings.server;
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", server.host, server.port)).await?;
    info!("listening on {}", listener.local_addr()?);
    metrics.up.set(1);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    metrics.up.set(0);
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
