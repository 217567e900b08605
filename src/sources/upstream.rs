use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::cache::reference_cache::{parse_cancellation_reasons, CancellationReasonsCache, ReasonMap};
use crate::cache::token_cache::TokenCache;
use crate::config::service::ServiceConfig;
use crate::error::ProxyError;
use crate::helpers::time::{get_instant, now_i64};
use crate::observability::metrics::get_metrics;
use crate::sources::login::LoginSource;
use crate::sources::orders::OrdersQuery;
use crate::utils::constants::*;

static ORDERS_ENDPOINT: &str = "orders";
static REASONS_ENDPOINT: &str = "cancellation_reasons";
static ERROR_MSG: &str = "error";

/// Authenticated client for the courier API.
///
/// Owns the token cache and the cancellation reasons cache; one instance is
/// shared by all request handlers.
pub struct BoxleoClient {
    client: Client,
    base_url: String,
    tokens: TokenCache,
    reasons: CancellationReasonsCache,
}

impl BoxleoClient {
    pub fn new(client: Client, service_config: &ServiceConfig) -> Self {
        let login = LoginSource::new(
            client.clone(),
            service_config.login_url(),
            service_config.upstream.credentials(),
        );
        Self {
            client,
            base_url: service_config.upstream.base_url.to_owned(),
            tokens: TokenCache::new(login),
            reasons: CancellationReasonsCache::new(service_config.reference_ttl_seconds()),
        }
    }

    pub fn from_config(service_config: &ServiceConfig) -> Result<Self, ProxyError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(service_config.settings.http_timeout_ms()))
            .build()
            .map_err(|e| ProxyError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::new(client, service_config))
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// One page of orders, body returned verbatim.
    pub async fn fetch_orders(&self, query: &OrdersQuery) -> Result<String, ProxyError> {
        let url = format!("{}{}", self.base_url, ORDERS_PATH);
        let params = query.to_params();
        self.send_authorized(ORDERS_ENDPOINT, |token| {
            self.client
                .get(&url)
                .query(&params)
                .header(ACCEPT, ACCEPT_VALUE)
                .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
                .header(AUTHORIZATION, bearer(token))
                .header(SELECTED_COUNTRY_HEADER, SELECTED_COUNTRY_VALUE)
                .header(SELECTED_WAREHOUSE_HEADER, SELECTED_WAREHOUSE_VALUE)
        })
        .await
    }

    /// Cached cancellation reasons; empty when they cannot be fetched.
    pub async fn get_cancellation_reasons(&self) -> Arc<ReasonMap> {
        self.reasons
            .get_or_fetch(now_i64(), || self.fetch_cancellation_reasons())
            .await
    }

    async fn fetch_cancellation_reasons(&self) -> Result<ReasonMap, ProxyError> {
        let url = format!("{}{}", self.base_url, CANCELLATION_REASONS_PATH);
        let body = self
            .send_authorized(REASONS_ENDPOINT, |token| {
                self.client
                    .get(&url)
                    .header(ACCEPT, ACCEPT_VALUE)
                    .header(AUTHORIZATION, bearer(token))
            })
            .await
            .map_err(|e| ProxyError::ReferenceData(e.to_string()))?;
        parse_cancellation_reasons(&body)
    }

    /// Sends the request built for the cached token. A 401 refreshes the
    /// token and retries exactly once; a second 401 is `UpstreamAuth`.
    async fn send_authorized<F>(&self, endpoint: &'static str, build: F) -> Result<String, ProxyError>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.tokens.get_token().await?;
        let mut response = self.execute(endpoint, build(&token.value)).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("{} returned 401, refreshing token and retrying", endpoint);
            get_metrics()
                .await
                .unauthorized_retries
                .with_label_values(&[endpoint])
                .inc();

            let fresh = self.tokens.invalidate_and_refresh(&token).await?;
            response = self.execute(endpoint, build(&fresh.value)).await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(ProxyError::UpstreamAuth);
            }
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::upstream(
                Some(status.as_u16()),
                format!("{} responded {}", endpoint, status),
            ));
        }
        Ok(response.text().await?)
    }

    async fn execute(&self, endpoint: &'static str, request: RequestBuilder) -> Result<Response, ProxyError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        let result = request.send().await;
        metrics
            .upstream_duration
            .with_label_values(&[endpoint])
            .observe(start.elapsed().as_secs_f64());

        match result {
            Ok(response) => {
                debug!("{} responded {}", endpoint, response.status());
                metrics
                    .upstream_requests
                    .with_label_values(&[endpoint, response.status().as_str()])
                    .inc();
                Ok(response)
            }
            Err(e) => {
                metrics
                    .upstream_requests
                    .with_label_values(&[endpoint, ERROR_MSG])
                    .inc();
                Err(ProxyError::from(e))
            }
        }
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
