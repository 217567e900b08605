use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::error::{ApiError, ProxyError};
use crate::observability::metrics::get_metrics;
use crate::parser::csv::encode_csv;
use crate::parser::orders::flatten;
use crate::server::server::AppState;
use crate::sources::orders::OrdersQuery;
use crate::sources::upstream::BoxleoClient;
use crate::utils::constants::*;

static ORDERS_ROUTE: &str = "orders";
static CSV_ROUTE: &str = "orders_csv";
static ORDERS_FAILURE: &str = "Failed to fetch orders";
static CSV_FAILURE: &str = "Failed to fetch orders CSV";

#[derive(Clone)]
pub struct OrdersState {
    client: Arc<BoxleoClient>,
    service: String,
}

impl OrdersState {
    pub fn new(client: Arc<BoxleoClient>, service: &str) -> Self {
        Self {
            client,
            service: service.to_owned(),
        }
    }

    pub fn router(&self) -> Router<AppState> {
        let orders_path = format!("/api/{}/orders", self.service);
        let csv_path = format!("{}/csv", orders_path);
        info!("served paths: {}, {}", orders_path, csv_path);

        Router::new()
            .route(&orders_path, get(get_orders))
            .route(&csv_path, get(get_orders_csv))
    }
}

/// Inbound query; missing values take the upstream web client's defaults.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersParams {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    pub orders_type: Option<String>,
    pub is_marketplace: Option<String>,
    pub filter: Option<String>,
}

impl OrdersParams {
    pub fn into_query(self, default_per_page: i32) -> OrdersQuery {
        OrdersQuery {
            page: self.page.unwrap_or(DEFAULT_PAGE),
            per_page: self.per_page.unwrap_or(default_per_page),
            orders_type: self.orders_type.unwrap_or_else(|| DEFAULT_ORDERS_TYPE.to_owned()),
            is_marketplace: self
                .is_marketplace
                .unwrap_or_else(|| DEFAULT_IS_MARKETPLACE.to_owned()),
            filter: self.filter,
        }
    }
}

async fn get_orders(
    State(state): State<AppState>,
    params: Result<Query<OrdersParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = match params {
        Ok(Query(params)) => params.into_query(DEFAULT_PER_PAGE),
        Err(e) => return Err(failure(ORDERS_ROUTE, ORDERS_FAILURE, invalid_query(e)).await),
    };
    let body = match state.orders_state.client.fetch_orders(&query).await {
        Ok(body) => body,
        Err(e) => return Err(failure(ORDERS_ROUTE, ORDERS_FAILURE, e).await),
    };

    Ok(([(CONTENT_TYPE, "application/json")], body).into_response())
}

async fn get_orders_csv(
    State(state): State<AppState>,
    params: Result<Query<OrdersParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = match params {
        Ok(Query(params)) => params.into_query(DEFAULT_CSV_PER_PAGE),
        Err(e) => return Err(failure(CSV_ROUTE, CSV_FAILURE, invalid_query(e)).await),
    };
    let csv = match render_orders_csv(&state.orders_state.client, &query).await {
        Ok(csv) => csv,
        Err(e) => return Err(failure(CSV_ROUTE, CSV_FAILURE, e).await),
    };

    let disposition = format!("attachment; filename=\"{}\"", CSV_FILE_NAME);
    Ok((
        [(CONTENT_TYPE, "text/csv".to_owned()), (CONTENT_DISPOSITION, disposition)],
        csv,
    )
        .into_response())
}

async fn render_orders_csv(client: &BoxleoClient, query: &OrdersQuery) -> Result<String, ProxyError> {
    let orders_json = client.fetch_orders(query).await?;
    let reasons = client.get_cancellation_reasons().await;
    let records = flatten(&orders_json, &reasons)?;

    get_metrics().await.csv_rows.inc_by(records.len() as u64);
    info!("exporting {} order rows", records.len());
    Ok(encode_csv(&records))
}

fn invalid_query(rejection: QueryRejection) -> ProxyError {
    ProxyError::InvalidQuery(rejection.body_text())
}

async fn failure(route: &'static str, summary: &'static str, source: ProxyError) -> ApiError {
    error!("{}: {}", summary, source);
    get_metrics()
        .await
        .route_failures
        .with_label_values(&[route, source.kind()])
        .inc();
    ApiError::new(summary, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_fall_back_to_defaults() {
        let query = OrdersParams::default().into_query(DEFAULT_CSV_PER_PAGE);
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 5000);
        assert_eq!(query.orders_type, "leads");
        assert_eq!(query.is_marketplace, "all");
        assert_eq!(query.filter, None);
    }

    #[test]
    fn explicit_params_win() {
        let params = OrdersParams {
            page: Some(3),
            per_page: Some(50),
            orders_type: Some("orders".into()),
            is_marketplace: Some("0".into()),
            filter: Some("zambia".into()),
        };
        let query = params.into_query(DEFAULT_PER_PAGE);
        assert_eq!(query.page, 3);
        assert_eq!(query.per_page, 50);
        assert_eq!(query.orders_type, "orders");
        assert_eq!(query.is_marketplace, "0");
        assert_eq!(query.filter.as_deref(), Some("zambia"));
    }
}
