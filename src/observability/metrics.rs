use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process-wide `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Upstream metrics
    pub upstream_requests: IntCounterVec,
    pub upstream_duration: HistogramVec,
    pub unauthorized_retries: IntCounterVec,

    // Token metrics
    pub token_refreshes: IntCounterVec,
    pub token_generation: IntGauge,

    // Reference data metrics
    pub reference_cache_lookups: IntCounterVec,

    // Route metrics
    pub csv_rows: IntCounter,
    pub route_failures: IntCounterVec,

    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("boxleoproxy".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            upstream_requests: IntCounterVec::new(Opts::new("upstream_requests_total", "Upstream calls by endpoint and response status"),&["endpoint", "status"],).unwrap(),
            upstream_duration: HistogramVec::new(HistogramOpts::new("upstream_request_duration_seconds", "Upstream call duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),&["endpoint"],).unwrap(),
            unauthorized_retries: IntCounterVec::new(Opts::new("unauthorized_retries_total", "Requests retried after a 401"),&["endpoint"],).unwrap(),

            token_refreshes: IntCounterVec::new(Opts::new("token_refreshes_total", "Login calls by outcome"),&["outcome"],).unwrap(),
            token_generation: IntGauge::new("token_generation", "Generation of the cached bearer token").unwrap(),

            reference_cache_lookups: IntCounterVec::new(Opts::new("reference_cache_lookups_total", "Cancellation reason lookups by result"),&["result"],).unwrap(),

            csv_rows: IntCounter::new("csv_rows_total", "Rows written to CSV exports").unwrap(),
            route_failures: IntCounterVec::new(Opts::new("route_failures_total", "Inbound requests answered with 500"),&["route", "kind"],).unwrap(),

            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        let reg = &metrics.registry;
        reg.register(Box::new(metrics.upstream_requests.clone())).unwrap();
        reg.register(Box::new(metrics.upstream_duration.clone())).unwrap();
        reg.register(Box::new(metrics.unauthorized_retries.clone())).unwrap();
        reg.register(Box::new(metrics.token_refreshes.clone())).unwrap();
        reg.register(Box::new(metrics.token_generation.clone())).unwrap();
        reg.register(Box::new(metrics.reference_cache_lookups.clone())).unwrap();
        reg.register(Box::new(metrics.csv_rows.clone())).unwrap();
        reg.register(Box::new(metrics.route_failures.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
