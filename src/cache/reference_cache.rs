use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::ProxyError;
use crate::observability::metrics::get_metrics;

/// Cancellation reason id -> reason text.
pub type ReasonMap = HashMap<i64, String>;

#[derive(Debug, Clone)]
struct CachedReasons {
    reasons: Arc<ReasonMap>,
    expires_at_unix_ts: i64,
}

/// Cancellation reasons table, replaced whole once its TTL runs out.
///
/// Fetch failures degrade to an empty table and are not cached; a fresh table
/// stored meanwhile by a concurrent miss is kept and served instead. Concurrent
/// misses may each fetch.
#[derive(Debug)]
pub struct CancellationReasonsCache {
    inner: RwLock<Option<CachedReasons>>,
    ttl_seconds: u64,
}

impl CancellationReasonsCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            inner: RwLock::new(None),
            ttl_seconds,
        }
    }

    pub async fn get_or_fetch<F, Fut>(&self, now_unix_ts: i64, fetch: F) -> Arc<ReasonMap>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ReasonMap, ProxyError>>,
    {
        let metrics = get_metrics().await;
        let cached = self
            .inner
            .read()
            .await
            .as_ref()
            .filter(|cached| now_unix_ts < cached.expires_at_unix_ts)
            .map(|cached| cached.reasons.clone());
        if let Some(reasons) = cached {
            debug!("cancellation reasons cache hit");
            metrics.reference_cache_lookups.with_label_values(&["hit"]).inc();
            return reasons;
        }

        metrics.reference_cache_lookups.with_label_values(&["miss"]).inc();
        match fetch().await {
            Ok(reasons) => {
                let reasons = Arc::new(reasons);
                info!("cached {} cancellation reasons", reasons.len());
                let ttl = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
                *self.inner.write().await = Some(CachedReasons {
                    reasons: reasons.clone(),
                    expires_at_unix_ts: now_unix_ts.saturating_add(ttl),
                });
                reasons
            }
            Err(e) => {
                metrics.reference_cache_lookups.with_label_values(&["error"]).inc();
                warn!("Error fetching cancellation reasons, continuing without them: {}", e);
                let mut inner = self.inner.write().await;
                // stored by a concurrent lookup while this one was fetching
                if let Some(cached) = inner.as_ref().filter(|cached| now_unix_ts < cached.expires_at_unix_ts) {
                    return cached.reasons.clone();
                }
                // an expired table is dropped rather than served
                *inner = None;
                Arc::new(ReasonMap::new())
            }
        }
    }
}

/// Parses `[{"id": 1, "reason": "..."}, ...]`.
///
/// Entries without a numeric `id` or without a `reason` are skipped; a null
/// reason maps to an empty string.
pub fn parse_cancellation_reasons(body: &str) -> Result<ReasonMap, ProxyError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| ProxyError::ReferenceData(format!("invalid cancellation reasons payload: {e}")))?;
    let entries = root.as_array().ok_or_else(|| {
        ProxyError::ReferenceData("cancellation reasons payload is not an array".to_owned())
    })?;

    let mut reasons = ReasonMap::with_capacity(entries.len());
    for entry in entries {
        let id = entry.get("id").and_then(Value::as_i64);
        let reason = match entry.get("reason") {
            Some(Value::String(reason)) => Some(reason.to_owned()),
            Some(Value::Null) => Some(String::new()),
            _ => None,
        };
        if let (Some(id), Some(reason)) = (id, reason) {
            reasons.insert(id, reason);
        }
    }
    Ok(reasons)
}
