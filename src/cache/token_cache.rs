use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

use crate::cache::token::Token;
use crate::error::ProxyError;
use crate::observability::metrics::get_metrics;
use crate::sources::login::{FetchToken, LoginSource};

/// Process-wide bearer token with single-flight refresh.
///
/// Refreshes are serialized by `refresh_lock`. A caller hands in the token it
/// last observed; once it holds the lock, a generation that moved on means
/// somebody else already logged in and the fresh token is returned as is.
pub struct TokenCache<L = LoginSource> {
    current: RwLock<Token>,
    refresh_lock: Mutex<()>,
    login: L,
}

impl<L: FetchToken + Send + Sync> TokenCache<L> {
    pub fn new(login: L) -> Self {
        Self {
            current: RwLock::new(Token::empty()),
            refresh_lock: Mutex::new(()),
            login,
        }
    }

    /// Cached token, logging in first when nothing is cached yet.
    pub async fn get_token(&self) -> Result<Token, ProxyError> {
        let observed = self.current.read().await.clone();
        if observed.is_present() {
            debug!(generation = observed.generation, "token cache hit");
            return Ok(observed);
        }
        self.invalidate_and_refresh(&observed).await
    }

    /// Replace `stale` with a freshly issued token.
    ///
    /// Concurrent callers holding the same stale token share one login call.
    /// On failure the previously cached token stays in place.
    pub async fn invalidate_and_refresh(&self, stale: &Token) -> Result<Token, ProxyError> {
        let _guard = self.refresh_lock.lock().await;

        {
            let current = self.current.read().await;
            if current.generation != stale.generation {
                debug!(
                    observed = stale.generation,
                    current = current.generation,
                    "token already refreshed by another request"
                );
                return Ok(current.clone());
            }
        }

        let metrics = get_metrics().await;
        info!("Refreshing authentication token");
        match self.login.fetch_token().await {
            Ok(value) => {
                let mut current = self.current.write().await;
                let generation = current.generation + 1;
                *current = Token::new(value, generation);
                metrics.token_refreshes.with_label_values(&["success"]).inc();
                metrics.token_generation.set(current.generation as i64);
                info!(generation = current.generation, "Successfully refreshed token");
                Ok(current.clone())
            }
            Err(e) => {
                metrics.token_refreshes.with_label_values(&["failure"]).inc();
                error!("Error refreshing authentication token: {}", e);
                Err(e)
            }
        }
    }

    /// Currently cached token, if any, without triggering a login.
    pub async fn current(&self) -> Option<Token> {
        let current = self.current.read().await;
        current.is_present().then(|| current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Issues `token-1`, `token-2`, ... and fails once `fail_from` logins happened.
    struct CountingLogin {
        calls: AtomicUsize,
        fail_from: usize,
    }

    impl CountingLogin {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0), fail_from: usize::MAX }
        }

        fn failing_after(fail_from: usize) -> Self {
            Self { calls: AtomicUsize::new(0), fail_from }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl FetchToken for CountingLogin {
        async fn fetch_token(&self) -> Result<String, ProxyError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(Duration::from_millis(50)).await;
            if n > self.fail_from {
                return Err(ProxyError::Auth("login rejected".into()));
            }
            Ok(format!("token-{n}"))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_access_logs_in_once() {
        let cache = Arc::new(TokenCache::new(CountingLogin::new()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_token().await })
            })
            .collect();

        for handle in handles {
            let token = handle.await.unwrap().unwrap();
            assert_eq!(token.value, "token-1");
            assert_eq!(token.generation, 1);
        }
        assert_eq!(cache.login.calls(), 1);

        // cached from now on
        let token = cache.get_token().await.unwrap();
        assert_eq!(token.value, "token-1");
        assert_eq!(cache.login.calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_refreshes_of_same_stale_token_share_one_login() {
        let cache = Arc::new(TokenCache::new(CountingLogin::new()));
        let stale = cache.get_token().await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let stale = stale.clone();
                tokio::spawn(async move { cache.invalidate_and_refresh(&stale).await })
            })
            .collect();

        for handle in handles {
            let token = handle.await.unwrap().unwrap();
            assert_eq!(token.value, "token-2");
            assert_eq!(token.generation, 2);
        }
        assert_eq!(cache.login.calls(), 2);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_token() {
        let cache = TokenCache::new(CountingLogin::failing_after(1));
        let first = cache.get_token().await.unwrap();

        let err = cache.invalidate_and_refresh(&first).await.unwrap_err();
        assert!(matches!(err, ProxyError::Auth(_)));

        let current = cache.current().await.unwrap();
        assert_eq!(current, first);
    }

    #[tokio::test]
    async fn failed_first_login_leaves_cache_empty() {
        let cache = TokenCache::new(CountingLogin::failing_after(0));

        assert!(cache.get_token().await.is_err());
        assert!(cache.current().await.is_none());

        // next access tries again
        assert!(cache.get_token().await.is_err());
        assert_eq!(cache.login.calls(), 2);
    }
}
