//! The rate provider: override-wins refresh and stale-on-error state.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::source::RateSource;

/// Observable provider state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RateState {
    /// UZS per 1 USD; `None` until the first successful refresh.
    pub rate: Option<f64>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Holds the current rate plus loading/error flags.
///
/// Refresh semantics:
/// - a manual override always wins and no fetch is performed;
/// - on fetch success the rate becomes the fetched value;
/// - on fetch failure `error` is set and `rate` keeps its previous value
///   (stale-or-none).
///
/// There is no caching across restarts: every process start without an
/// override re-fetches. A fetch superseded by a newer manual override is
/// simply ignored via the override-wins rule on the next refresh.
pub struct RateProvider {
    source: Arc<dyn RateSource>,
    state: RwLock<RateState>,
}

impl RateProvider {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self {
            source,
            state: RwLock::new(RateState::default()),
        }
    }

    pub async fn current(&self) -> RateState {
        self.state.read().await.clone()
    }

    /// The rate conversions should use right now: the manual override when
    /// present, otherwise the last fetched value.
    pub async fn effective_rate(&self, manual_override: Option<f64>) -> Option<f64> {
        match manual_override {
            Some(rate) => Some(rate),
            None => self.state.read().await.rate,
        }
    }

    /// Refresh the rate. With a manual override the stored rate is set to it
    /// directly; otherwise the remote source is queried.
    pub async fn refresh(&self, manual_override: Option<f64>) -> RateState {
        if let Some(rate) = manual_override {
            debug!(rate, "manual exchange-rate override in effect; skipping fetch");
            let mut state = self.state.write().await;
            state.rate = Some(rate);
            state.loading = false;
            state.error = None;
            return state.clone();
        }

        {
            let mut state = self.state.write().await;
            state.loading = true;
        }

        let fetched = self.source.fetch_usd_rate().await;

        let mut state = self.state.write().await;
        state.loading = false;
        match fetched {
            Ok(rate) => {
                state.rate = Some(rate);
                state.error = None;
            }
            Err(err) => {
                // Keep whatever rate we had; conversions without a rate are
                // excluded downstream rather than approximated.
                warn!(error = %err, "exchange-rate fetch failed");
                state.error = Some(err.to_string());
            }
        }
        state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::source::{RateError, StaticRateSource};

    struct CountingSource {
        calls: AtomicUsize,
        result: Result<f64, RateError>,
    }

    impl CountingSource {
        fn ok(rate: f64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Ok(rate),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Err(RateError::Http("connection refused".to_string())),
            }
        }
    }

    #[async_trait]
    impl RateSource for CountingSource {
        async fn fetch_usd_rate(&self) -> Result<f64, RateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn manual_override_wins_and_suppresses_fetch() {
        let source = Arc::new(CountingSource::ok(12_000.0));
        let provider = RateProvider::new(source.clone());

        let state = provider.refresh(Some(12_650.0)).await;

        assert_eq!(state.rate, Some(12_650.0));
        assert_eq!(state.error, None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_success_replaces_rate() {
        let provider = RateProvider::new(Arc::new(StaticRateSource(12_700.5)));

        let state = provider.refresh(None).await;

        assert_eq!(state.rate, Some(12_700.5));
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn fetch_failure_keeps_stale_rate_and_sets_error() {
        // Seed a rate via override, then let the next fetch fail.
        let provider = RateProvider::new(Arc::new(CountingSource::failing()));
        provider.refresh(Some(12_500.0)).await;

        let state = provider.refresh(None).await;

        assert_eq!(state.rate, Some(12_500.0), "stale rate preserved");
        assert!(state.error.as_deref().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn fetch_failure_with_no_prior_rate_stays_none() {
        let provider = RateProvider::new(Arc::new(CountingSource::failing()));

        let state = provider.refresh(None).await;

        assert_eq!(state.rate, None);
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn effective_rate_prefers_override() {
        let provider = RateProvider::new(Arc::new(StaticRateSource(12_000.0)));
        provider.refresh(None).await;

        assert_eq!(provider.effective_rate(Some(13_000.0)).await, Some(13_000.0));
        assert_eq!(provider.effective_rate(None).await, Some(12_000.0));
    }
}
