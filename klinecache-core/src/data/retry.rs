//! Retry decorator for kline providers.
//!
//! Providers never retry on their own. Callers that want a retry policy wrap
//! one in [`RetryingProvider`]; only transient [`DataError::Fetch`] failures
//! are repeated.

use super::provider::{DataError, KlineProvider, PageRequest};
use crate::domain::PricePoint;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure. Zero disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry number `retry` (1-based): `base_delay × 2^(retry−1)`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exp)
    }
}

/// Wraps a provider and repeats failed fetches according to a [`RetryPolicy`].
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: KlineProvider> RetryingProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: KlineProvider> KlineProvider for RetryingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch_page(&self, request: &PageRequest) -> Result<Vec<PricePoint>, DataError> {
        let mut retry = 0;
        loop {
            match self.inner.fetch_page(request) {
                Err(e) if e.is_retryable() && retry < self.policy.max_retries => {
                    retry += 1;
                    let delay = self.policy.delay_for(retry);
                    warn!(
                        pair = %request.pair,
                        start = %request.start,
                        end = %request.end,
                        retry,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "fetch failed, retrying"
                    );
                    std::thread::sleep(delay);
                }
                other => return other,
            }
        }
    }
}
