//! Configuration for the rasterization client and batch orchestrator.

use std::time::Duration;

/// Per-label retry policy.
///
/// Rate limits (429) back off exponentially from `rate_limit_base`,
/// doubling per attempt up to `rate_limit_cap` — hammering a throttled
/// endpoint just extends the throttle. Other transient failures wait
/// `transient_step × attempt`, a gentler linear ramp.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts per label, first try included.
    pub max_attempts: u32,
    pub rate_limit_base: Duration,
    pub rate_limit_cap: Duration,
    pub transient_step: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            rate_limit_base: Duration::from_millis(1500),
            rate_limit_cap: Duration::from_secs(12),
            transient_step: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based) for a rate limit,
    /// unless the server's Retry-After overrides it: 1.5s, 3s, 6s, 12s, …
    /// capped.
    pub(crate) fn rate_limit_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.rate_limit_base
            .saturating_mul(factor)
            .min(self.rate_limit_cap)
    }

    /// Delay before retry number `attempt` (1-based) for other transient
    /// failures: attempt × step.
    pub(crate) fn transient_delay(&self, attempt: u32) -> Duration {
        self.transient_step.saturating_mul(attempt)
    }
}

/// HTTP client settings for the rendering endpoint.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the label rendering endpoint.
    pub endpoint: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub retry: RetryConfig,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("labelraster/", env!("CARGO_PKG_VERSION")).to_string(),
            retry: RetryConfig::default(),
        }
    }
}

/// Batch orchestration settings. One struct covers both conversion modes;
/// the modes differ only in numbers, not in shape.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Semaphore permits: the cap on in-flight rasterization calls.
    pub concurrency: usize,
    /// Pause between the parallel first pass and the sequential retry
    /// pass, letting upstream rate limits clear.
    pub cooldown: Duration,
    /// Largest accepted batch.
    pub max_batch: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl BatchConfig {
    /// Standard conversion mode.
    pub fn standard() -> Self {
        Self {
            concurrency: 4,
            cooldown: Duration::from_millis(2500),
            max_batch: 20,
        }
    }

    /// High-density mode: larger renders upstream, so fewer in flight and
    /// a longer cooldown.
    pub fn high_density() -> Self {
        Self {
            concurrency: 2,
            cooldown: Duration::from_secs(3),
            max_batch: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_schedule_doubles_and_caps() {
        let retry = RetryConfig::default();
        assert_eq!(retry.rate_limit_delay(1), Duration::from_millis(1500));
        assert_eq!(retry.rate_limit_delay(2), Duration::from_millis(3000));
        assert_eq!(retry.rate_limit_delay(3), Duration::from_millis(6000));
        assert_eq!(retry.rate_limit_delay(4), Duration::from_secs(12));
        assert_eq!(retry.rate_limit_delay(10), Duration::from_secs(12));
    }

    #[test]
    fn transient_schedule_is_linear() {
        let retry = RetryConfig::default();
        assert_eq!(retry.transient_delay(1), Duration::from_secs(1));
        assert_eq!(retry.transient_delay(3), Duration::from_secs(3));
    }
}
