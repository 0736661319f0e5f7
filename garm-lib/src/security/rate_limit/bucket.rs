use std::time::{Duration, Instant};

use super::TierPolicy;

/// A single token bucket.
///
/// Tokens are refilled lazily on access: `tokens = min(capacity, tokens +
/// elapsed_seconds * refill_rate)`. Invariant: `0 <= tokens <= capacity`.
#[derive(Debug, Clone)]
pub(crate) struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64,
    last_refill: Instant,
    /// Last successful or attempted consume, used for idle GC.
    last_touched: Instant,
}

impl TokenBucket {
    pub(crate) fn from_policy(policy: TierPolicy, now: Instant) -> Self {
        Self::new(policy.capacity, policy.refill_per_second, policy.burst_allowance, now)
    }

    pub(crate) fn new(capacity: f64, refill_rate: f64, initial: f64, now: Instant) -> Self {
        Self {
            tokens: initial.clamp(0.0, capacity),
            capacity,
            refill_rate,
            last_refill: now,
            last_touched: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Consume `cost` tokens, or report how long until `cost` are available.
    pub(crate) fn try_consume(&mut self, cost: f64, now: Instant) -> Result<f64, Duration> {
        self.refill(now);
        self.last_touched = now;

        if self.tokens >= cost {
            self.tokens -= cost;
            Ok(self.tokens)
        } else {
            let deficit = cost - self.tokens;
            let secs = if self.refill_rate > 0.0 {
                (deficit / self.refill_rate).ceil()
            } else {
                // Zero refill never recovers; report a long but finite hint.
                u64::MAX as f64
            };
            Err(Duration::from_secs(secs as u64))
        }
    }

    /// Return previously consumed tokens (used when a later check in the
    /// admission chain denies the request). Clamped to capacity.
    pub(crate) fn credit(&mut self, amount: f64) {
        self.tokens = (self.tokens + amount).min(self.capacity);
    }

    pub(crate) fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_touched)
    }

    #[cfg(test)]
    pub(crate) fn tokens(&self) -> f64 {
        self.tokens
    }
}
