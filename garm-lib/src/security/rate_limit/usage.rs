//! Append-only usage log for rate-limit analytics.

use ahash::AHashSet;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// One recorded consumption event.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub key_id: String,
    pub timestamp: SystemTime,
    pub tokens_consumed: f64,
}

/// Aggregate view handed to the observability sink.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UsageSummary {
    pub total_requests: u64,
    pub total_tokens: f64,
    pub unique_keys: u64,
}

/// Append-only log of token consumption, pruned on a fixed interval.
///
/// Writes only push; retention cleanup happens in [`Self::prune`], which the
/// maintenance loop calls periodically. Running cleanup per write would scan
/// the log on every request, so it is deliberately kept off the hot path.
#[derive(Debug, Default)]
pub struct UsageLog {
    records: Mutex<Vec<UsageRecord>>,
}

impl UsageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, key_id: &str, tokens_consumed: f64) {
        if let Ok(mut records) = self.records.lock() {
            records.push(UsageRecord {
                key_id: key_id.to_string(),
                timestamp: SystemTime::now(),
                tokens_consumed,
            });
        }
    }

    /// Drop records older than `retention`. Returns how many were removed.
    pub fn prune(&self, retention: Duration) -> usize {
        let cutoff = SystemTime::now().checked_sub(retention);
        let Some(cutoff) = cutoff else { return 0 };

        match self.records.lock() {
            Ok(mut records) => {
                let before = records.len();
                records.retain(|r| r.timestamp >= cutoff);
                let removed = before - records.len();
                if removed > 0 {
                    tracing::debug!(removed, "pruned expired usage records");
                }
                removed
            }
            Err(_) => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current records, newest last.
    pub fn snapshot(&self) -> Vec<UsageRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn summary(&self) -> UsageSummary {
        match self.records.lock() {
            Ok(records) => {
                let unique: AHashSet<&str> =
                    records.iter().map(|r| r.key_id.as_str()).collect();
                UsageSummary {
                    total_requests: records.len() as u64,
                    total_tokens: records.iter().map(|r| r.tokens_consumed).sum(),
                    unique_keys: unique.len() as u64,
                }
            }
            Err(_) => UsageSummary::default(),
        }
    }
}
