//! Token usage accounting

use std::sync::atomic::{AtomicU64, Ordering};

use crate::agents::llm::TokenUsage;

/// Receives the usage delta reported after every engine round
pub trait UsageSink: Send + Sync {
    fn record(&self, usage: &TokenUsage);
}

impl<F> UsageSink for F
where
    F: Fn(&TokenUsage) + Send + Sync,
{
    fn record(&self, usage: &TokenUsage) {
        self(usage)
    }
}

/// Process-wide running total of consumed tokens.
///
/// The counter is atomic so several conversations may share one accumulator.
/// Nothing decays or windows; only [`UsageAccumulator::reset`] clears it.
#[derive(Debug)]
pub struct UsageAccumulator {
    total: AtomicU64,
    cost_per_token: f64,
}

impl UsageAccumulator {
    pub fn new(cost_per_token: f64) -> Self {
        Self {
            total: AtomicU64::new(0),
            cost_per_token,
        }
    }

    /// Add the tokens of one round
    pub fn add(&self, tokens: u64) {
        self.total.fetch_add(tokens, Ordering::Relaxed);
    }

    /// Tokens consumed so far
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Running total times the fixed per-token rate
    pub fn estimated_cost(&self) -> f64 {
        self.total() as f64 * self.cost_per_token
    }

    /// Clear the total (explicit user action only)
    pub fn reset(&self) {
        self.total.store(0, Ordering::Relaxed);
    }
}

impl UsageSink for UsageAccumulator {
    fn record(&self, usage: &TokenUsage) {
        self.add(u64::from(usage.total_tokens));
    }
}

impl Default for UsageAccumulator {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_COST_PER_TOKEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn usage(total: u32) -> TokenUsage {
        TokenUsage {
            total_tokens: total,
            ..Default::default()
        }
    }

    #[test]
    fn test_accumulates_totals() {
        let acc = UsageAccumulator::new(0.5);
        acc.record(&usage(100));
        acc.record(&usage(250));
        assert_eq!(acc.total(), 350);
        assert!((acc.estimated_cost() - 175.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset() {
        let acc = UsageAccumulator::default();
        acc.add(42);
        acc.reset();
        assert_eq!(acc.total(), 0);
        assert_eq!(acc.estimated_cost(), 0.0);
    }

    #[test]
    fn test_closure_sink() {
        let seen = std::sync::Mutex::new(Vec::new());
        let sink = |u: &TokenUsage| seen.lock().unwrap().push(u.total_tokens);
        sink.record(&usage(7));
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn test_concurrent_adds() {
        let acc = Arc::new(UsageAccumulator::default());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let acc = acc.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    acc.add(1);
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(acc.total(), 800);
    }
}
