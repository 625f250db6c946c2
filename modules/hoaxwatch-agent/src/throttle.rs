//! Pacing primitives for source fetching: a jittered pause and a bounded
//! retry wrapper. Both exist to keep the pipeline polite toward upstream
//! rate limits; sources are fetched sequentially on purpose, and these are
//! the only suspension points inside a fetch.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use tracing::warn;

/// Sample a uniform duration in `[min_secs, max_secs]`.
fn jittered(min_secs: f64, max_secs: f64) -> Duration {
    let min_secs = min_secs.max(0.0);
    if max_secs <= min_secs {
        return Duration::from_secs_f64(min_secs);
    }
    Duration::from_secs_f64(rand::rng().random_range(min_secs..=max_secs))
}

/// Block the calling task for a uniformly-random duration in
/// `[min_secs, max_secs]` seconds. Used between keyword iterations and, for
/// high-volume sources, every few items within one.
pub async fn pause(min_secs: f64, max_secs: f64) {
    tokio::time::sleep(jittered(min_secs, max_secs)).await;
}

/// Bounded retry with a fixed inter-attempt delay.
///
/// Exhaustion yields an empty result, not an error: callers cannot tell "no
/// items" from "source unavailable after retries", so one dead source never
/// aborts a run. Each failed attempt is logged.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Invoke `op` up to `attempts` times, sleeping `delay` between attempts.
    pub async fn run<T, F, Fut>(&self, label: &str, op: F) -> Vec<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        for attempt in 1..=self.attempts {
            match op().await {
                Ok(items) => return items,
                Err(e) => {
                    warn!(
                        label,
                        attempt,
                        max_attempts = self.attempts,
                        error = %e,
                        "Fetch attempt failed"
                    );
                    if attempt < self.attempts {
                        tokio::time::sleep(self.delay).await;
                    }
                }
            }
        }
        Vec::new()
    }
}
