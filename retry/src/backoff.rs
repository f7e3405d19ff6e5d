//! Delay strategies between attempts.

use std::fmt::Debug;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Computes the delay before a retry.
///
/// `retry` is 1-based: retry 1 follows the first failed attempt. Retry 0 is
/// the first try and never waits.
pub trait Backoff: Debug + Send + Sync + 'static {
    /// Delay before `retry`, jitter excluded.
    fn delay_bound(&self, retry: u32) -> Duration;

    /// Largest delay this strategy returns.
    fn max_delay(&self) -> Duration;

    /// Jitter range as a fraction of the delay.
    fn jitter(&self) -> f64;

    /// Delay before `retry` with jitter applied.
    fn delay(&self, retry: u32) -> Duration {
        apply_jitter(self.delay_bound(retry), self.jitter(), self.max_delay())
    }
}

/// Scale `delay` by a factor drawn uniformly from `[1 - jitter, 1 + jitter]`,
/// never exceeding `max`.
fn apply_jitter(delay: Duration, jitter: f64, max: Duration) -> Duration {
    if jitter <= 0.0 || delay.is_zero() {
        return delay;
    }

    let jitter = jitter.min(1.0);
    let factor = rand::thread_rng().gen_range(1.0 - jitter..=1.0 + jitter);
    delay.mul_f64(factor).min(max)
}

/// Which backoff a [`crate::RetryOptions`] builds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// [`LinearBackoff`]
    Linear,
    /// [`ExponentialBackoff`]
    #[default]
    Exponential,
}

/// Constant increment per retry: `min(base * retry, max)`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearBackoff {
    base: Duration,
    max: Duration,
    jitter: f64,
}

impl LinearBackoff {
    /// Create a linear backoff without jitter.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            jitter: 0.0,
        }
    }

    /// Set the jitter fraction.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }
}

impl Backoff for LinearBackoff {
    fn delay_bound(&self, retry: u32) -> Duration {
        self.base.saturating_mul(retry).min(self.max)
    }

    fn max_delay(&self) -> Duration {
        self.max
    }

    fn jitter(&self) -> f64 {
        self.jitter
    }
}

/// Doubling delay per retry: `min(max, base * 2^(retry - 1))`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExponentialBackoff {
    base: Duration,
    max: Duration,
    jitter: f64,
}

impl ExponentialBackoff {
    /// Create an exponential backoff with ±20% jitter.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            jitter: 0.2,
        }
    }

    /// Set the jitter fraction.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }
}

impl Backoff for ExponentialBackoff {
    fn delay_bound(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }

        let factor = 2u32.saturating_pow(retry - 1);
        self.base.saturating_mul(factor).min(self.max)
    }

    fn max_delay(&self) -> Duration {
        self.max
    }

    fn jitter(&self) -> f64 {
        self.jitter
    }
}
