use std::fmt::Debug;
use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::{Classify, Location, RetryContext, RetryError, RetryPolicy};

/// Waits out a retry delay without blocking other tasks.
#[async_trait]
pub trait Sleep: Debug + Send + Sync {
    /// Sleep for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Source of monotonic time for elapsed-time bookkeeping.
pub trait Clock: Debug + Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by [`Instant::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// [`Sleep`] backed by `tokio::time::sleep`.
#[cfg(feature = "tokio")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleep;

#[cfg(feature = "tokio")]
#[async_trait]
impl Sleep for TokioSleep {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

/// Drives an async operation through a [`RetryPolicy`].
///
/// Each call to [`Retrier::run`] owns a fresh [`RetryContext`].
#[derive(Clone, Debug)]
pub struct Retrier<S, C = SystemClock> {
    policy: RetryPolicy,
    sleep: S,
    clock: C,
}

impl<S: Sleep> Retrier<S> {
    /// Create a retrier measuring time with the system clock.
    pub fn new(policy: RetryPolicy, sleep: S) -> Self {
        Self {
            policy,
            sleep,
            clock: SystemClock,
        }
    }
}

impl<S: Sleep, C: Clock> Retrier<S, C> {
    /// Measure elapsed time with another clock.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Retrier<S, C2> {
        Retrier {
            policy: self.policy,
            sleep: self.sleep,
            clock,
        }
    }

    /// The policy in use.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` until it succeeds or the policy gives up.
    ///
    /// `op` receives the replica each attempt should target. The first
    /// attempt always goes to the primary.
    pub async fn run<T, E, F, Fut>(&self, read_only: bool, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(Location) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify,
    {
        let start = self.clock.now();
        let mut ctx = RetryContext::new(read_only);
        let mut location = Location::Primary;

        loop {
            ctx.start_attempt(location).map_err(RetryError::Context)?;

            match op(location).await {
                Ok(v) => {
                    ctx.record_success(self.elapsed_since(start))
                        .map_err(RetryError::Context)?;
                    return Ok(v);
                }
                Err(err) => {
                    let decision = self
                        .policy
                        .on_failure(&mut ctx, err, self.elapsed_since(start))?;
                    self.sleep.sleep(decision.delay).await;
                    location = decision.location;
                }
            }
        }
    }

    fn elapsed_since(&self, start: Instant) -> Duration {
        self.clock.now().saturating_duration_since(start)
    }
}
