use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use storauth_core::{Error, Result};

use crate::{
    Backoff, BackoffKind, Classification, Classify, ExponentialBackoff, Failure, LinearBackoff,
    Location, RetryContext, RetryError, RetryOptions, RetryState,
};

/// Why the policy decided the way it did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionReason {
    /// The failure is transient.
    Transient(Failure),
    /// The secondary answered `404` to a read, likely replication lag; the
    /// next attempt goes to the primary.
    SecondaryNotFound,
    /// The failure can't be fixed by retrying.
    NonRetryable(Failure),
    /// The attempt budget is spent.
    MaxAttempts,
    /// Waiting once more would exceed the elapsed time budget.
    MaxElapsed,
}

impl Display for DecisionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DecisionReason::Transient(failure) => write!(f, "transient {failure}"),
            DecisionReason::SecondaryNotFound => write!(f, "secondary returned 404"),
            DecisionReason::NonRetryable(failure) => write!(f, "non-retryable {failure}"),
            DecisionReason::MaxAttempts => write!(f, "max attempts reached"),
            DecisionReason::MaxElapsed => write!(f, "max elapsed time reached"),
        }
    }
}

/// Outcome of consulting the policy after a failed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryDecision {
    /// Whether to make another attempt.
    pub retry: bool,
    /// Time to wait before it.
    pub delay: Duration,
    /// Replica it should target.
    pub location: Location,
    /// Diagnostics.
    pub reason: DecisionReason,
}

impl RetryDecision {
    fn stop(location: Location, reason: DecisionReason) -> Self {
        Self {
            retry: false,
            delay: Duration::ZERO,
            location,
            reason,
        }
    }
}

/// Decides, after each failed attempt, whether and how to try again.
///
/// Holds configuration only; all per-operation state lives in
/// [`RetryContext`], so one policy can be shared by any number of
/// concurrent operations.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    backoff: Arc<dyn Backoff>,
    max_attempts: u32,
    max_elapsed: Duration,
    secondary_reads: bool,
}

impl RetryPolicy {
    /// Build a policy from validated options.
    pub fn new(options: &RetryOptions) -> Result<Self> {
        options.validate()?;

        let backoff: Arc<dyn Backoff> = match options.backoff {
            BackoffKind::Linear => Arc::new(
                LinearBackoff::new(options.base_delay, options.max_delay)
                    .with_jitter(options.jitter),
            ),
            BackoffKind::Exponential => Arc::new(
                ExponentialBackoff::new(options.base_delay, options.max_delay)
                    .with_jitter(options.jitter),
            ),
        };

        Ok(Self {
            backoff,
            max_attempts: options.max_attempts,
            max_elapsed: options.max_elapsed,
            secondary_reads: options.secondary_reads,
        })
    }

    /// Replace the backoff strategy.
    pub fn with_backoff(mut self, backoff: impl Backoff) -> Self {
        self.backoff = Arc::new(backoff);
        self
    }

    /// Decide after the failure recorded in `ctx`, moving `ctx` to
    /// `Retrying`, `Exhausted` or `NonRetryable`.
    pub fn decide(&self, ctx: &mut RetryContext) -> Result<RetryDecision> {
        if ctx.state() != RetryState::Attempting || ctx.attempts() == 0 {
            return Err(Error::unexpected(format!(
                "retry policy consulted while {:?} after {} attempts",
                ctx.state(),
                ctx.attempts()
            )));
        }
        let failure = ctx
            .last_failure()
            .ok_or_else(|| Error::unexpected("retry policy consulted without a failure"))?;

        let redirect = ctx.is_read_only()
            && ctx.location() == Location::Secondary
            && failure == Failure::Status(404);
        let classification = if redirect {
            Classification::Transient
        } else {
            failure.classify()
        };

        if !classification.is_retryable() {
            ctx.set_state(RetryState::NonRetryable);
            let decision = RetryDecision::stop(ctx.location(), DecisionReason::NonRetryable(failure));
            debug!("not retrying: {}", decision.reason);
            return Ok(decision);
        }

        if ctx.attempts() >= self.max_attempts {
            ctx.set_state(RetryState::Exhausted);
            warn!(
                "giving up after {} attempts, last failure: {failure}",
                ctx.attempts()
            );
            return Ok(RetryDecision::stop(ctx.location(), DecisionReason::MaxAttempts));
        }

        let delay = self.backoff.delay(ctx.attempts());
        if ctx.elapsed().saturating_add(delay) > self.max_elapsed {
            ctx.set_state(RetryState::Exhausted);
            warn!(
                "giving up after {:?}, last failure: {failure}",
                ctx.elapsed()
            );
            return Ok(RetryDecision::stop(ctx.location(), DecisionReason::MaxElapsed));
        }

        let location = self.next_location(ctx);
        let reason = if redirect {
            DecisionReason::SecondaryNotFound
        } else {
            DecisionReason::Transient(failure)
        };
        ctx.set_state(RetryState::Retrying);
        debug!(
            "retrying attempt {} against {location} in {delay:?}: {reason}",
            ctx.attempts() + 1
        );

        Ok(RetryDecision {
            retry: true,
            delay,
            location,
            reason,
        })
    }

    /// Record `error` in `ctx` and decide.
    ///
    /// Terminal outcomes come back as a [`RetryError`] carrying `error`.
    pub fn on_failure<E: Classify>(
        &self,
        ctx: &mut RetryContext,
        error: E,
        elapsed: Duration,
    ) -> std::result::Result<RetryDecision, RetryError<E>> {
        ctx.record_failure(error.failure(), elapsed)
            .map_err(RetryError::Context)?;
        let decision = self.decide(ctx).map_err(RetryError::Context)?;

        match ctx.state() {
            RetryState::NonRetryable => Err(RetryError::NonRetryable {
                error,
                attempts: ctx.attempts(),
            }),
            RetryState::Exhausted => Err(RetryError::Exhausted {
                error,
                attempts: ctx.attempts(),
                elapsed: ctx.elapsed(),
            }),
            _ => Ok(decision),
        }
    }

    /// Read-only operations alternate replicas when secondary reads are on,
    /// until the secondary answered `404` once.
    fn next_location(&self, ctx: &RetryContext) -> Location {
        if self.secondary_reads && ctx.is_read_only() && !ctx.secondary_not_found() {
            ctx.location().other()
        } else {
            Location::Primary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn policy(options: RetryOptions) -> RetryPolicy {
        RetryPolicy::new(&options.with_jitter(0.0)).unwrap()
    }

    fn fail(ctx: &mut RetryContext, location: Location, failure: Failure) {
        ctx.start_attempt(location).unwrap();
        ctx.record_failure(failure, ctx.elapsed()).unwrap();
    }

    #[test]
    fn test_exhaustion_after_max_attempts() {
        let policy = policy(RetryOptions::default().with_max_attempts(3));
        let mut ctx = RetryContext::new(false);

        let mut states = vec![];
        let mut location = Location::Primary;
        while !ctx.state().is_terminal() {
            fail(&mut ctx, location, Failure::Status(503));
            let decision = policy.decide(&mut ctx).unwrap();
            location = decision.location;
            states.push(ctx.state());
        }

        assert_eq!(
            states,
            vec![RetryState::Retrying, RetryState::Retrying, RetryState::Exhausted]
        );
    }

    #[test]
    fn test_non_retryable() {
        let policy = policy(RetryOptions::default());
        let mut ctx = RetryContext::new(false);
        fail(&mut ctx, Location::Primary, Failure::Status(403));

        let decision = policy.decide(&mut ctx).unwrap();
        assert!(!decision.retry);
        assert_eq!(decision.reason, DecisionReason::NonRetryable(Failure::Status(403)));
        assert_eq!(ctx.state(), RetryState::NonRetryable);
    }

    #[test]
    fn test_decide_requires_failed_attempt() {
        let policy = policy(RetryOptions::default());
        let mut ctx = RetryContext::new(false);
        assert!(policy.decide(&mut ctx).is_err());

        ctx.start_attempt(Location::Primary).unwrap();
        assert!(policy.decide(&mut ctx).is_err());
    }

    #[test]
    fn test_invalid_options() {
        let err = RetryPolicy::new(&RetryOptions::default().with_max_attempts(0)).unwrap_err();
        assert_eq!(err.kind(), storauth_core::ErrorKind::ConfigInvalid);
    }
}
