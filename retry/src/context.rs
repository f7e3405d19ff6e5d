use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use storauth_core::{Error, Result};

use crate::Failure;

/// Physical replica an attempt targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Location {
    /// The primary endpoint.
    #[default]
    Primary,
    /// The read-only secondary endpoint.
    Secondary,
}

impl Location {
    /// The other replica.
    pub fn other(self) -> Self {
        match self {
            Location::Primary => Location::Secondary,
            Location::Secondary => Location::Primary,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Location::Primary => write!(f, "primary"),
            Location::Secondary => write!(f, "secondary"),
        }
    }
}

/// Where a logical operation stands.
///
/// ```text
/// NotStarted -> Attempting -> Succeeded
///                          -> Retrying -> Attempting
///                          -> Exhausted
///                          -> NonRetryable
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetryState {
    /// No attempt made yet.
    #[default]
    NotStarted,
    /// An attempt is in flight.
    Attempting,
    /// The last attempt succeeded.
    Succeeded,
    /// Waiting before the next attempt.
    Retrying,
    /// Out of attempts or time.
    Exhausted,
    /// The last failure can't be fixed by retrying.
    NonRetryable,
}

impl RetryState {
    /// Whether the operation is over.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RetryState::Succeeded | RetryState::Exhausted | RetryState::NonRetryable
        )
    }
}

/// Per-operation retry state, owned by exactly one logical operation.
///
/// Elapsed time is supplied by the caller so the policy never reads a clock.
#[derive(Clone, Debug, Default)]
pub struct RetryContext {
    attempts: u32,
    state: RetryState,
    last_failure: Option<Failure>,
    elapsed: Duration,
    location: Location,
    read_only: bool,
    secondary_not_found: bool,
}

impl RetryContext {
    /// Create the context of one logical operation.
    ///
    /// Only `read_only` operations are eligible for secondary reads.
    pub fn new(read_only: bool) -> Self {
        Self {
            read_only,
            ..Default::default()
        }
    }

    /// Attempts started so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Current state.
    pub fn state(&self) -> RetryState {
        self.state
    }

    /// Failure of the most recent attempt.
    pub fn last_failure(&self) -> Option<Failure> {
        self.last_failure
    }

    /// Time spent since the first attempt started, as last reported.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Location of the most recent attempt.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Whether the operation only reads.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Whether the secondary answered `404` earlier in this operation.
    pub fn secondary_not_found(&self) -> bool {
        self.secondary_not_found
    }

    /// Start an attempt against `location`.
    pub fn start_attempt(&mut self, location: Location) -> Result<()> {
        self.expect_state(&[RetryState::NotStarted, RetryState::Retrying], "start an attempt")?;

        self.attempts += 1;
        self.location = location;
        self.state = RetryState::Attempting;
        Ok(())
    }

    /// Record that the attempt in flight succeeded.
    pub fn record_success(&mut self, elapsed: Duration) -> Result<()> {
        self.expect_state(&[RetryState::Attempting], "record a success")?;

        self.elapsed = elapsed;
        self.state = RetryState::Succeeded;
        Ok(())
    }

    /// Record that the attempt in flight failed after `elapsed` in total.
    pub fn record_failure(&mut self, failure: Failure, elapsed: Duration) -> Result<()> {
        self.expect_state(&[RetryState::Attempting], "record a failure")?;

        if failure == Failure::Status(404) && self.location == Location::Secondary {
            self.secondary_not_found = true;
        }
        self.last_failure = Some(failure);
        self.elapsed = elapsed;
        Ok(())
    }

    pub(crate) fn set_state(&mut self, state: RetryState) {
        self.state = state;
    }

    fn expect_state(&self, allowed: &[RetryState], action: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        Err(Error::unexpected(format!(
            "can't {action} while {:?}",
            self.state
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transitions() {
        let mut ctx = RetryContext::new(true);
        assert_eq!(ctx.state(), RetryState::NotStarted);
        assert!(ctx.record_failure(Failure::Timeout, Duration::ZERO).is_err());

        ctx.start_attempt(Location::Secondary).unwrap();
        assert_eq!(ctx.attempts(), 1);
        assert!(ctx.start_attempt(Location::Primary).is_err());

        ctx.record_failure(Failure::Status(404), Duration::from_secs(1))
            .unwrap();
        assert!(ctx.secondary_not_found());
        assert_eq!(ctx.last_failure(), Some(Failure::Status(404)));

        ctx.record_success(Duration::from_secs(2)).unwrap();
        assert!(ctx.state().is_terminal());
        assert!(ctx.start_attempt(Location::Primary).is_err());
    }

    #[test]
    fn test_location_other() {
        assert_eq!(Location::Primary.other(), Location::Secondary);
        assert_eq!(Location::Secondary.other().to_string(), "primary");
    }
}
