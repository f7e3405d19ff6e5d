use std::time::Duration;

/// A logical operation that gave up.
///
/// Carries the error of the last attempt, never a generic "gave up".
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// The last failure can't be fixed by retrying.
    #[error("non-retryable failure after {attempts} attempts: {error}")]
    NonRetryable {
        /// Error of the last attempt.
        #[source]
        error: E,
        /// Attempts made.
        attempts: u32,
    },
    /// Out of attempts or time.
    #[error("retries exhausted after {attempts} attempts in {elapsed:?}: {error}")]
    Exhausted {
        /// Error of the last attempt.
        #[source]
        error: E,
        /// Attempts made.
        attempts: u32,
        /// Time spent across all attempts.
        elapsed: Duration,
    },
    /// The retry context was driven out of order.
    #[error("retry context misused: {0}")]
    Context(#[source] storauth_core::Error),
}

impl<E> RetryError<E> {
    /// The error of the last attempt, if one was made.
    pub fn into_inner(self) -> Option<E> {
        match self {
            RetryError::NonRetryable { error, .. } | RetryError::Exhausted { error, .. } => {
                Some(error)
            }
            RetryError::Context(_) => None,
        }
    }

    /// Attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::NonRetryable { attempts, .. } | RetryError::Exhausted { attempts, .. } => {
                *attempts
            }
            RetryError::Context(_) => 0,
        }
    }

    /// Whether the policy ran out of attempts or time.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }
}
