//! Retry policy for storage service requests.
//!
//! After a failed attempt, [`RetryPolicy`] decides whether to try again,
//! against which replica and after what delay, without exceeding the
//! operation's attempt and time budgets. The policy never sleeps and never
//! reads a clock: per-operation state, including elapsed time, lives in a
//! [`RetryContext`] owned by the caller.
//!
//! [`Retrier`] is the glue for async callers: it drives an operation through
//! the policy and waits through an injected [`Sleep`].
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use storauth_retry::{Failure, Location, RetryContext, RetryOptions, RetryPolicy};
//!
//! # fn main() -> storauth_core::Result<()> {
//! let policy = RetryPolicy::new(&RetryOptions::default().with_jitter(0.0))?;
//! let mut ctx = RetryContext::new(false);
//!
//! ctx.start_attempt(Location::Primary)?;
//! ctx.record_failure(Failure::Status(503), Duration::from_millis(120))?;
//!
//! let decision = policy.decide(&mut ctx)?;
//! assert!(decision.retry);
//! assert_eq!(decision.delay, Duration::from_secs(1));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod backoff;
pub use backoff::{Backoff, BackoffKind, ExponentialBackoff, LinearBackoff};
mod context;
pub use context::{Location, RetryContext, RetryState};
mod error;
pub use error::RetryError;
mod failure;
pub use failure::{Classification, Classify, Failure};
mod options;
pub use options::*;
mod policy;
pub use policy::{DecisionReason, RetryDecision, RetryPolicy};
mod retrier;
#[cfg(feature = "tokio")]
pub use retrier::TokioSleep;
pub use retrier::{Clock, Retrier, Sleep, SystemClock};
