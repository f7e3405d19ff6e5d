use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storauth_core::{Context, Error, Result};

use crate::BackoffKind;

/// Env name of the base delay in milliseconds.
pub const STORAUTH_RETRY_BASE_DELAY_MS: &str = "STORAUTH_RETRY_BASE_DELAY_MS";
/// Env name of the max delay in milliseconds.
pub const STORAUTH_RETRY_MAX_DELAY_MS: &str = "STORAUTH_RETRY_MAX_DELAY_MS";
/// Env name of the max attempt count.
pub const STORAUTH_RETRY_MAX_ATTEMPTS: &str = "STORAUTH_RETRY_MAX_ATTEMPTS";
/// Env name of the max elapsed time in milliseconds.
pub const STORAUTH_RETRY_MAX_ELAPSED_MS: &str = "STORAUTH_RETRY_MAX_ELAPSED_MS";
/// Env name of the jitter fraction.
pub const STORAUTH_RETRY_JITTER: &str = "STORAUTH_RETRY_JITTER";
/// Env name of the backoff kind, `linear` or `exponential`.
pub const STORAUTH_RETRY_BACKOFF: &str = "STORAUTH_RETRY_BACKOFF";
/// Env name of the secondary reads switch.
pub const STORAUTH_RETRY_SECONDARY_READS: &str = "STORAUTH_RETRY_SECONDARY_READS";

/// Plain configuration of a [`crate::RetryPolicy`].
///
/// Durations are (de)serialized as milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryOptions {
    /// Backoff strategy.
    pub backoff: BackoffKind,
    /// Delay before the first retry.
    #[serde(with = "millis", rename = "base_delay_ms")]
    pub base_delay: Duration,
    /// Cap on a single delay.
    #[serde(with = "millis", rename = "max_delay_ms")]
    pub max_delay: Duration,
    /// Cap on attempts, the first try included.
    pub max_attempts: u32,
    /// Cap on the time spent across all attempts and delays.
    #[serde(with = "millis", rename = "max_elapsed_ms")]
    pub max_elapsed: Duration,
    /// Jitter range as a fraction of the delay, in `[0, 1)`.
    pub jitter: f64,
    /// Alternate read-only operations between primary and secondary.
    pub secondary_reads: bool,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            backoff: BackoffKind::Exponential,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(32),
            max_attempts: 4,
            max_elapsed: Duration::from_secs(120),
            jitter: 0.2,
            secondary_reads: false,
        }
    }
}

impl RetryOptions {
    /// Set the backoff strategy.
    pub fn with_backoff(mut self, backoff: BackoffKind) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the delay before the first retry.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the cap on a single delay.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the cap on attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the cap on total time.
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    /// Set the jitter fraction.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Enable or disable secondary reads.
    pub fn with_secondary_reads(mut self, secondary_reads: bool) -> Self {
        self.secondary_reads = secondary_reads;
        self
    }

    /// Override fields from `STORAUTH_RETRY_*` env values.
    ///
    /// Unset variables keep the current value; unparsable ones are a
    /// configuration error.
    pub fn from_env(mut self, ctx: &Context) -> Result<Self> {
        if let Some(v) = parse_env::<u64>(ctx, STORAUTH_RETRY_BASE_DELAY_MS)? {
            self.base_delay = Duration::from_millis(v);
        }
        if let Some(v) = parse_env::<u64>(ctx, STORAUTH_RETRY_MAX_DELAY_MS)? {
            self.max_delay = Duration::from_millis(v);
        }
        if let Some(v) = parse_env(ctx, STORAUTH_RETRY_MAX_ATTEMPTS)? {
            self.max_attempts = v;
        }
        if let Some(v) = parse_env::<u64>(ctx, STORAUTH_RETRY_MAX_ELAPSED_MS)? {
            self.max_elapsed = Duration::from_millis(v);
        }
        if let Some(v) = parse_env(ctx, STORAUTH_RETRY_JITTER)? {
            self.jitter = v;
        }
        if let Some(v) = ctx.env_var(STORAUTH_RETRY_BACKOFF) {
            self.backoff = match v.to_lowercase().as_str() {
                "linear" => BackoffKind::Linear,
                "exponential" => BackoffKind::Exponential,
                _ => {
                    return Err(Error::config_invalid(format!(
                        "{STORAUTH_RETRY_BACKOFF} must be linear or exponential, got {v:?}"
                    )))
                }
            };
        }
        if let Some(v) = parse_env(ctx, STORAUTH_RETRY_SECONDARY_READS)? {
            self.secondary_reads = v;
        }

        Ok(self)
    }

    /// Check the options describe a usable policy.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::config_invalid("max_attempts must be at least 1"));
        }
        if self.base_delay > self.max_delay {
            return Err(Error::config_invalid(format!(
                "base_delay {:?} is larger than max_delay {:?}",
                self.base_delay, self.max_delay
            )));
        }
        if self.max_elapsed.is_zero() {
            return Err(Error::config_invalid("max_elapsed must be positive"));
        }
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(Error::config_invalid(format!(
                "jitter must be in [0, 1), got {}",
                self.jitter
            )));
        }
        Ok(())
    }
}

fn parse_env<T>(ctx: &Context, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(v) = ctx.env_var(key) else {
        return Ok(None);
    };

    v.trim().parse().map(Some).map_err(|e| {
        Error::config_invalid(format!("{key} has invalid value {v:?}")).with_source(e)
    })
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
