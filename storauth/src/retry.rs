//! Retry policy with convenience APIs

pub use storauth_retry::*;

use storauth_core::{Context, OsEnv, Result};

/// Retrier sleeping on the tokio timer.
pub type DefaultRetrier = Retrier<TokioSleep>;

/// Create a retrier from default options overridden by `STORAUTH_RETRY_*`
/// env values.
pub fn default_retrier() -> Result<DefaultRetrier> {
    let options = RetryOptions::default().from_env(&Context::new().with_env(OsEnv))?;
    Ok(Retrier::new(RetryPolicy::new(&options)?, TokioSleep))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Denied;

    impl Classify for Denied {
        fn failure(&self) -> Failure {
            Failure::Status(403)
        }
    }

    #[tokio::test]
    async fn test_default_retrier_stops_on_non_retryable() {
        let retrier = default_retrier().unwrap();

        let result: std::result::Result<(), _> = retrier
            .run(true, |location| async move {
                assert_eq!(location, Location::Primary);
                Err(Denied)
            })
            .await;

        assert_eq!(result.unwrap_err().attempts(), 1);
    }
}
