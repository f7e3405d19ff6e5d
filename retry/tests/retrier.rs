use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use storauth_retry::{
    BackoffKind, Classify, Clock, Failure, Location, Retrier, RetryError, RetryOptions,
    RetryPolicy, Sleep,
};

/// Fake time shared by [`FakeClock`] and [`FakeSleep`]: sleeping advances
/// the clock instantly.
#[derive(Clone, Debug)]
struct FakeTime {
    start: Instant,
    offset: Arc<Mutex<Duration>>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl FakeTime {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Arc::default(),
            sleeps: Arc::default(),
        }
    }

    fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for FakeTime {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap()
    }
}

#[async_trait]
impl Sleep for FakeTime {
    async fn sleep(&self, duration: Duration) {
        *self.offset.lock().unwrap() += duration;
        self.sleeps.lock().unwrap().push(duration);
    }
}

#[derive(Debug, PartialEq)]
struct ServiceError(Failure);

impl Classify for ServiceError {
    fn failure(&self) -> Failure {
        self.0
    }
}

fn retrier(options: RetryOptions) -> (Retrier<FakeTime, FakeTime>, FakeTime) {
    let _ = env_logger::builder().is_test(true).try_init();

    let time = FakeTime::new();
    let policy = RetryPolicy::new(&options.with_jitter(0.0)).unwrap();
    (
        Retrier::new(policy, time.clone()).with_clock(time.clone()),
        time,
    )
}

/// Replays `script`, one result per attempt, recording the locations tried.
async fn replay(
    retrier: &Retrier<FakeTime, FakeTime>,
    read_only: bool,
    script: Vec<Result<&'static str, Failure>>,
) -> (Result<&'static str, RetryError<ServiceError>>, Vec<Location>) {
    let seen = Arc::new(Mutex::new(vec![]));
    let script = Arc::new(Mutex::new(script.into_iter()));

    let result = retrier
        .run(read_only, |location| {
            seen.lock().unwrap().push(location);
            let next = script.lock().unwrap().next();
            async move {
                match next {
                    Some(Ok(v)) => Ok(v),
                    Some(Err(failure)) => Err(ServiceError(failure)),
                    None => panic!("operation called more often than scripted"),
                }
            }
        })
        .await;

    let seen = seen.lock().unwrap().clone();
    (result, seen)
}

#[tokio::test]
async fn test_succeeds_after_transient_failures() {
    let (retrier, time) = retrier(RetryOptions::default());

    let (result, _) = replay(
        &retrier,
        false,
        vec![
            Err(Failure::Connection),
            Err(Failure::Status(500)),
            Ok("done"),
        ],
    )
    .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(time.sleeps(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
}

#[tokio::test]
async fn test_exhausted_carries_last_error() {
    let (retrier, time) = retrier(
        RetryOptions::default()
            .with_backoff(BackoffKind::Linear)
            .with_max_attempts(3),
    );

    let (result, _) = replay(
        &retrier,
        false,
        vec![
            Err(Failure::Status(503)),
            Err(Failure::Timeout),
            Err(Failure::Status(429)),
        ],
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.is_exhausted());
    assert_eq!(err.attempts(), 3);
    assert_eq!(err.into_inner(), Some(ServiceError(Failure::Status(429))));
    assert_eq!(time.sleeps(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
}

#[tokio::test]
async fn test_non_retryable_surfaces_immediately() {
    let (retrier, time) = retrier(RetryOptions::default());

    let (result, seen) = replay(&retrier, false, vec![Err(Failure::Status(403))]).await;

    match result.unwrap_err() {
        RetryError::NonRetryable { error, attempts } => {
            assert_eq!(error, ServiceError(Failure::Status(403)));
            assert_eq!(attempts, 1);
        }
        err => panic!("unexpected error: {err:?}"),
    }
    assert_eq!(seen, vec![Location::Primary]);
    assert!(time.sleeps().is_empty());
}

#[tokio::test]
async fn test_reads_alternate_replicas() {
    let (retrier, _) = retrier(
        RetryOptions::default()
            .with_secondary_reads(true)
            .with_max_attempts(5),
    );

    let (result, seen) = replay(
        &retrier,
        true,
        vec![
            Err(Failure::Status(503)),
            Err(Failure::Status(503)),
            Err(Failure::Timeout),
            Ok("done"),
        ],
    )
    .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(
        seen,
        vec![
            Location::Primary,
            Location::Secondary,
            Location::Primary,
            Location::Secondary
        ]
    );
}

#[tokio::test]
async fn test_writes_stay_on_primary() {
    let (retrier, _) = retrier(RetryOptions::default().with_secondary_reads(true));

    let (_, seen) = replay(
        &retrier,
        false,
        vec![Err(Failure::Status(503)), Ok("done")],
    )
    .await;

    assert_eq!(seen, vec![Location::Primary, Location::Primary]);
}

#[tokio::test]
async fn test_secondary_not_found_redirects_to_primary() {
    let (retrier, _) = retrier(
        RetryOptions::default()
            .with_secondary_reads(true)
            .with_max_attempts(5),
    );

    let (result, seen) = replay(
        &retrier,
        true,
        vec![
            Err(Failure::Status(503)),
            Err(Failure::Status(404)),
            Err(Failure::Status(503)),
            Ok("done"),
        ],
    )
    .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(
        seen,
        vec![
            Location::Primary,
            Location::Secondary,
            Location::Primary,
            Location::Primary
        ]
    );
}

#[tokio::test]
async fn test_primary_not_found_is_final() {
    let (retrier, _) = retrier(RetryOptions::default().with_secondary_reads(true));

    let (result, _) = replay(&retrier, true, vec![Err(Failure::Status(404))]).await;

    assert!(matches!(
        result.unwrap_err(),
        RetryError::NonRetryable { attempts: 1, .. }
    ));
}

#[tokio::test]
async fn test_elapsed_budget() {
    let (retrier, time) = retrier(
        RetryOptions::default()
            .with_max_attempts(10)
            .with_max_elapsed(Duration::from_secs(5)),
    );

    let (result, _) = replay(
        &retrier,
        false,
        vec![
            Err(Failure::Status(500)),
            Err(Failure::Status(500)),
            Err(Failure::Status(500)),
        ],
    )
    .await;

    // 1s + 2s slept, the next 4s would overrun the 5s budget.
    match result.unwrap_err() {
        RetryError::Exhausted {
            attempts, elapsed, ..
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(elapsed, Duration::from_secs(3));
        }
        err => panic!("unexpected error: {err:?}"),
    }
    assert_eq!(time.sleeps(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
}
