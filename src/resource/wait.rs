//! Waiting for a resource to reach a condition
//!
//! [`poll_until`] fetches a resource repeatedly with jittered exponential
//! backoff until a predicate is met, rejected, or a bound is exceeded.
//! [`Service::wait_for`] wires it to the resource's `get`.
//!
//! Fetch errors follow [`FetchErrorPolicy`]: with the default
//! `RetryTransient`, network failures, 429 and 5xx answers are retried
//! within the bounds; 404 and every other error end the wait at once.

use super::{Retrievable, Service};
use crate::error::{Error, Result, WaitError};
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Outcome of evaluating a wait predicate against one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Stop waiting and return the snapshot
    Met,
    /// Poll again
    NotYet,
    /// The condition can never be met (e.g. a terminal error state)
    Never(String),
}

/// Which fetch errors a wait retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchErrorPolicy {
    /// Any fetch error ends the wait.
    FailFast,
    /// Retry errors where [`Error::is_transient`] holds.
    #[default]
    RetryTransient,
}

impl FetchErrorPolicy {
    fn retries(self, error: &Error) -> bool {
        match self {
            FetchErrorPolicy::FailFast => false,
            FetchErrorPolicy::RetryTransient => error.is_transient(),
        }
    }
}

/// Backoff and bounds of a wait.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub initial_interval: Duration,
    pub multiplier: f64,
    pub max_interval: Duration,
    /// Each delay is drawn from `interval * (1 ± randomization_factor)`
    pub randomization_factor: f64,
    /// Give up once this much time has passed since the first fetch
    pub max_elapsed: Option<Duration>,
    /// Give up after this many fetches
    pub max_attempts: Option<u32>,
    pub fetch_errors: FetchErrorPolicy,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            multiplier: 1.5,
            max_interval: Duration::from_secs(10),
            randomization_factor: 0.5,
            max_elapsed: Some(Duration::from_secs(5 * 60)),
            max_attempts: None,
            fetch_errors: FetchErrorPolicy::default(),
        }
    }
}

impl WaitOptions {
    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    pub fn with_max_elapsed(mut self, max_elapsed: Option<Duration>) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_fetch_errors(mut self, policy: FetchErrorPolicy) -> Self {
        self.fetch_errors = policy;
        self
    }

    /// Interval generator. The elapsed bound is enforced by the caller on
    /// the tokio clock, so the generator itself never expires.
    fn backoff(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoff {
            current_interval: self.initial_interval,
            initial_interval: self.initial_interval,
            randomization_factor: self.randomization_factor,
            multiplier: self.multiplier,
            max_interval: self.max_interval,
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        };
        backoff.reset();
        backoff
    }
}

/// Fetch with `fetch` until `predicate` is met.
///
/// Cancellation is checked before every fetch and during every sleep; a
/// fetch that has started always completes.
pub async fn poll_until<R, F, Fut, P>(
    mut fetch: F,
    mut predicate: P,
    options: &WaitOptions,
    cancel: &CancellationToken,
) -> std::result::Result<R, WaitError<R>>
where
    R: fmt::Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R>>,
    P: FnMut(&R) -> Condition,
{
    let started = Instant::now();
    let mut backoff = options.backoff();
    let mut attempts: u32 = 0;
    let mut last: Option<Box<R>> = None;
    let mut last_error: Option<Error> = None;

    loop {
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled { attempts, last });
        }

        attempts += 1;
        match fetch().await {
            Ok(resource) => match predicate(&resource) {
                Condition::Met => {
                    tracing::debug!("Condition met after {} attempt(s)", attempts);
                    return Ok(resource);
                }
                Condition::Never(reason) => {
                    tracing::debug!("Condition can never be met: {}", reason);
                    return Err(WaitError::Unsatisfiable {
                        reason,
                        resource: Box::new(resource),
                    });
                }
                Condition::NotYet => {
                    last = Some(Box::new(resource));
                    last_error = None;
                }
            },
            Err(err) if options.fetch_errors.retries(&err) => {
                tracing::warn!("Transient error while waiting (attempt {}): {}", attempts, err);
                last_error = Some(err);
            }
            Err(err) => return Err(WaitError::Fetch { attempts, source: err }),
        }

        let elapsed = started.elapsed();
        let out_of_attempts = options.max_attempts.is_some_and(|max| attempts >= max);
        let out_of_time = options.max_elapsed.is_some_and(|max| elapsed >= max);
        if out_of_attempts || out_of_time {
            return Err(WaitError::TimedOut {
                attempts,
                elapsed,
                last,
                last_error,
            });
        }

        let mut delay = backoff.next_backoff().unwrap_or(options.max_interval);
        if let Some(max) = options.max_elapsed {
            // Wake up in time for one last attempt at the deadline
            delay = delay.min(max.saturating_sub(elapsed));
        }
        tracing::trace!("Condition not met, retrying in {:?}", delay);

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(WaitError::Cancelled { attempts, last });
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

impl<K: Retrievable + fmt::Debug> Service<K> {
    /// Poll `get(id)` until `predicate` is met.
    ///
    /// See the [module docs](self) for the retry policy.
    pub async fn wait_for<P>(
        &self,
        id: &str,
        predicate: P,
        options: &WaitOptions,
        cancel: &CancellationToken,
    ) -> std::result::Result<K, WaitError<K>>
    where
        P: FnMut(&K) -> Condition,
    {
        tracing::info!("Waiting for {} {}", K::NAME, id);
        poll_until(|| self.get(id), predicate, options, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::RateLimit;
    use crate::error::ApiError;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> WaitOptions {
        WaitOptions::default()
            .with_initial_interval(Duration::from_millis(10))
            .with_max_interval(Duration::from_millis(50))
    }

    fn api_error(status: StatusCode) -> Error {
        Error::Api(ApiError::from_body(status, "{}", RateLimit::default()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_met_on_second_fetch() {
        let calls = &AtomicU32::new(0);
        let result = poll_until(
            move || async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1) },
            |n: &u32| if *n == 2 { Condition::Met } else { Condition::NotYet },
            &fast(),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_bound() {
        let calls = &AtomicU32::new(0);
        let result = poll_until(
            move || async move { Ok(calls.fetch_add(1, Ordering::SeqCst)) },
            |_: &u32| Condition::NotYet,
            &fast().with_max_attempts(Some(4)),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(WaitError::TimedOut { attempts, last, .. }) => {
                assert_eq!(attempts, 4);
                assert_eq!(last.as_deref(), Some(&3));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_fails_without_sleeping() {
        let calls = &AtomicU32::new(0);
        let before = Instant::now();
        let result = poll_until(
            move || async move { Ok(calls.fetch_add(1, Ordering::SeqCst)) },
            |_: &u32| Condition::Never("errored".to_string()),
            &fast(),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(Instant::now(), before);
        assert!(matches!(result, Err(WaitError::Unsatisfiable { ref reason, .. }) if reason == "errored"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_bound_makes_final_attempt_at_deadline() {
        let before = Instant::now();
        let mut options = fast()
            .with_initial_interval(Duration::from_secs(4))
            .with_max_interval(Duration::from_secs(4))
            .with_max_elapsed(Some(Duration::from_secs(10)));
        options.randomization_factor = 0.0;
        options.multiplier = 1.0;

        let calls = &AtomicU32::new(0);
        let result = poll_until(
            move || async move { Ok(calls.fetch_add(1, Ordering::SeqCst)) },
            |_: &u32| Condition::NotYet,
            &options,
            &CancellationToken::new(),
        )
        .await;

        // t=0, t=4, t=8, t=10
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        let waited = Instant::now() - before;
        assert!(waited >= Duration::from_secs(10) && waited < Duration::from_secs(11));
        assert!(matches!(result, Err(WaitError::TimedOut { attempts: 4, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_fatal() {
        let calls = &AtomicU32::new(0);
        let result: std::result::Result<u32, _> = poll_until(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(api_error(StatusCode::NOT_FOUND))
            },
            |_: &u32| Condition::Met,
            &fast(),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        match result {
            Err(WaitError::Fetch { attempts, source }) => {
                assert_eq!(attempts, 1);
                assert!(source.is_not_found());
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let calls = &AtomicU32::new(0);
        let result = poll_until(
            move || async move {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(api_error(StatusCode::SERVICE_UNAVAILABLE)),
                    n => Ok(n),
                }
            },
            |_: &u32| Condition::Met,
            &fast(),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_fast_policy() {
        let calls = &AtomicU32::new(0);
        let result: std::result::Result<u32, _> = poll_until(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(api_error(StatusCode::SERVICE_UNAVAILABLE))
            },
            |_: &u32| Condition::Met,
            &fast().with_fetch_errors(FetchErrorPolicy::FailFast),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(WaitError::Fetch { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_last_error() {
        let result: std::result::Result<u32, _> = poll_until(
            move || async move { Err(api_error(StatusCode::BAD_GATEWAY)) },
            |_: &u32| Condition::Met,
            &fast().with_max_attempts(Some(3)),
            &CancellationToken::new(),
        )
        .await;

        match result {
            Err(WaitError::TimedOut {
                attempts,
                last,
                last_error,
                ..
            }) => {
                assert_eq!(attempts, 3);
                assert!(last.is_none());
                assert_eq!(
                    last_error.and_then(|e| e.status()),
                    Some(StatusCode::BAD_GATEWAY)
                );
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_first_fetch() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = &AtomicU32::new(0);
        let result = poll_until(
            move || async move { Ok(calls.fetch_add(1, Ordering::SeqCst)) },
            |_: &u32| Condition::Met,
            &fast(),
            &cancel,
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(result, Err(WaitError::Cancelled { attempts: 0, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_sleep() {
        let cancel = CancellationToken::new();
        let options = fast()
            .with_initial_interval(Duration::from_secs(60))
            .with_max_interval(Duration::from_secs(60));

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let before = Instant::now();
        let result = poll_until(
            move || async move { Ok(7u32) },
            |_: &u32| Condition::NotYet,
            &options,
            &cancel,
        )
        .await;

        assert!(Instant::now() - before < Duration::from_secs(30));
        match result {
            Err(WaitError::Cancelled { attempts, last }) => {
                assert_eq!(attempts, 1);
                assert_eq!(last.as_deref(), Some(&7));
            }
            other => panic!("expected cancellation, got {:?}", other),
        }
    }
}
