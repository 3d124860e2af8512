//! Bounded exponential backoff for transport failures.

use std::time::Duration;

use tracing::warn;

use crate::error::{PetfinderError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// How often and how long to wait before re-sending a request whose
/// transport failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub min_wait: Duration,
    /// Ceiling on any single delay.
    pub max_wait: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, min_wait: Duration, max_wait: Duration) -> Self {
        Self {
            max_retries,
            min_wait,
            max_wait,
        }
    }

    /// A single attempt, no waiting.
    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    /// Delay before retry `retry` (0-indexed): `min(max_wait, min_wait * 2^retry)`.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.min_wait
            .checked_mul(factor)
            .unwrap_or(self.max_wait)
            .min(self.max_wait)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(4, Duration::from_millis(600), Duration::from_secs(5))
    }
}

/// Source of the wait between attempts.
pub trait Sleep {
    fn sleep(&self, duration: Duration);
}

/// Blocks the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Wraps a transport and re-sends on transport failure per `RetryPolicy`.
///
/// Any HTTP status, including 4xx and 5xx, is a completed attempt and is
/// returned as-is.
#[derive(Debug, Clone)]
pub struct Retrying<T, S = ThreadSleep> {
    inner: T,
    policy: RetryPolicy,
    sleeper: S,
}

impl<T: Transport> Retrying<T, ThreadSleep> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self::with_sleeper(inner, policy, ThreadSleep)
    }
}

impl<T: Transport, S: Sleep> Retrying<T, S> {
    pub fn with_sleeper(inner: T, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            inner,
            policy,
            sleeper,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Execute `request`, retrying transport failures. On exhaustion the last
    /// transport error is returned with the number of attempts made.
    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse, PetfinderError> {
        let mut retry = 0;
        loop {
            match self.inner.execute(request) {
                Ok(response) => return Ok(response),
                Err(err) if retry < self.policy.max_retries => {
                    let delay = self.policy.delay_for_retry(retry);
                    warn!(
                        operation = %request.operation,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        remaining = self.policy.max_retries - retry - 1,
                        "Request failed, retrying"
                    );
                    self.sleeper.sleep(delay);
                    retry += 1;
                }
                Err(err) => return Err(exhausted(retry + 1, err)),
            }
        }
    }
}

fn exhausted(attempts: u32, source: TransportError) -> PetfinderError {
    PetfinderError::Transport { attempts, source }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::error::TransportErrorKind;

    struct Scripted {
        outcomes: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
        calls: RefCell<u32>,
    }

    impl Scripted {
        fn failing_then_ok(failures: usize) -> Self {
            let mut outcomes: VecDeque<_> = (0..failures)
                .map(|i| {
                    Err(TransportError::new(
                        TransportErrorKind::Connect,
                        format!("refused #{i}"),
                    ))
                })
                .collect();
            outcomes.push_back(Ok(HttpResponse::ok("{}")));
            Self {
                outcomes: RefCell::new(outcomes),
                calls: RefCell::new(0),
            }
        }
    }

    impl Transport for Scripted {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            *self.calls.borrow_mut() += 1;
            self.outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::new(TransportErrorKind::Other, "script exhausted")))
        }
    }

    #[derive(Default)]
    struct Recorded(RefCell<Vec<Duration>>);

    impl Sleep for &Recorded {
        fn sleep(&self, duration: Duration) {
            self.0.borrow_mut().push(duration);
        }
    }

    fn request() -> HttpRequest {
        HttpRequest {
            operation: "pet.find".to_string(),
            path: "http://localhost/pet.find".to_string(),
            query: Vec::new(),
        }
    }

    #[test]
    fn default_policy_matches_upstream_client() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 4);
        assert_eq!(policy.min_wait, Duration::from_millis(600));
        assert_eq!(policy.max_wait, Duration::from_secs(5));
    }

    #[test]
    fn delays_double_then_cap() {
        let policy = RetryPolicy::default();
        let delays: Vec<u128> = (0..6).map(|i| policy.delay_for_retry(i).as_millis()).collect();
        assert_eq!(delays, vec![600, 1200, 2400, 4800, 5000, 5000]);
    }

    #[test]
    fn large_retry_index_saturates_at_max_wait() {
        assert_eq!(RetryPolicy::default().delay_for_retry(40), Duration::from_secs(5));
    }

    #[test]
    fn three_failures_then_success_sleeps_three_times() {
        let sleeps = Recorded::default();
        let transport = Retrying::with_sleeper(
            Scripted::failing_then_ok(3),
            RetryPolicy::default(),
            &sleeps,
        );
        let response = transport.send(&request()).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(*transport.inner().calls.borrow(), 4);
        assert_eq!(
            *sleeps.0.borrow(),
            vec![
                Duration::from_millis(600),
                Duration::from_millis(1200),
                Duration::from_millis(2400),
            ]
        );
    }

    #[test]
    fn exhaustion_returns_last_error_with_attempt_count() {
        let sleeps = Recorded::default();
        let transport = Retrying::with_sleeper(
            Scripted::failing_then_ok(10),
            RetryPolicy::default(),
            &sleeps,
        );
        let err = transport.send(&request()).unwrap_err();
        match err {
            PetfinderError::Transport { attempts, source } => {
                assert_eq!(attempts, 5);
                assert_eq!(source.message(), "refused #4");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(sleeps.0.borrow().len(), 4);
    }

    #[test]
    fn no_retry_policy_makes_one_attempt() {
        let sleeps = Recorded::default();
        let transport = Retrying::with_sleeper(Scripted::failing_then_ok(1), RetryPolicy::none(), &sleeps);
        assert!(matches!(
            transport.send(&request()),
            Err(PetfinderError::Transport { attempts: 1, .. })
        ));
        assert!(sleeps.0.borrow().is_empty());
    }

    #[test]
    fn error_status_is_not_retried() {
        struct ServerError(RefCell<u32>);
        impl Transport for ServerError {
            fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
                *self.0.borrow_mut() += 1;
                Ok(HttpResponse::new(503, "unavailable"))
            }
        }

        let sleeps = Recorded::default();
        let transport = Retrying::with_sleeper(ServerError(RefCell::new(0)), RetryPolicy::default(), &sleeps);
        let response = transport.send(&request()).unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(*transport.inner().0.borrow(), 1);
        assert!(sleeps.0.borrow().is_empty());
    }
}
