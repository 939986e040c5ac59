//! Resending a stream query that the backend turned away before answering.
//!
//! Only opening the reply is ever repeated. Once a byte stream or complete
//! reply exists it belongs to the caller and nothing is replayed.

use std::future::Future;
use std::time::Duration;

use crate::ProviderError;

/// Operation label reported to [`ProviderOperationHooks`].
pub const STREAM_QUERY_OPERATION: &str = "stream_query";

/// How many times to open a stream query and how long to wait in between.
///
/// ```rust
/// use std::time::Duration;
/// use dprovider::{ProviderError, RetryPolicy};
///
/// let policy = RetryPolicy::new(3);
/// let throttled = ProviderError::rate_limited("quota").with_status(429);
/// assert!(policy.should_retry(1, &throttled));
/// assert!(!policy.should_retry(1, &ProviderError::transport("boom").with_status(500)));
/// assert_eq!(policy.delay_before(2), Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// A single attempt with no retries.
    pub fn disabled() -> Self {
        Self::new(1)
    }

    /// `attempt` is the one that just failed, counting from 1.
    pub fn should_retry(&self, attempt: u32, error: &ProviderError) -> bool {
        attempt < self.max_attempts && error.is_transient()
    }

    /// Pause before `attempt` (2 is the first retry), capped at `max_backoff`.
    ///
    /// Negative or non-finite settings collapse to no pause.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        let retries_so_far = attempt.saturating_sub(2).min(i32::MAX as u32) as i32;
        let factor = self.backoff_multiplier.max(0.0).powi(retries_so_far);
        let seconds = (self.initial_backoff.as_secs_f64() * factor)
            .min(self.max_backoff.as_secs_f64())
            .max(0.0);

        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
    }
}

pub trait ProviderOperationHooks: Send + Sync {
    fn on_attempt_start(&self, _operation: &str, _attempt: u32) {}

    fn on_retry_scheduled(
        &self,
        _operation: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &ProviderError,
    ) {
    }

    fn on_success(&self, _operation: &str, _attempts: u32) {}

    fn on_failure(&self, _operation: &str, _attempts: u32, _error: &ProviderError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ProviderOperationHooks for NoopOperationHooks {}

/// Opens a stream query, resending while the backend reports a transient refusal.
///
/// `open` receives the attempt number; `sleep` is the timer used between
/// attempts so callers pick their runtime.
pub async fn open_with_retry<T, Open, OpenFuture, Sleep, SleepFuture>(
    policy: &RetryPolicy,
    hooks: &dyn ProviderOperationHooks,
    mut open: Open,
    mut sleep: Sleep,
) -> Result<T, ProviderError>
where
    Open: FnMut(u32) -> OpenFuture,
    OpenFuture: Future<Output = Result<T, ProviderError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    let mut attempt = 1;

    loop {
        hooks.on_attempt_start(STREAM_QUERY_OPERATION, attempt);

        let error = match open(attempt).await {
            Ok(reply) => {
                hooks.on_success(STREAM_QUERY_OPERATION, attempt);
                return Ok(reply);
            }
            Err(error) => error,
        };

        if !policy.should_retry(attempt, &error) {
            hooks.on_failure(STREAM_QUERY_OPERATION, attempt, &error);
            return Err(error);
        }

        let delay = policy.delay_before(attempt + 1);
        tracing::debug!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            status = error.status,
            code = error.code.as_deref(),
            "backend refused stream query; resending"
        );
        hooks.on_retry_scheduled(STREAM_QUERY_OPERATION, attempt, delay, &error);
        sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::ProviderErrorKind;

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(250),
            backoff_multiplier: 2.0,
        }
    }

    #[test]
    fn only_transient_refusals_are_resent() {
        let policy = RetryPolicy::new(3);
        let throttled = ProviderError::rate_limited("quota").with_code("RESOURCE_EXHAUSTED");
        let server_bug = ProviderError::transport("boom").with_status(500);

        assert!(policy.should_retry(1, &throttled));
        assert!(policy.should_retry(2, &throttled));
        assert!(!policy.should_retry(3, &throttled));
        assert!(!policy.should_retry(1, &server_bug));
        assert!(!policy.should_retry(1, &ProviderError::authentication("expired")));
        assert!(!RetryPolicy::disabled().should_retry(1, &throttled));
    }

    #[test]
    fn delay_grows_from_initial_and_caps() {
        let policy = quick(5);

        assert_eq!(policy.delay_before(2), Duration::from_millis(100));
        assert_eq!(policy.delay_before(3), Duration::from_millis(200));
        assert_eq!(policy.delay_before(4), Duration::from_millis(250));
        assert_eq!(policy.delay_before(40), Duration::from_millis(250));
    }

    #[test]
    fn degenerate_multipliers_never_panic() {
        let negative = RetryPolicy {
            backoff_multiplier: -3.0,
            ..quick(5)
        };
        assert_eq!(negative.delay_before(2), Duration::from_millis(100));
        assert_eq!(negative.delay_before(3), Duration::ZERO);

        let nan = RetryPolicy {
            backoff_multiplier: f64::NAN,
            ..quick(5)
        };
        assert_eq!(nan.delay_before(3), Duration::ZERO);

        let infinite = RetryPolicy {
            backoff_multiplier: f64::INFINITY,
            ..quick(5)
        };
        assert_eq!(infinite.delay_before(3), Duration::from_millis(250));
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl RecordingHooks {
        fn push(&self, event: String) {
            self.events.lock().expect("events lock").push(event);
        }
    }

    impl ProviderOperationHooks for RecordingHooks {
        fn on_attempt_start(&self, operation: &str, attempt: u32) {
            self.push(format!("start:{operation}:{attempt}"));
        }

        fn on_retry_scheduled(
            &self,
            operation: &str,
            attempt: u32,
            delay: Duration,
            _error: &ProviderError,
        ) {
            self.push(format!("retry:{operation}:{attempt}:{}ms", delay.as_millis()));
        }

        fn on_success(&self, operation: &str, attempts: u32) {
            self.push(format!("success:{operation}:{attempts}"));
        }

        fn on_failure(&self, operation: &str, attempts: u32, error: &ProviderError) {
            self.push(format!("failure:{operation}:{attempts}:{:?}", error.kind));
        }
    }

    #[tokio::test]
    async fn unavailable_backend_is_resent_until_it_answers() {
        let hooks = RecordingHooks::default();
        let sleeps = Mutex::new(Vec::new());

        let reply = open_with_retry(
            &quick(3),
            &hooks,
            |attempt| async move {
                if attempt < 3 {
                    Err(ProviderError::unavailable("warming up").with_status(503))
                } else {
                    Ok(attempt)
                }
            },
            |delay| {
                sleeps.lock().expect("sleep lock").push(delay);
                async {}
            },
        )
        .await;

        assert_eq!(reply.expect("third attempt answers"), 3);
        assert_eq!(
            *sleeps.lock().expect("sleep lock"),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
        assert_eq!(
            *hooks.events.lock().expect("events lock"),
            vec![
                "start:stream_query:1",
                "retry:stream_query:1:100ms",
                "start:stream_query:2",
                "retry:stream_query:2:200ms",
                "start:stream_query:3",
                "success:stream_query:3",
            ]
        );
    }

    #[tokio::test]
    async fn internal_server_error_is_not_resent() {
        let hooks = RecordingHooks::default();
        let mut calls = 0;

        let error = open_with_retry::<(), _, _, _, _>(
            &quick(5),
            &hooks,
            |_| {
                calls += 1;
                async { Err(ProviderError::transport("boom").with_status(500)) }
            },
            |_| async {},
        )
        .await
        .expect_err("500 is final");

        assert_eq!(error.kind, ProviderErrorKind::Transport);
        assert_eq!(calls, 1);
        assert_eq!(
            *hooks.events.lock().expect("events lock"),
            vec!["start:stream_query:1", "failure:stream_query:1:Transport"]
        );
    }
}
