//! Rate-limit aware retry loop.
//!
//! A rate-limited call is retried after a backoff sleep with no attempt
//! limit. Any other error is returned at once. The loop only stops early when
//! its cancellation token fires.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::ApiError;

/// Backoff strategy between rate-limited attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Sleep the same amount before every retry.
    Fixed(Duration),
    /// Start at `base`, double on every retry, never exceed `max`.
    Exponential { base: Duration, max: Duration },
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Exponential {
            base: Duration::from_secs(5),
            max: Duration::from_secs(10 * 60),
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0 for the first retry).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, max } => {
                base.saturating_mul(2u32.saturating_pow(attempt)).min(max)
            }
        }
    }
}

/// Something that can wait for a duration.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        tokio::time::sleep(duration)
    }
}

/// Call `op` until it succeeds or fails with something other than a rate
/// limit.
pub async fn retry_rate_limited<T, F, Fut, S>(
    backoff: &Backoff,
    sleeper: &S,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
    S: Sleeper,
{
    let mut attempt: u32 = 0;

    loop {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ApiError::Cancelled),
            result = op() => result,
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_rate_limited() => {
                let delay = backoff.delay(attempt);
                tracing::warn!(
                    attempt,
                    "{}; sleeping {} before retry",
                    e,
                    humantime::format_duration(delay)
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(ApiError::Cancelled),
                    _ = sleeper.sleep(delay) => {}
                }

                attempt = attempt.saturating_add(1);
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Mutex;

    /// Records requested sleeps and returns immediately.
    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl RecordingSleeper {
        fn slept(&self) -> Vec<Duration> {
            self.slept.lock().unwrap().clone()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
            let mut slept = self.slept.lock().unwrap();
            slept.push(duration);
            if let Some((n, token)) = &self.cancel_after {
                if slept.len() >= *n {
                    token.cancel();
                }
            }
            std::future::ready(())
        }
    }

    fn rate_limited() -> ApiError {
        ApiError::RateLimited("API_RATE_LIMIT".to_string())
    }

    #[test]
    fn test_exponential_backoff() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(0), Duration::from_secs(5));
        assert_eq!(backoff.delay(1), Duration::from_secs(10));
        assert_eq!(backoff.delay(2), Duration::from_secs(20));
        assert_eq!(backoff.delay(6), Duration::from_secs(320));
        assert_eq!(backoff.delay(7), Duration::from_secs(600));
        assert_eq!(backoff.delay(40), Duration::from_secs(600));
        assert_eq!(backoff.delay(u32::MAX), Duration::from_secs(600));
    }

    #[test]
    fn test_fixed_backoff() {
        let backoff = Backoff::Fixed(Duration::from_secs(5));
        assert_eq!(backoff.delay(0), Duration::from_secs(5));
        assert_eq!(backoff.delay(9), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_succeeds_after_rate_limits() {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0);

        let result = retry_rate_limited(
            &Backoff::default(),
            &sleeper,
            &CancellationToken::new(),
            || {
                let n = calls.get();
                calls.set(n + 1);
                async move {
                    if n < 2 {
                        Err(rate_limited())
                    } else {
                        Ok("site")
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), "site");
        assert_eq!(calls.get(), 3);
        assert_eq!(
            sleeper.slept(),
            vec![Duration::from_secs(5), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn test_first_success_does_not_sleep() {
        let sleeper = RecordingSleeper::default();

        let result =
            retry_rate_limited(&Backoff::default(), &sleeper, &CancellationToken::new(), || async {
                Ok::<_, ApiError>(7)
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert!(sleeper.slept().is_empty());
    }

    #[tokio::test]
    async fn test_other_errors_fail_fast() {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0);

        let result: Result<(), ApiError> = retry_rate_limited(
            &Backoff::default(),
            &sleeper,
            &CancellationToken::new(),
            || {
                calls.set(calls.get() + 1);
                async { Err(ApiError::Transport("connection reset".to_string())) }
            },
        )
        .await;

        assert!(matches!(result, Err(ApiError::Transport(_))));
        assert_eq!(calls.get(), 1);
        assert!(sleeper.slept().is_empty());
    }

    #[tokio::test]
    async fn test_fixed_backoff_sleeps_constant() {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0);

        let result = retry_rate_limited(
            &Backoff::Fixed(Duration::from_secs(5)),
            &sleeper,
            &CancellationToken::new(),
            || {
                let n = calls.get();
                calls.set(n + 1);
                async move { if n < 3 { Err(rate_limited()) } else { Ok(n) } }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(sleeper.slept(), vec![Duration::from_secs(5); 3]);
    }

    #[tokio::test]
    async fn test_cancel_stops_endless_rate_limit() {
        let cancel = CancellationToken::new();
        let sleeper = RecordingSleeper {
            cancel_after: Some((4, cancel.clone())),
            ..Default::default()
        };

        let result: Result<(), ApiError> =
            retry_rate_limited(&Backoff::default(), &sleeper, &cancel, || async {
                Err(rate_limited())
            })
            .await;

        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert_eq!(sleeper.slept().len(), 4);
    }

    #[tokio::test]
    async fn test_already_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = Cell::new(0);

        let result = retry_rate_limited(&Backoff::default(), &TokioSleeper, &cancel, || async {
            calls.set(calls.get() + 1);
            Ok::<_, ApiError>(())
        })
        .await;

        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert_eq!(calls.get(), 0);
    }
}
