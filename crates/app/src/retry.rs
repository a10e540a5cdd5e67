//! Retry of whole ledger operations on transient errors.
//!
//! An aborted unit of work leaves nothing behind, so a transfer that failed
//! with a lock timeout, deadlock or serialization failure can simply be run
//! again. Every other error is returned at once.

use std::{future::Future, time::Duration};

use ledger::ResultLedger;
use tracing::warn;

use crate::settings;

#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts the first try; zero is treated as one.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Pause after the `attempt`-th failure. Saturates instead of overflowing.
    fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }

    /// Run `op` until it succeeds, fails for good, or attempts run out.
    /// Waits `backoff * attempt` between tries.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> ResultLedger<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ResultLedger<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let delay = self.delay(attempt);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        ?delay,
                        error = %err,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

impl From<&settings::Transfer> for RetryPolicy {
    fn from(settings: &settings::Transfer) -> Self {
        Self::new(settings.max_attempts, settings.backoff())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use ledger::LedgerError;
    use sea_orm::DbErr;

    use super::*;

    fn conflict() -> LedgerError {
        LedgerError::Conflict(DbErr::Custom("deadlock detected".to_string()))
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let value = policy
            .run(|| async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(conflict())
                } else {
                    Ok(7)
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::new(2, Duration::from_millis(1));

        let err = policy
            .run(|| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(conflict())
            })
            .await
            .unwrap_err();

        assert!(err.is_transient());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::from_millis(1));

        let err = policy
            .run(|| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(LedgerError::KeyNotFound("account 9".to_string()))
            })
            .await
            .unwrap_err();

        assert_eq!(err, LedgerError::KeyNotFound("account 9".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn delay_grows_linearly_and_saturates() {
        let policy = RetryPolicy::new(3, Duration::from_millis(50));
        assert_eq!(policy.delay(1), Duration::from_millis(50));
        assert_eq!(policy.delay(2), Duration::from_millis(100));

        let huge = RetryPolicy::new(3, Duration::MAX);
        assert_eq!(huge.delay(2), Duration::MAX);
    }

    #[test]
    fn zero_attempts_still_runs_once() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts, 1);
    }
}
