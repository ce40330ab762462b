//! Bounded retry for order submission
//!
//! A post-only order is rejected when the book moves between computing the
//! price and submitting the order, because it would immediately match and
//! take liquidity. That rejection is expected and worth retrying after a short
//! wait. Every other failure (bad symbol, insufficient funds, auth) is
//! returned on the first attempt.
//!
//! Classification uses the exchange error code, never the message text.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use super::error::{BackpackError, BackpackResult};

/// Error code the exchange returns for "order would immediately match"
pub const IMMEDIATE_MATCH_CODE: &str = "INVALID_ORDER";

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Fixed wait between attempts
    pub delay: Duration,
    /// API error code that is treated as recoverable
    pub recoverable_code: String,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1),
            recoverable_code: IMMEDIATE_MATCH_CODE.to_string(),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_recoverable_code(mut self, code: impl Into<String>) -> Self {
        self.recoverable_code = code.into();
        self
    }

    pub fn is_recoverable(&self, err: &BackpackError) -> bool {
        err.api_code() == Some(self.recoverable_code.as_str())
    }
}

/// Run `operation` until it succeeds, fails with a non-recoverable error, or
/// the policy's attempts are used up.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> BackpackResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = BackpackResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    info!("Succeeded on attempt {}/{}", attempt, max_attempts);
                }
                return Ok(result);
            }
            Err(e) if policy.is_recoverable(&e) => {
                if attempt >= max_attempts {
                    warn!("Giving up after {} attempts: {}", attempt, e);
                    return Err(BackpackError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                warn!(
                    "Recoverable rejection (attempt {}/{}): {}. Retrying in {}ms",
                    attempt,
                    max_attempts,
                    e,
                    policy.delay.as_millis()
                );
                sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn immediate_match() -> BackpackError {
        BackpackError::Api {
            status: 400,
            code: IMMEDIATE_MATCH_CODE.to_string(),
            message: "Order would immediately match and take.".to_string(),
        }
    }

    fn insufficient_funds() -> BackpackError {
        BackpackError::Api {
            status: 400,
            code: "INSUFFICIENT_FUNDS".to_string(),
            message: "Insufficient funds".to_string(),
        }
    }

    #[test]
    fn test_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_secs(1));
        assert_eq!(policy.recoverable_code, "INVALID_ORDER");
    }

    #[test]
    fn test_classification_uses_code_only() {
        let policy = RetryPolicy::default();
        assert!(policy.is_recoverable(&immediate_match()));
        assert!(!policy.is_recoverable(&insufficient_funds()));

        // Same wording, different code
        let reworded = BackpackError::Api {
            status: 400,
            code: "INVALID_PRICE".to_string(),
            message: "Order would immediately match and take.".to_string(),
        };
        assert!(!policy.is_recoverable(&reworded));

        let http = BackpackError::Http {
            status: 400,
            body: "INVALID_ORDER".to_string(),
        };
        assert!(!policy.is_recoverable(&http));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_max_attempts_with_fixed_delay() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: BackpackResult<()> = with_retry(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(immediate_match()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        // four waits between five attempts, none after the last
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4));
        assert!(elapsed < Duration::from_secs(5));

        match result {
            Err(BackpackError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 5);
                assert_eq!(last.api_code(), Some(IMMEDIATE_MATCH_CODE));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_error_makes_one_attempt() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: BackpackResult<()> = with_retry(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(insufficient_funds()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(result.unwrap_err().api_code(), Some("INSUFFICIENT_FUNDS"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_rejections() {
        let policy = RetryPolicy::default().with_delay(Duration::from_millis(250));
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = with_retry(&policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(immediate_match())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_millis(750));
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_error_after_rejection_stops() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: BackpackResult<()> = with_retry(&policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 1 {
                    Err(immediate_match())
                } else {
                    Err(insufficient_funds())
                }
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.unwrap_err().api_code(), Some("INSUFFICIENT_FUNDS"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_tries_once() {
        let policy = RetryPolicy::default().with_max_attempts(0);
        let calls = AtomicU32::new(0);

        let result: BackpackResult<()> = with_retry(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(immediate_match()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(BackpackError::RetriesExhausted { attempts: 1, .. })
        ));
    }
}
