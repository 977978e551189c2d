//! Wait Mechanisms
//!
//! Condition waits replace fixed delays: a wait polls an async predicate at
//! a fixed interval until it holds or the budget runs out. There is no blind
//! sleep primitive in this crate.

use crate::result::{RoomingError, RoomingResult};
use std::future::Future;
use std::time::{Duration, Instant};

/// Default timeout for element-level waits (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default timeout for navigation-level waits (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options sized for page loads
    #[must_use]
    pub const fn navigation() -> Self {
        Self {
            timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of predicate evaluations
    pub attempts: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

/// Poll `predicate` until it returns `true` or the timeout elapses.
///
/// The predicate is evaluated at least once, even with a zero timeout.
/// Errors from the predicate abort the wait immediately.
pub async fn wait_until<F, Fut>(
    description: &str,
    options: WaitOptions,
    mut predicate: F,
) -> RoomingResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RoomingResult<bool>>,
{
    let start = Instant::now();
    let mut attempts = 0;
    loop {
        attempts += 1;
        if predicate().await? {
            tracing::trace!(waited_for = description, attempts, "condition met");
            return Ok(WaitResult {
                elapsed: start.elapsed(),
                attempts,
                waited_for: description.to_string(),
            });
        }
        if start.elapsed() >= options.timeout() {
            return Err(RoomingError::Timeout {
                ms: options.timeout_ms,
                waited_for: description.to_string(),
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// Poll `probe` until it yields `Some`, returning the value.
pub async fn wait_for_value<T, F, Fut>(
    description: &str,
    options: WaitOptions,
    mut probe: F,
) -> RoomingResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RoomingResult<Option<T>>>,
{
    let start = Instant::now();
    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }
        if start.elapsed() >= options.timeout() {
            return Err(RoomingError::Timeout {
                ms: options.timeout_ms,
                waited_for: description.to_string(),
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
            assert_eq!(WaitOptions::navigation().timeout_ms, 30_000);
        }

        #[test]
        fn test_builders() {
            let opts = WaitOptions::new().with_timeout(200).with_poll_interval(5);
            assert_eq!(opts.timeout(), Duration::from_millis(200));
            assert_eq!(opts.poll_interval(), Duration::from_millis(5));
        }
    }

    mod wait_until_tests {
        use super::*;

        #[tokio::test]
        async fn test_immediate_success() {
            let result = wait_until("always", WaitOptions::new(), || async { Ok(true) })
                .await
                .unwrap();
            assert_eq!(result.attempts, 1);
            assert_eq!(result.waited_for, "always");
        }

        #[tokio::test]
        async fn test_eventual_success() {
            let calls = AtomicU32::new(0);
            let opts = WaitOptions::new().with_timeout(1000).with_poll_interval(1);
            let result = wait_until("third try", opts, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n >= 2) }
            })
            .await
            .unwrap();
            assert_eq!(result.attempts, 3);
        }

        #[tokio::test]
        async fn test_timeout_names_condition() {
            let opts = WaitOptions::new().with_timeout(10).with_poll_interval(1);
            let err = wait_until("never", opts, || async { Ok(false) })
                .await
                .unwrap_err();
            match err {
                RoomingError::Timeout { ms, waited_for } => {
                    assert_eq!(ms, 10);
                    assert_eq!(waited_for, "never");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_zero_timeout_still_checks_once() {
            let opts = WaitOptions::new().with_timeout(0);
            assert!(wait_until("once", opts, || async { Ok(true) }).await.is_ok());
        }

        #[tokio::test]
        async fn test_predicate_error_aborts() {
            let err = wait_until("broken", WaitOptions::new(), || async {
                Err::<bool, _>(RoomingError::assertion("bad probe"))
            })
            .await
            .unwrap_err();
            assert!(matches!(err, RoomingError::AssertionFailed { .. }));
        }

        #[tokio::test]
        async fn test_wait_for_value() {
            let calls = AtomicU32::new(0);
            let opts = WaitOptions::new().with_poll_interval(1);
            let value = wait_for_value("value", opts, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok((n == 1).then_some(42)) }
            })
            .await
            .unwrap();
            assert_eq!(value, 42);
        }
    }
}
