//! Bounds on ledger retries and lock waits.

use std::time::Duration;

/// Default number of attempts for each compare-and-swap loop.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default wait for a ledger lock before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS);
/// [`DEFAULT_LOCK_TIMEOUT`] in milliseconds.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2000;

/// Retry and timeout limits applied by the application ledger.
///
/// No ledger operation blocks indefinitely: lock waits end after
/// `lock_timeout` and revision conflicts are retried at most `max_attempts`
/// times before the operation reports a transient storage failure.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use jobboard::domain::RetryPolicy;
///
/// let policy = RetryPolicy::new(0, Duration::from_millis(50));
/// assert_eq!(policy.max_attempts(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    lock_timeout: Duration,
}

impl RetryPolicy {
    /// Build a policy; at least one attempt is always made.
    pub fn new(max_attempts: u32, lock_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            lock_timeout,
        }
    }

    /// Upper bound on attempts per compare-and-swap loop.
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Maximum wait for a ledger lock.
    pub const fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_LOCK_TIMEOUT)
    }
}
