//! Retry policy types and configuration.

use std::time::Duration;

/// How many times to attempt an operation and how long to wait in between.
///
/// Policies are pure data: they describe retry behavior but don't execute it.
/// The defaults describe a single attempt with no waiting.
///
/// # Examples
///
/// ```rust
/// use resultflow::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .with_max_attempts(4)
///     .with_delay(Duration::from_millis(100))
///     .with_exponential(true);
///
/// // Waits double after each failed attempt: 100ms, 200ms, 400ms
/// assert_eq!(policy.base_delay_for(1), Duration::from_millis(100));
/// assert_eq!(policy.base_delay_for(2), Duration::from_millis(200));
/// assert_eq!(policy.base_delay_for(3), Duration::from_millis(400));
/// assert!(policy.is_exhausted(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    exponential: bool,
    jitter: Duration,
}

/// Information about a failed attempt that is about to be retried.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Wait before the next attempt, jitter included.
    pub wait: Duration,
}

impl RetryPolicy {
    /// One attempt, no delay, no backoff, no jitter.
    pub fn new() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
            exponential: false,
            jitter: Duration::ZERO,
        }
    }

    /// Set the total number of attempts, the first one included.
    ///
    /// Values below 1 are raised to 1.
    ///
    /// ```rust
    /// use resultflow::retry::RetryPolicy;
    ///
    /// assert_eq!(RetryPolicy::new().with_max_attempts(0).max_attempts(), 1);
    /// ```
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    /// Set the base delay between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Double the delay after every failed attempt.
    pub fn with_exponential(mut self, enabled: bool) -> Self {
        self.exponential = enabled;
        self
    }

    /// Add a random whole number of milliseconds in `[0, bound]` to each wait.
    pub fn with_jitter(mut self, bound: Duration) -> Self {
        self.jitter = bound;
        self
    }

    /// Total number of attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Base delay between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether the delay doubles per attempt.
    pub fn is_exponential(&self) -> bool {
        self.exponential
    }

    /// Upper bound of the random jitter.
    pub fn jitter(&self) -> Duration {
        self.jitter
    }

    /// Returns true once `attempt` (1-indexed) has used up the budget.
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }

    /// Wait after failed attempt `attempt` (1-indexed), before jitter.
    ///
    /// Constant: `delay`. Exponential: `delay * 2^(attempt - 1)`, saturating.
    pub fn base_delay_for(&self, attempt: u32) -> Duration {
        if !self.exponential {
            return self.delay;
        }
        let exponent = attempt.saturating_sub(1);
        let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.delay.saturating_mul(factor)
    }

    /// Wait after failed attempt `attempt`, jitter included.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay_for(attempt);
        let bound = self.jitter.as_millis().min(u64::MAX as u128) as u64;
        if bound == 0 {
            return base;
        }

        use rand::Rng;
        let mut rng = rand::rng();
        base.saturating_add(Duration::from_millis(rng.random_range(0..=bound)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
