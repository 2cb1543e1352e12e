//! The retry executor.

use std::fmt;
use std::thread;
use std::time::Duration;

use super::policy::{RetryEvent, RetryPolicy};
use crate::meta::Meta;
use crate::outcome::Outcome;
use crate::step::{IntoStepOutput, StepOutput};

type Predicate<'a, F> = Box<dyn FnMut(&F, u32) -> bool + 'a>;
type Hook<'a, F> = Box<dyn FnMut(&RetryEvent<'_, F>) + 'a>;

/// Metadata key under which the attempt count is recorded.
pub const RETRY_META_KEY: &str = "retry";

/// A retry configuration that runs an operation until it succeeds or the
/// policy gives up.
///
/// Built fluently; every setter returns a new configuration.
///
/// # Examples
///
/// ```rust
/// use resultflow::retry::Retry;
/// use resultflow::{Outcome, StepOutput};
/// use std::time::Duration;
///
/// let mut calls = 0;
/// let out: Outcome<&str, String> = Retry::config()
///     .max_attempts(5)
///     .delay(Duration::from_millis(1))
///     .attach_attempt_meta(true)
///     .attempt(|| {
///         calls += 1;
///         if calls < 3 { Err("flaky".to_string()) } else { Ok(StepOutput::Value("done")) }
///     });
///
/// assert_eq!(out.value(), Some(&"done"));
/// assert_eq!(out.meta().get("retry").and_then(|r| r.get("attempts")).and_then(|v| v.as_i64()), Some(3));
/// ```
pub struct Retry<'a, F> {
    policy: RetryPolicy,
    attach_attempt_meta: bool,
    predicate: Option<Predicate<'a, F>>,
    on_retry: Option<Hook<'a, F>>,
}

impl<'a, F> Retry<'a, F> {
    /// Start from the defaults: one attempt, no delay, retry on any error.
    pub fn config() -> Self {
        Self::with_policy(RetryPolicy::new())
    }

    /// Start from an existing policy.
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Retry {
            policy,
            attach_attempt_meta: false,
            predicate: None,
            on_retry: None,
        }
    }

    /// Total number of attempts, clamped to at least 1.
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.policy = self.policy.with_max_attempts(n);
        self
    }

    /// Base delay between attempts.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.policy = self.policy.with_delay(delay);
        self
    }

    /// Double the delay after each failed attempt.
    pub fn exponential(mut self, enabled: bool) -> Self {
        self.policy = self.policy.with_exponential(enabled);
        self
    }

    /// Add up to `bound` of random delay to each wait.
    pub fn jitter(mut self, bound: Duration) -> Self {
        self.policy = self.policy.with_jitter(bound);
        self
    }

    /// Record `{"retry": {"attempts": n}}` in the final outcome's metadata.
    pub fn attach_attempt_meta(mut self, enabled: bool) -> Self {
        self.attach_attempt_meta = enabled;
        self
    }

    /// Retry only while `predicate(error, attempt)` returns true.
    ///
    /// The budget check runs first, so the predicate is never consulted after
    /// the last attempt.
    pub fn when(mut self, predicate: impl FnMut(&F, u32) -> bool + 'a) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Observe each failed attempt just before its wait.
    pub fn on_retry(mut self, hook: impl FnMut(&RetryEvent<'_, F>) + 'a) -> Self {
        self.on_retry = Some(Box::new(hook));
        self
    }

    /// The underlying policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` until it succeeds, the budget runs out, or the predicate
    /// declines.
    ///
    /// `op` may return anything a step may return. A raised error counts as a
    /// failed attempt and is retried like a returned failure.
    pub fn attempt<T, R>(mut self, mut op: impl FnMut() -> R) -> Outcome<T, F>
    where
        R: IntoStepOutput<T, F>,
    {
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            let outcome = match op().into_step_result() {
                Ok(StepOutput::Value(value)) => Outcome::success(value),
                Ok(StepOutput::Outcome(outcome)) => outcome,
                Err(error) => Outcome::failure(error),
            };

            let error = match outcome.error() {
                None => return self.finish(outcome, attempts),
                Some(error) => error,
            };

            if self.policy.is_exhausted(attempts) || !self.should_retry(error, attempts) {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempts, "giving up after failed attempt");
                return self.finish(outcome, attempts);
            }

            let wait = self.policy.delay_for(attempts);
            if let Some(hook) = self.on_retry.as_mut() {
                hook(&RetryEvent {
                    attempt: attempts,
                    error,
                    wait,
                });
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(attempt = attempts, wait_ms = wait.as_millis() as u64, "retrying failed attempt");

            if !wait.is_zero() {
                thread::sleep(wait);
            }
        }
    }

    fn should_retry(&mut self, error: &F, attempt: u32) -> bool {
        match self.predicate.as_mut() {
            Some(predicate) => predicate(error, attempt),
            None => true,
        }
    }

    fn finish<T>(&self, outcome: Outcome<T, F>, attempts: u32) -> Outcome<T, F> {
        if !self.attach_attempt_meta {
            return outcome;
        }
        let retry = Meta::new().with("attempts", attempts);
        outcome.merge_meta(Meta::new().with(RETRY_META_KEY, retry))
    }
}

impl<F> fmt::Debug for Retry<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("policy", &self.policy)
            .field("attach_attempt_meta", &self.attach_attempt_meta)
            .field("has_predicate", &self.predicate.is_some())
            .field("has_on_retry", &self.on_retry.is_some())
            .finish()
    }
}

impl<S, F> Outcome<S, F> {
    /// Retry `op` up to `times` attempts with a fixed or doubling delay.
    ///
    /// ```rust
    /// use resultflow::{Outcome, StepOutput};
    /// use std::time::Duration;
    ///
    /// let out: Outcome<i32, String> =
    ///     Outcome::retry(3, Duration::ZERO, false, || Err::<StepOutput<i32, String>, _>("down"));
    /// assert_eq!(out.error().map(String::as_str), Some("down"));
    /// ```
    pub fn retry<R>(times: u32, delay: Duration, exponential: bool, op: impl FnMut() -> R) -> Self
    where
        R: IntoStepOutput<S, F>,
    {
        Retry::config()
            .max_attempts(times)
            .delay(delay)
            .exponential(exponential)
            .attempt(op)
    }
}

/// A default retry configuration; the failure type is fixed by the operation
/// passed to [`Retry::attempt`].
///
/// ```rust
/// use resultflow::retry;
/// use resultflow::Outcome;
///
/// let out: Outcome<(), String> = retry::retrier().attempt(|| Outcome::failure("down".to_string()));
/// assert!(out.is_failure());
/// ```
pub fn retrier<'a, F>() -> Retry<'a, F> {
    Retry::config()
}
