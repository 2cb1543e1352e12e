//! Retrying operations that produce outcomes.
//!
//! This module follows the same split as the rest of the crate:
//!
//! - **Pure core**: [`RetryPolicy`] is just data (attempt budget, delay,
//!   backoff, jitter) and its wait calculation has no side effects
//! - **Imperative shell**: [`Retry`] runs the operation, consults the
//!   predicate, fires the `on_retry` hook and sleeps between attempts
//!
//! # Quick Start
//!
//! ```rust
//! use resultflow::retry::Retry;
//! use resultflow::{Outcome, StepOutput};
//! use std::time::Duration;
//!
//! let mut remaining = 2;
//! let out: Outcome<u32, String> = Retry::config()
//!     .max_attempts(3)
//!     .delay(Duration::from_millis(1))
//!     .exponential(true)
//!     .when(|err: &String, _attempt| err.starts_with("transient"))
//!     .attempt(|| {
//!         if remaining > 0 {
//!             remaining -= 1;
//!             Err("transient: busy".to_string())
//!         } else {
//!             Ok(StepOutput::Value(200))
//!         }
//!     });
//!
//! assert_eq!(out.value(), Some(&200));
//! ```
//!
//! # Waiting
//!
//! After failed attempt `n` the executor waits `delay`, or
//! `delay * 2^(n - 1)` with exponential backoff, plus a random whole number
//! of milliseconds up to the jitter bound. Waits of zero skip the sleep.
//! Sleeping blocks the current thread.

mod policy;
mod retrier;

pub use policy::{RetryEvent, RetryPolicy};
pub use retrier::{retrier, Retry, RETRY_META_KEY};
