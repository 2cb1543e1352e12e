//! Bracket pattern for safe resource management.
//!
//! [`bracket`] acquires a resource, uses it, and always releases it once the
//! use phase has run. Failure precedence:
//!
//! | use       | release | result                                              |
//! |-----------|---------|-----------------------------------------------------|
//! | success   | ok      | the use outcome                                     |
//! | failure   | ok      | the use outcome                                     |
//! | failure   | error   | the use failure, release error recorded in metadata |
//! | success   | error   | failure with the release error and the use metadata |
//!
//! A failed acquisition returns immediately and nothing is released.
//!
//! # Example
//!
//! ```rust
//! use resultflow::bracket::bracket;
//! use resultflow::{Outcome, StepOutput};
//!
//! struct Conn { open: bool }
//!
//! let out: Outcome<usize, String> = bracket(
//!     || StepOutput::Value(Conn { open: true }),
//!     |conn| if conn.open { Ok(StepOutput::Value(3)) } else { Err("closed") },
//!     |mut conn| {
//!         conn.open = false;
//!         Ok::<(), String>(())
//!     },
//! );
//!
//! assert_eq!(out.value(), Some(&3));
//! ```

use std::any::type_name;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::meta::{Meta, Value};
use crate::outcome::Outcome;
use crate::step::IntoStepOutput;

/// Metadata key under which a release error is recorded when the use phase
/// already failed.
pub const RELEASE_ERROR_KEY: &str = "bracket.release_exception";

/// Acquire a resource, use it, and release it.
///
/// `acquire` and `use_fn` may return anything a step may return; a raised
/// `Err` is treated as a failure. `release` runs exactly once after `use_fn`,
/// including when `use_fn` panics, in which case the panic is resumed after
/// release.
///
/// When the use phase failed and release also fails, the release error is
/// stored under [`RELEASE_ERROR_KEY`] as `{type, message}`, where `message`
/// is the error's `Debug` rendering.
pub fn bracket<Res, T, F, E, AR, UR>(
    acquire: impl FnOnce() -> AR,
    use_fn: impl FnOnce(&mut Res) -> UR,
    release: impl FnOnce(Res) -> Result<(), E>,
) -> Outcome<T, F>
where
    AR: IntoStepOutput<Res, F>,
    UR: IntoStepOutput<T, F>,
    E: Into<F> + fmt::Debug,
{
    let (acquired, acquire_meta) = resolve(acquire()).into_parts();
    let mut resource = match acquired {
        Ok(resource) => resource,
        Err(error) => return Outcome::failure_with(error, acquire_meta),
    };

    let used = panic::catch_unwind(AssertUnwindSafe(|| resolve(use_fn(&mut resource))));
    let released = release(resource);

    let used = match used {
        Ok(used) => used,
        Err(payload) => {
            if let Err(ref rel_err) = released {
                #[cfg(feature = "tracing")]
                tracing::error!("Resource release failed after panic: {:?}", rel_err);
                #[cfg(not(feature = "tracing"))]
                eprintln!("Resource release failed after panic: {:?}", rel_err);
            }
            panic::resume_unwind(payload)
        }
    };

    match released {
        Ok(()) => used,
        Err(rel_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("Resource release failed: {:?}", rel_err);
            #[cfg(not(feature = "tracing"))]
            eprintln!("Resource release failed: {:?}", rel_err);

            if used.is_failure() {
                used.merge_meta(Meta::new().with(RELEASE_ERROR_KEY, describe(&rel_err)))
            } else {
                let meta = used.into_meta();
                Outcome::failure_with(rel_err.into(), meta)
            }
        }
    }
}

fn resolve<O, F>(output: impl IntoStepOutput<O, F>) -> Outcome<O, F> {
    match output.into_step_result() {
        Ok(output) => output.into_outcome(Meta::new()),
        Err(error) => Outcome::failure(error),
    }
}

fn describe<E: fmt::Debug>(error: &E) -> Value {
    Meta::new()
        .with("type", type_name::<E>())
        .with("message", format!("{:?}", error))
        .into()
}

impl<T, F> Outcome<T, F> {
    /// Shortcut for [`bracket`].
    pub fn bracket<Res, E, AR, UR>(
        acquire: impl FnOnce() -> AR,
        use_fn: impl FnOnce(&mut Res) -> UR,
        release: impl FnOnce(Res) -> Result<(), E>,
    ) -> Self
    where
        AR: IntoStepOutput<Res, F>,
        UR: IntoStepOutput<T, F>,
        E: Into<F> + fmt::Debug,
    {
        bracket(acquire, use_fn, release)
    }
}
