//! Chaining steps over an outcome
//!
//! Two families of operations drive steps:
//!
//! - [`Outcome::then`] / [`Outcome::otherwise`] trap a raised error and turn
//!   it into a failure whose metadata records the step under `failed_step`
//! - [`Outcome::then_unsafe`] lets the raised error escape to the caller
//!
//! [`Pipeline`] runs an ordered list of steps over a single value, threading
//! the metadata through and stopping at the first failure.
//!
//! # Examples
//!
//! ```
//! use resultflow::{meta, Outcome, StepOutput};
//!
//! let total = Outcome::<_, String>::success_with(vec![3, 4], meta! { "cart" => "c-9" })
//!     .then(|items, _meta| StepOutput::Value(items.iter().sum::<i32>()))
//!     .then(|sum, _meta| if sum > 5 { Ok(StepOutput::Value(sum)) } else { Err("too small") });
//!
//! assert_eq!(total.value(), Some(&7));
//! assert_eq!(total.meta().get("cart").and_then(|v| v.as_str()), Some("c-9"));
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::meta::Meta;
use crate::outcome::Outcome;
use crate::step::{self, IntoStepOutput, Step, StepOutput, StepResult};

/// Metadata key naming the step that raised.
pub const FAILED_STEP_KEY: &str = "failed_step";

/// Resolve a step's result against the metadata it ran with, trapping raises.
pub(crate) fn settle<'n, O, F>(
    result: StepResult<O, F>,
    meta: Meta,
    name: impl FnOnce() -> Cow<'n, str>,
) -> Outcome<O, F> {
    match result {
        Ok(output) => output.into_outcome(meta),
        Err(error) => {
            let name = name();
            #[cfg(feature = "tracing")]
            tracing::debug!(failed_step = %name, "step raised; converted to failure");
            Outcome::failure_with(error, meta.with(FAILED_STEP_KEY, name))
        }
    }
}

/// Resolve a step's result, letting raises escape.
fn settle_unsafe<O, F>(result: StepResult<O, F>, meta: Meta) -> Result<Outcome<O, F>, F> {
    result.map(|output| output.into_outcome(meta))
}

impl<S, F> Outcome<S, F> {
    /// Run `f` on a success; failures pass through.
    ///
    /// The closure may return a bare [`StepOutput`](crate::StepOutput), an
    /// `Outcome`, or a `Result` of either. An `Err` becomes a failure with
    /// `failed_step = "closure"` added to the current metadata.
    pub fn then<O, R>(self, f: impl FnOnce(S, &Meta) -> R) -> Outcome<O, F>
    where
        R: IntoStepOutput<O, F>,
    {
        let (result, meta) = self.into_parts();
        match result {
            Ok(value) => {
                let out = f(value, &meta).into_step_result();
                settle(out, meta, || Cow::Borrowed("closure"))
            }
            Err(error) => Outcome::failure_with(error, meta),
        }
    }

    /// Run a [`Step`] on a success; failures pass through.
    ///
    /// A raised error is recorded under `failed_step` with the step's name.
    pub fn then_step<O, St>(self, mut step: St) -> Outcome<O, F>
    where
        St: Step<S, O, F>,
    {
        let (result, meta) = self.into_parts();
        match result {
            Ok(value) => {
                let out = step.invoke(value, &meta);
                settle(out, meta, || step.name())
            }
            Err(error) => Outcome::failure_with(error, meta),
        }
    }

    /// Like [`Outcome::then`], but a raised error is returned as `Err`.
    ///
    /// ```
    /// use resultflow::{Outcome, StepOutput};
    ///
    /// fn parse(input: &str) -> Result<Outcome<i32, String>, String> {
    ///     Outcome::success(input)
    ///         .then_unsafe(|s, _| s.parse::<i32>().map(StepOutput::Value).map_err(|e| e.to_string()))
    /// }
    ///
    /// assert!(parse("12").is_ok());
    /// assert!(parse("x").is_err());
    /// ```
    pub fn then_unsafe<O, R>(self, f: impl FnOnce(S, &Meta) -> R) -> Result<Outcome<O, F>, F>
    where
        R: IntoStepOutput<O, F>,
    {
        let (result, meta) = self.into_parts();
        match result {
            Ok(value) => {
                let out = f(value, &meta).into_step_result();
                settle_unsafe(out, meta)
            }
            Err(error) => Ok(Outcome::failure_with(error, meta)),
        }
    }

    /// Like [`Outcome::then_step`], but a raised error is returned as `Err`.
    pub fn then_unsafe_step<O, St>(self, mut step: St) -> Result<Outcome<O, F>, F>
    where
        St: Step<S, O, F>,
    {
        let (result, meta) = self.into_parts();
        match result {
            Ok(value) => {
                let out = step.invoke_unsafe(value, &meta);
                settle_unsafe(out, meta)
            }
            Err(error) => Ok(Outcome::failure_with(error, meta)),
        }
    }

    /// Run `f` on a failure; successes pass through.
    ///
    /// The handler receives the error and the metadata. Returning a bare
    /// value recovers; returning a failing outcome replaces the failure. A
    /// raised error becomes a failure with `failed_step` recorded.
    ///
    /// ```
    /// use resultflow::{Outcome, StepOutput};
    ///
    /// let o = Outcome::<i32, _>::failure("missing")
    ///     .otherwise(|_err, _meta| StepOutput::<_, String>::Value(0));
    /// assert_eq!(o.value(), Some(&0));
    /// ```
    pub fn otherwise<E, R>(self, f: impl FnOnce(F, &Meta) -> R) -> Outcome<S, E>
    where
        R: IntoStepOutput<S, E>,
    {
        let (result, meta) = self.into_parts();
        match result {
            Ok(value) => Outcome::success_with(value, meta),
            Err(error) => {
                let out = f(error, &meta).into_step_result();
                settle(out, meta, || Cow::Borrowed("closure"))
            }
        }
    }

    /// Run a [`Step`] over the failure payload; successes pass through.
    pub fn otherwise_step<E, St>(self, mut step: St) -> Outcome<S, E>
    where
        St: Step<F, S, E>,
    {
        let (result, meta) = self.into_parts();
        match result {
            Ok(value) => Outcome::success_with(value, meta),
            Err(error) => {
                let out = step.invoke(error, &meta);
                settle(out, meta, || step.name())
            }
        }
    }
}

/// An ordered list of steps over a single value type.
///
/// Each step receives the previous step's value. A step that returns an
/// `Outcome` replaces the metadata; a bare value keeps it. The first failure,
/// returned or raised, ends the run.
///
/// A `Pipeline` is itself a [`Step`], so pipelines nest. Nested inside
/// [`Pipeline::run_unsafe`] or [`Outcome::then_unsafe_step`], an inner raised
/// error escapes instead of being trapped.
///
/// Every step maps `T` to `T`, so a pipeline cannot change the value type
/// between steps. Chain [`Outcome::then_step`] for stages that convert:
///
/// ```
/// use resultflow::{Outcome, Pipeline, StepOutput};
///
/// let trim = Pipeline::<String, String>::new().then(|s, _| StepOutput::Value(s.trim().to_string()));
/// let len = Outcome::<_, String>::success("  abc ".to_string())
///     .then_step(trim)
///     .then(|s, _| StepOutput::Value(s.len()));
/// assert_eq!(len.value(), Some(&3));
/// ```
///
/// ```
/// use resultflow::{meta, Outcome, Pipeline, StepOutput};
///
/// let mut checkout = Pipeline::<i32, String>::new()
///     .then(|n, _| StepOutput::Value(n * 2))
///     .then(|n, meta| Outcome::success_with(n + 1, meta.clone().with("priced", true)));
///
/// let out = checkout.run(20, meta! { "order" => 7 });
/// assert_eq!(out.value(), Some(&41));
/// assert_eq!(out.meta().len(), 2);
/// ```
pub struct Pipeline<'a, T, F> {
    steps: Vec<Box<dyn Step<T, T, F> + 'a>>,
}

impl<'a, T, F> Pipeline<'a, T, F> {
    /// An empty pipeline; running it returns the input as a success.
    pub fn new() -> Self {
        Pipeline { steps: Vec::new() }
    }

    /// Append a closure step.
    pub fn then<C, R>(self, f: C) -> Self
    where
        C: FnMut(T, &Meta) -> R + 'a,
        R: IntoStepOutput<T, F> + 'a,
    {
        self.step(step::from_fn(f))
    }

    /// Append any [`Step`].
    pub fn step(mut self, step: impl Step<T, T, F> + 'a) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if no steps were added.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order over `input`, starting from `meta`.
    ///
    /// A raised error ends the run as a failure with `failed_step` recorded.
    pub fn run(&mut self, input: T, meta: Meta) -> Outcome<T, F> {
        match self.drive(input, meta, true) {
            Ok(outcome) => outcome,
            Err(error) => Outcome::failure(error),
        }
    }

    /// Like [`Pipeline::run`], but a raised error is returned as `Err`.
    pub fn run_unsafe(&mut self, input: T, meta: Meta) -> Result<Outcome<T, F>, F> {
        self.drive(input, meta, false)
    }

    fn drive(&mut self, input: T, meta: Meta, trap: bool) -> Result<Outcome<T, F>, F> {
        let mut current = input;
        let mut meta = meta;

        for step in self.steps.iter_mut() {
            let out = if trap {
                let out = step.invoke(current, &meta);
                settle(out, meta, || step.name())
            } else {
                let out = step.invoke_unsafe(current, &meta);
                settle_unsafe(out, meta)?
            };

            let (result, next_meta) = out.into_parts();
            match result {
                Ok(value) => {
                    current = value;
                    meta = next_meta;
                }
                Err(error) => return Ok(Outcome::failure_with(error, next_meta)),
            }
        }

        Ok(Outcome::success_with(current, meta))
    }
}

impl<T, F> Default for Pipeline<'_, T, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F> fmt::Debug for Pipeline<'_, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.steps.iter().map(|s| s.name().into_owned()).collect();
        f.debug_struct("Pipeline").field("steps", &names).finish()
    }
}

impl<T, F> Step<T, T, F> for Pipeline<'_, T, F> {
    fn invoke(&mut self, input: T, meta: &Meta) -> StepResult<T, F> {
        Ok(self.run(input, meta.clone()).into())
    }

    fn invoke_unsafe(&mut self, input: T, meta: &Meta) -> StepResult<T, F> {
        self.run_unsafe(input, meta.clone()).map(StepOutput::from)
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed("Pipeline")
    }
}
