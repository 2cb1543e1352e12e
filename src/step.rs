//! Steps: the callable units a pipeline runs
//!
//! A step receives the current value and a read-only view of the metadata
//! and returns a [`StepResult`]:
//!
//! - `Ok(StepOutput::Value(v))` continues with `v`, metadata unchanged
//! - `Ok(StepOutput::Outcome(o))` hands over `o`, including its metadata
//! - `Err(e)` raises `e`; the chaining operation decides whether it is
//!   trapped into a failure or propagated to the caller
//!
//! Closures are adapted with [`from_fn`]. Objects can participate through the
//! [`Handle`] or [`Execute`] capabilities, through [`Capabilities`] when the
//! capability is only known at runtime, or by binding a method with
//! [`method`].
//!
//! # Examples
//!
//! ```
//! use resultflow::step::{self, Step, StepOutput};
//! use resultflow::Meta;
//!
//! let mut double = step::from_fn(|x: i32, _meta: &Meta| Ok::<_, String>(StepOutput::Value(x * 2)));
//! let out: StepOutput<i32, String> = double.invoke(21, &Meta::new()).unwrap();
//! assert!(matches!(out, StepOutput::Value(42)));
//! ```

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::error::FlowError;
use crate::meta::Meta;
use crate::outcome::Outcome;

/// What a step hands back on a normal return.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutput<O, F> {
    /// A bare value; the incoming metadata is kept.
    Value(O),
    /// A complete outcome; its metadata replaces the incoming metadata.
    Outcome(Outcome<O, F>),
}

impl<O, F> StepOutput<O, F> {
    /// Resolve against the metadata that was current when the step ran.
    pub fn into_outcome(self, meta: Meta) -> Outcome<O, F> {
        match self {
            StepOutput::Value(value) => Outcome::success_with(value, meta),
            StepOutput::Outcome(outcome) => outcome,
        }
    }
}

impl<O, F> From<Outcome<O, F>> for StepOutput<O, F> {
    fn from(outcome: Outcome<O, F>) -> Self {
        StepOutput::Outcome(outcome)
    }
}

/// A step's return: normal output, or a raised error.
pub type StepResult<O, F> = Result<StepOutput<O, F>, F>;

/// Anything a step body may return.
///
/// Implemented for [`StepOutput`], [`Outcome`] and any `Result` wrapping one
/// of those whose error converts into the failure type.
pub trait IntoStepOutput<O, F> {
    /// Normalize into a [`StepResult`].
    fn into_step_result(self) -> StepResult<O, F>;
}

impl<O, F> IntoStepOutput<O, F> for StepOutput<O, F> {
    #[inline]
    fn into_step_result(self) -> StepResult<O, F> {
        Ok(self)
    }
}

impl<O, F> IntoStepOutput<O, F> for Outcome<O, F> {
    #[inline]
    fn into_step_result(self) -> StepResult<O, F> {
        Ok(StepOutput::Outcome(self))
    }
}

impl<O, F, X, E> IntoStepOutput<O, F> for Result<X, E>
where
    X: IntoStepOutput<O, F>,
    E: Into<F>,
{
    fn into_step_result(self) -> StepResult<O, F> {
        match self {
            Ok(output) => output.into_step_result(),
            Err(error) => Err(error.into()),
        }
    }
}

/// A unit of work in a pipeline.
pub trait Step<I, O, F> {
    /// Run the step.
    fn invoke(&mut self, input: I, meta: &Meta) -> StepResult<O, F>;

    /// Run the step on a path where raised errors must reach the caller.
    ///
    /// Steps that trap errors internally, such as a nested
    /// [`Pipeline`](crate::Pipeline), override this to let them escape.
    fn invoke_unsafe(&mut self, input: I, meta: &Meta) -> StepResult<O, F> {
        self.invoke(input, meta)
    }

    /// Name recorded under `failed_step` when the step raises.
    ///
    /// Defaults to the implementing type's name without its module path.
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(short_type_name(type_name::<Self>()))
    }
}

/// Last path segment of a type name, generics stripped.
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

impl<I, O, F, T> Step<I, O, F> for Box<T>
where
    T: Step<I, O, F> + ?Sized,
{
    fn invoke(&mut self, input: I, meta: &Meta) -> StepResult<O, F> {
        (**self).invoke(input, meta)
    }

    fn invoke_unsafe(&mut self, input: I, meta: &Meta) -> StepResult<O, F> {
        (**self).invoke_unsafe(input, meta)
    }

    fn name(&self) -> Cow<'_, str> {
        (**self).name()
    }
}

impl<I, O, F, T> Step<I, O, F> for &mut T
where
    T: Step<I, O, F> + ?Sized,
{
    fn invoke(&mut self, input: I, meta: &Meta) -> StepResult<O, F> {
        (**self).invoke(input, meta)
    }

    fn invoke_unsafe(&mut self, input: I, meta: &Meta) -> StepResult<O, F> {
        (**self).invoke_unsafe(input, meta)
    }

    fn name(&self) -> Cow<'_, str> {
        (**self).name()
    }
}

/// A closure adapted into a [`Step`]. Created by [`from_fn`].
pub struct FnStep<C, R> {
    f: C,
    _output: PhantomData<fn() -> R>,
}

/// Adapt a closure `(input, &meta) -> impl IntoStepOutput` into a [`Step`].
pub fn from_fn<I, C, R>(f: C) -> FnStep<C, R>
where
    C: FnMut(I, &Meta) -> R,
{
    FnStep {
        f,
        _output: PhantomData,
    }
}

impl<I, O, F, C, R> Step<I, O, F> for FnStep<C, R>
where
    C: FnMut(I, &Meta) -> R,
    R: IntoStepOutput<O, F>,
{
    fn invoke(&mut self, input: I, meta: &Meta) -> StepResult<O, F> {
        (self.f)(input, meta).into_step_result()
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed("closure")
    }
}

impl<C, R> fmt::Debug for FnStep<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStep").finish_non_exhaustive()
    }
}

/// The `handle` capability.
pub trait Handle<I, O, F> {
    /// Process `input`.
    fn handle(&mut self, input: I, meta: &Meta) -> StepResult<O, F>;
}

/// The `execute` capability.
pub trait Execute<I, O, F> {
    /// Process `input`.
    fn execute(&mut self, input: I, meta: &Meta) -> StepResult<O, F>;
}

/// Wraps a [`Handle`] implementor as a step named after its type.
#[derive(Debug, Clone)]
pub struct Handler<T>(pub T);

/// Use `target.handle(..)` as a step.
pub fn handler<T>(target: T) -> Handler<T> {
    Handler(target)
}

impl<I, O, F, T: Handle<I, O, F>> Step<I, O, F> for Handler<T> {
    fn invoke(&mut self, input: I, meta: &Meta) -> StepResult<O, F> {
        self.0.handle(input, meta)
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(short_type_name(type_name::<T>()))
    }
}

/// Wraps an [`Execute`] implementor as a step named after its type.
#[derive(Debug, Clone)]
pub struct Executor<T>(pub T);

/// Use `target.execute(..)` as a step.
pub fn executor<T>(target: T) -> Executor<T> {
    Executor(target)
}

impl<I, O, F, T: Execute<I, O, F>> Step<I, O, F> for Executor<T> {
    fn invoke(&mut self, input: I, meta: &Meta) -> StepResult<O, F> {
        self.0.execute(input, meta)
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(short_type_name(type_name::<T>()))
    }
}

/// Runtime capability discovery for objects used as steps.
///
/// Both probes return `None` by default; override the ones the type supports.
///
/// ```
/// use resultflow::step::{self, Capabilities, Execute, StepOutput, StepResult};
/// use resultflow::{Meta, Outcome};
///
/// struct Audit;
///
/// impl Execute<i32, i32, String> for Audit {
///     fn execute(&mut self, n: i32, _meta: &Meta) -> StepResult<i32, String> {
///         Ok(StepOutput::Value(n))
///     }
/// }
///
/// impl Capabilities<i32, i32, String> for Audit {
///     fn as_execute(&mut self) -> Option<&mut dyn Execute<i32, i32, String>> {
///         Some(self)
///     }
/// }
///
/// let out = Outcome::success(5).then_step(step::object(Audit));
/// assert_eq!(out.value(), Some(&5));
/// ```
pub trait Capabilities<I, O, F> {
    /// The `handle` capability, if supported.
    fn as_handle(&mut self) -> Option<&mut dyn Handle<I, O, F>> {
        None
    }

    /// The `execute` capability, if supported.
    fn as_execute(&mut self) -> Option<&mut dyn Execute<I, O, F>> {
        None
    }
}

impl<I, O, F, T> Capabilities<I, O, F> for &mut T
where
    T: Capabilities<I, O, F> + ?Sized,
{
    fn as_handle(&mut self) -> Option<&mut dyn Handle<I, O, F>> {
        (**self).as_handle()
    }

    fn as_execute(&mut self) -> Option<&mut dyn Execute<I, O, F>> {
        (**self).as_execute()
    }
}

/// An object whose capabilities are probed at invocation time.
///
/// `handle` is preferred over `execute`. An object with neither raises
/// [`FlowError::InvalidStep`].
#[derive(Debug, Clone)]
pub struct Object<T>(pub T);

/// Use `target` as a step, probing its [`Capabilities`] on each call.
pub fn object<T>(target: T) -> Object<T> {
    Object(target)
}

impl<I, O, F, T> Step<I, O, F> for Object<T>
where
    T: Capabilities<I, O, F>,
    F: From<FlowError>,
{
    fn invoke(&mut self, input: I, meta: &Meta) -> StepResult<O, F> {
        if let Some(h) = self.0.as_handle() {
            return h.handle(input, meta);
        }
        if let Some(e) = self.0.as_execute() {
            return e.execute(input, meta);
        }
        Err(FlowError::invalid_step::<T>().into())
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(short_type_name(type_name::<T>()))
    }
}

/// A method bound to its target. Created by [`method`].
pub struct Method<T, M, R> {
    target: T,
    method: &'static str,
    f: M,
    _output: PhantomData<fn() -> R>,
}

/// Bind `f` as the method called `name` on `target`.
///
/// The step is reported as `Type::name`.
///
/// ```
/// use resultflow::step::{self, StepOutput};
/// use resultflow::{Meta, Outcome};
///
/// struct Tax { rate: f64 }
///
/// impl Tax {
///     fn apply(&mut self, amount: f64, _meta: &Meta) -> Result<StepOutput<f64, String>, String> {
///         Ok(StepOutput::Value(amount * (1.0 + self.rate)))
///     }
/// }
///
/// let out = Outcome::success(100.0).then_step(step::method(Tax { rate: 0.5 }, "apply", Tax::apply));
/// assert_eq!(out.value(), Some(&150.0));
/// ```
pub fn method<T, I, M, R>(target: T, name: &'static str, f: M) -> Method<T, M, R>
where
    M: FnMut(&mut T, I, &Meta) -> R,
{
    Method {
        target,
        method: name,
        f,
        _output: PhantomData,
    }
}

impl<I, O, F, T, M, R> Step<I, O, F> for Method<T, M, R>
where
    M: FnMut(&mut T, I, &Meta) -> R,
    R: IntoStepOutput<O, F>,
{
    fn invoke(&mut self, input: I, meta: &Meta) -> StepResult<O, F> {
        (self.f)(&mut self.target, input, meta).into_step_result()
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{}::{}", short_type_name(type_name::<T>()), self.method))
    }
}

impl<T: fmt::Debug, M, R> fmt::Debug for Method<T, M, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("target", &self.target)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}
