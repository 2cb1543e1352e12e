//! The `Outcome` type: a success or failure payload paired with metadata
//!
//! `Outcome<S, F>` behaves like `Result<S, F>` with one addition: every value
//! carries a [`Meta`] bag that survives transformations. All operations take
//! `self` by value and return a new `Outcome`; nothing is mutated in place.
//!
//! # Examples
//!
//! ```
//! use resultflow::{meta, Outcome};
//!
//! let order = Outcome::<_, String>::success_with(41, meta! { "request_id" => "r-1" })
//!     .map_value(|n| n + 1)
//!     .merge_meta(meta! { "stage" => "priced" });
//!
//! assert_eq!(order.value(), Some(&42));
//! assert_eq!(order.meta().len(), 2);
//!
//! let failed = Outcome::<i32, _>::failure("out of stock".to_string())
//!     .map_value(|n| n + 1);
//! assert!(failed.is_failure());
//! ```

use crate::error::BoxError;
use crate::meta::{Meta, Value};
use crate::step::IntoStepOutput;

/// A success or failure payload with metadata.
///
/// Exactly one of the value and the error is present. Payloads may be any
/// value, including `()`, `false` or empty collections; the branch is tracked
/// separately from the payload.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "this `Outcome` may be a failure, which should be handled"]
pub struct Outcome<S, F> {
    inner: Result<S, F>,
    meta: Meta,
}

impl<S, F> Outcome<S, F> {
    /// Create a success with empty metadata.
    ///
    /// ```
    /// use resultflow::Outcome;
    ///
    /// let o = Outcome::<_, String>::success(42);
    /// assert!(o.is_success());
    /// assert!(o.meta().is_empty());
    /// ```
    #[inline]
    pub fn success(value: S) -> Self {
        Self::success_with(value, Meta::new())
    }

    /// Create a success carrying `meta`.
    #[inline]
    pub fn success_with(value: S, meta: Meta) -> Self {
        Outcome {
            inner: Ok(value),
            meta,
        }
    }

    /// Create a failure with empty metadata.
    #[inline]
    pub fn failure(error: F) -> Self {
        Self::failure_with(error, Meta::new())
    }

    /// Create a failure carrying `meta`.
    #[inline]
    pub fn failure_with(error: F, meta: Meta) -> Self {
        Outcome {
            inner: Err(error),
            meta,
        }
    }

    /// Create a failure that records the value which triggered it.
    ///
    /// The value is stored under `failed_value`; entries in `meta` win on
    /// conflict.
    ///
    /// ```
    /// use resultflow::{meta, Outcome};
    /// use resultflow::meta::Value;
    ///
    /// let o = Outcome::<(), _>::failure_with_value("too young", 15, meta!{});
    /// assert_eq!(o.meta().get("failed_value"), Some(&Value::Int(15)));
    /// ```
    pub fn failure_with_value(error: F, failed_value: impl Into<Value>, meta: Meta) -> Self {
        let meta = Meta::new().with("failed_value", failed_value).merged(meta);
        Self::failure_with(error, meta)
    }

    /// Build an outcome from a `Result`, with empty metadata.
    #[inline]
    pub fn from_result(result: Result<S, F>) -> Self {
        Outcome {
            inner: result,
            meta: Meta::new(),
        }
    }

    /// Run a deferred operation and normalize whatever it returns.
    ///
    /// A bare value becomes a success, an `Outcome` is returned as-is and an
    /// `Err` becomes a failure.
    ///
    /// ```
    /// use resultflow::{Outcome, StepOutput};
    ///
    /// let o: Outcome<i32, String> = Outcome::defer(|| "7".parse::<i32>()
    ///     .map(StepOutput::Value)
    ///     .map_err(|e| e.to_string()));
    /// assert_eq!(o.value(), Some(&7));
    /// ```
    pub fn defer<R>(f: impl FnOnce() -> R) -> Self
    where
        R: IntoStepOutput<S, F>,
    {
        match f().into_step_result() {
            Ok(output) => output.into_outcome(Meta::new()),
            Err(error) => Self::failure(error),
        }
    }

    /// Returns true for a success.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.inner.is_ok()
    }

    /// Returns true for a failure.
    #[inline]
    pub fn is_failure(&self) -> bool {
        self.inner.is_err()
    }

    /// The success value, if any.
    #[inline]
    pub fn value(&self) -> Option<&S> {
        self.inner.as_ref().ok()
    }

    /// The failure payload, if any.
    #[inline]
    pub fn error(&self) -> Option<&F> {
        self.inner.as_ref().err()
    }

    /// The metadata.
    #[inline]
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Borrow the payload as a `Result`.
    #[inline]
    pub fn as_result(&self) -> Result<&S, &F> {
        self.inner.as_ref()
    }

    /// Drop the metadata and return the payload as a `Result`.
    #[inline]
    pub fn into_result(self) -> Result<S, F> {
        self.inner
    }

    /// Split into payload and metadata.
    #[inline]
    pub fn into_parts(self) -> (Result<S, F>, Meta) {
        (self.inner, self.meta)
    }

    /// The success value, if any.
    #[inline]
    pub fn into_value(self) -> Option<S> {
        self.inner.ok()
    }

    /// The failure payload, if any.
    #[inline]
    pub fn into_error(self) -> Option<F> {
        self.inner.err()
    }

    /// Discard the payload and keep the metadata.
    #[inline]
    pub fn into_meta(self) -> Meta {
        self.meta
    }

    /// Transform the success value. Failures pass through with the same
    /// metadata.
    ///
    /// ```
    /// use resultflow::Outcome;
    ///
    /// let o = Outcome::<_, String>::success(5).map_value(|x| x * 2);
    /// assert_eq!(o.value(), Some(&10));
    /// ```
    #[inline]
    pub fn map_value<U>(self, f: impl FnOnce(S) -> U) -> Outcome<U, F> {
        Outcome {
            inner: self.inner.map(f),
            meta: self.meta,
        }
    }

    /// Transform the failure payload. Successes pass through unchanged.
    #[inline]
    pub fn map_error<E>(self, f: impl FnOnce(F) -> E) -> Outcome<S, E> {
        Outcome {
            inner: self.inner.map_err(f),
            meta: self.meta,
        }
    }

    /// Shallow-merge `extra` into the metadata; keys in `extra` overwrite.
    ///
    /// ```
    /// use resultflow::{meta, Outcome};
    /// use resultflow::meta::Value;
    ///
    /// let o = Outcome::<_, ()>::success_with(1, meta! { "a" => 1, "b" => 1 })
    ///     .merge_meta(meta! { "b" => 2 });
    /// assert_eq!(o.meta().get("b"), Some(&Value::Int(2)));
    /// ```
    pub fn merge_meta(mut self, extra: Meta) -> Self {
        self.meta.merge(extra);
        self
    }

    /// Replace the metadata with whatever `f` returns.
    pub fn map_meta(self, f: impl FnOnce(Meta) -> Meta) -> Self {
        Outcome {
            inner: self.inner,
            meta: f(self.meta),
        }
    }

    /// Replace the metadata wholesale.
    pub fn with_meta(self, meta: Meta) -> Self {
        Outcome {
            inner: self.inner,
            meta,
        }
    }

    /// Observe the metadata without changing the outcome.
    pub fn tap_meta(self, f: impl FnOnce(&Meta)) -> Self {
        f(&self.meta);
        self
    }

    /// Observe both branches without changing the outcome.
    pub fn tap(self, f: impl FnOnce(Result<&S, &F>, &Meta)) -> Self {
        f(self.inner.as_ref(), &self.meta);
        self
    }

    /// Observe the success value, if any.
    pub fn on_success(self, f: impl FnOnce(&S, &Meta)) -> Self {
        if let Ok(value) = &self.inner {
            f(value, &self.meta);
        }
        self
    }

    /// Alias for [`Outcome::on_success`].
    pub fn inspect(self, f: impl FnOnce(&S, &Meta)) -> Self {
        self.on_success(f)
    }

    /// Observe the failure payload, if any.
    pub fn on_failure(self, f: impl FnOnce(&F, &Meta)) -> Self {
        if let Err(error) = &self.inner {
            f(error, &self.meta);
        }
        self
    }

    /// Alias for [`Outcome::on_failure`].
    pub fn inspect_error(self, f: impl FnOnce(&F, &Meta)) -> Self {
        self.on_failure(f)
    }

    /// Turn a success into a failure when `predicate` rejects it.
    ///
    /// ```
    /// use resultflow::Outcome;
    ///
    /// let o = Outcome::<_, String>::success(17)
    ///     .ensure(|age, _| *age >= 18, |age, _| format!("{} is under 18", age));
    /// assert_eq!(o.error().map(String::as_str), Some("17 is under 18"));
    /// ```
    pub fn ensure(
        self,
        predicate: impl FnOnce(&S, &Meta) -> bool,
        error: impl FnOnce(&S, &Meta) -> F,
    ) -> Self {
        match &self.inner {
            Ok(value) if !predicate(value, &self.meta) => {
                let err = error(value, &self.meta);
                Self::failure_with(err, self.meta)
            }
            _ => self,
        }
    }

    /// Replace a failure with a success computed from the error.
    pub fn recover(self, f: impl FnOnce(F, &Meta) -> S) -> Self {
        match self.inner {
            Ok(_) => self,
            Err(error) => {
                let value = f(error, &self.meta);
                Self::success_with(value, self.meta)
            }
        }
    }

    /// Collapse both branches into one value.
    pub fn fold<T>(
        self,
        on_success: impl FnOnce(S, &Meta) -> T,
        on_failure: impl FnOnce(F, &Meta) -> T,
    ) -> T {
        match self.inner {
            Ok(value) => on_success(value, &self.meta),
            Err(error) => on_failure(error, &self.meta),
        }
    }

    /// The success value or `default`.
    pub fn unwrap_or(self, default: S) -> S {
        self.inner.unwrap_or(default)
    }

    /// The success value, or one computed from the failure.
    pub fn unwrap_or_else(self, f: impl FnOnce(F, &Meta) -> S) -> S {
        match self.inner {
            Ok(value) => value,
            Err(error) => f(error, &self.meta),
        }
    }

    /// Escalate a failure to the caller's `?` boundary.
    ///
    /// Returns the outcome itself on success so chains can continue.
    pub fn raise_if_failure(self) -> Result<Self, F> {
        match self.inner {
            Ok(_) => Ok(self),
            Err(error) => Err(error),
        }
    }

    /// The success value, or an error built from the failure.
    pub fn get_or_raise<E>(self, factory: impl FnOnce(F, &Meta) -> E) -> Result<S, E> {
        match self.inner {
            Ok(value) => Ok(value),
            Err(error) => Err(factory(error, &self.meta)),
        }
    }

    /// Combine outcomes, stopping at the first failure.
    ///
    /// Metadata is merged in iteration order, up to and including the
    /// failing outcome.
    ///
    /// ```
    /// use resultflow::{meta, Outcome};
    ///
    /// let all = Outcome::combine(vec![
    ///     Outcome::<_, String>::success_with(1, meta! { "a" => 1 }),
    ///     Outcome::success_with(2, meta! { "b" => 2 }),
    /// ]);
    /// assert_eq!(all.value(), Some(&vec![1, 2]));
    /// assert_eq!(all.meta().len(), 2);
    /// ```
    pub fn combine(outcomes: impl IntoIterator<Item = Outcome<S, F>>) -> Outcome<Vec<S>, F> {
        let mut values = Vec::new();
        let mut merged = Meta::new();

        for outcome in outcomes {
            let (result, meta) = outcome.into_parts();
            merged.merge(meta);
            match result {
                Ok(value) => values.push(value),
                Err(error) => return Outcome::failure_with(error, merged),
            }
        }

        Outcome::success_with(values, merged)
    }

    /// Combine outcomes, collecting every failure.
    ///
    /// Metadata from every outcome is merged in iteration order. When any
    /// outcome failed, successful values are discarded.
    pub fn combine_all(
        outcomes: impl IntoIterator<Item = Outcome<S, F>>,
    ) -> Outcome<Vec<S>, Vec<F>> {
        let mut values = Vec::new();
        let mut errors = Vec::new();
        let mut merged = Meta::new();

        for outcome in outcomes {
            let (result, meta) = outcome.into_parts();
            merged.merge(meta);
            match result {
                Ok(value) => values.push(value),
                Err(error) => errors.push(error),
            }
        }

        if errors.is_empty() {
            Outcome::success_with(values, merged)
        } else {
            Outcome::failure_with(errors, merged)
        }
    }
}

impl<S, F: std::fmt::Debug> Outcome<S, F> {
    /// The success value.
    ///
    /// # Panics
    ///
    /// Panics with the failure payload if this is a failure.
    #[track_caller]
    pub fn unwrap(self) -> S {
        match self.inner {
            Ok(value) => value,
            Err(error) => panic!("called `Outcome::unwrap()` on a failure: {:?}", error),
        }
    }

    /// The success value.
    ///
    /// # Panics
    ///
    /// Panics with `msg` and the failure payload if this is a failure.
    #[track_caller]
    pub fn expect(self, msg: &str) -> S {
        match self.inner {
            Ok(value) => value,
            Err(error) => panic!("{}: {:?}", msg, error),
        }
    }
}

impl<S> Outcome<S, BoxError> {
    /// Handle a boxed failure whose concrete type is `E`.
    ///
    /// The handler's result is normalized like a step: a bare value recovers
    /// with the current metadata. Failures of other types, and successes, are
    /// returned unchanged.
    ///
    /// ```
    /// use resultflow::{BoxError, Outcome, StepOutput};
    /// use std::io;
    ///
    /// let failed: Outcome<&str, BoxError> =
    ///     Outcome::failure(Box::new(io::Error::new(io::ErrorKind::NotFound, "gone")));
    ///
    /// let recovered = failed.catch(|_err: io::Error, _meta| StepOutput::Value("fallback"));
    /// assert_eq!(recovered.value(), Some(&"fallback"));
    /// ```
    pub fn catch<E, R>(self, handler: impl FnOnce(E, &Meta) -> R) -> Self
    where
        E: std::error::Error + 'static,
        R: IntoStepOutput<S, BoxError>,
    {
        let (result, meta) = self.into_parts();
        let error = match result {
            Ok(value) => return Self::success_with(value, meta),
            Err(error) => error,
        };

        match error.downcast::<E>() {
            Ok(matched) => match handler(*matched, &meta).into_step_result() {
                Ok(output) => output.into_outcome(meta),
                Err(raised) => Self::failure_with(raised, meta),
            },
            Err(other) => Self::failure_with(other, meta),
        }
    }
}

impl<S, F> From<Result<S, F>> for Outcome<S, F> {
    fn from(result: Result<S, F>) -> Self {
        Outcome::from_result(result)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Outcome;
    use serde::ser::SerializeStruct;
    use serde::{Serialize, Serializer};

    /// Serializes the canonical `{ok, value, error, meta}` shape.
    impl<S: Serialize, F: Serialize> Serialize for Outcome<S, F> {
        fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
            let mut state = serializer.serialize_struct("Outcome", 4)?;
            state.serialize_field("ok", &self.is_success())?;
            state.serialize_field("value", &self.value())?;
            state.serialize_field("error", &self.error())?;
            state.serialize_field("meta", self.meta())?;
            state.end()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta;
    use crate::step::StepOutput;
    use std::cell::Cell;
    use std::io;

    #[test]
    fn constructors_set_branch() {
        let ok = Outcome::<_, String>::success_with(false, meta! { "k" => 1 });
        assert!(ok.is_success());
        assert_eq!(ok.value(), Some(&false));
        assert_eq!(ok.error(), None);

        let err = Outcome::<i32, _>::failure(0);
        assert!(err.is_failure());
        assert_eq!(err.error(), Some(&0));
        assert!(err.meta().is_empty());
    }

    #[test]
    fn map_value_is_noop_on_failure() {
        let m = meta! { "trace" => "t1" };
        let o = Outcome::<i32, _>::failure_with("bad", m.clone()).map_value(|x| x + 1);
        assert_eq!(o, Outcome::failure_with("bad", m));
    }

    #[test]
    fn map_error_is_noop_on_success() {
        let o = Outcome::<_, &str>::success(3).map_error(|e| e.len());
        assert_eq!(o, Outcome::success(3));
    }

    #[test]
    fn map_meta_replaces_metadata() {
        let o = Outcome::<_, ()>::success_with(1, meta! { "a" => 1 })
            .map_meta(|m| m.with("b", 2));
        assert_eq!(o.meta(), &meta! { "a" => 1, "b" => 2 });

        let cleared = o.map_meta(|_| Meta::new());
        assert!(cleared.meta().is_empty());
    }

    #[test]
    fn failure_with_value_lets_meta_win() {
        let o = Outcome::<(), _>::failure_with_value("e", 1, meta! { "failed_value" => 2 });
        assert_eq!(o.meta().get("failed_value"), Some(&Value::Int(2)));
    }

    #[test]
    fn taps_run_only_on_their_branch() {
        let hits = Cell::new(0);
        let _ = Outcome::<_, ()>::success(1)
            .on_success(|_, _| hits.set(hits.get() + 1))
            .on_failure(|_, _| hits.set(hits.get() + 10))
            .tap(|_, _| hits.set(hits.get() + 100))
            .tap_meta(|_| hits.set(hits.get() + 1000));
        assert_eq!(hits.get(), 1101);
    }

    #[test]
    fn ensure_keeps_meta_on_rejection() {
        let o = Outcome::<_, String>::success_with(3, meta! { "k" => "v" })
            .ensure(|n, _| *n > 5, |n, _| format!("{} too small", n));
        assert_eq!(o, Outcome::failure_with("3 too small".to_string(), meta! { "k" => "v" }));
    }

    #[test]
    fn recover_turns_failure_into_success() {
        let o = Outcome::<usize, &str>::failure_with("oops", meta! { "k" => 1 })
            .recover(|e, _| e.len());
        assert_eq!(o, Outcome::success_with(4, meta! { "k" => 1 }));
    }

    #[test]
    fn fold_reaches_both_branches() {
        let ok = Outcome::<_, String>::success(2).fold(|v, _| v * 10, |_, _| 0);
        let err = Outcome::<i32, _>::failure("x".to_string()).fold(|v, _| v, |e, _| e.len() as i32);
        assert_eq!((ok, err), (20, 1));
    }

    #[test]
    fn raise_if_failure_escalates() {
        let ok = Outcome::<_, String>::success(1).raise_if_failure();
        assert!(ok.is_ok());

        let err = Outcome::<i32, _>::failure("boom".to_string()).raise_if_failure();
        assert_eq!(err, Err("boom".to_string()));
    }

    #[test]
    fn get_or_raise_builds_custom_error() {
        let res: Result<i32, String> = Outcome::<i32, _>::failure_with(404, meta! { "path" => "/x" })
            .get_or_raise(|code, meta| format!("{} at {}", code, meta.get("path").unwrap()));
        assert_eq!(res, Err("404 at /x".to_string()));
    }

    #[test]
    #[should_panic(expected = "called `Outcome::unwrap()` on a failure")]
    fn unwrap_panics_on_failure() {
        Outcome::<i32, _>::failure("nope").unwrap();
    }

    #[test]
    fn combine_stops_at_first_failure() {
        let combined = Outcome::combine(vec![
            Outcome::success_with(1, meta! { "a" => 1 }),
            Outcome::failure_with("bad", meta! { "b" => 2 }),
            Outcome::success_with(3, meta! { "c" => 3 }),
        ]);
        assert_eq!(combined, Outcome::failure_with("bad", meta! { "a" => 1, "b" => 2 }));
    }

    #[test]
    fn combine_all_collects_every_error() {
        let combined = Outcome::combine_all(vec![
            Outcome::success_with(1, meta! { "k" => 1 }),
            Outcome::failure_with("e1", meta! { "k" => 2 }),
            Outcome::failure("e2"),
        ]);
        assert_eq!(combined, Outcome::failure_with(vec!["e1", "e2"], meta! { "k" => 2 }));
    }

    #[test]
    fn defer_normalizes_returns() {
        let raw: Outcome<i32, String> = Outcome::defer(|| StepOutput::Value(1));
        assert_eq!(raw, Outcome::success(1));

        let raised: Outcome<i32, String> =
            Outcome::defer(|| Err::<StepOutput<i32, String>, _>("raised"));
        assert_eq!(raised, Outcome::failure("raised".to_string()));
    }

    #[test]
    fn catch_ignores_other_error_types() {
        let failed: Outcome<i32, BoxError> = Outcome::failure("plain".into());
        let out = failed.catch(|_e: io::Error, _| StepOutput::Value(1));
        assert!(out.is_failure());
        assert_eq!(out.error().map(|e| e.to_string()), Some("plain".to_string()));
    }
}
