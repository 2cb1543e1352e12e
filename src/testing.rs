//! Testing utilities for code that produces outcomes
//!
//! Assertion macros that print the offending payload on failure, plus
//! property-based testing support behind the `proptest` feature.
//!
//! # Examples
//!
//! ```rust
//! use resultflow::{assert_failure, assert_failure_eq, assert_success, Outcome};
//!
//! let ok = Outcome::<_, String>::success(42);
//! assert_success!(ok);
//!
//! let failed = Outcome::<i32, _>::failure("declined");
//! assert_failure!(failed);
//! assert_failure_eq!(failed, "declined");
//! ```

/// Assert that an outcome is a success.
///
/// Panics with the failure payload and metadata otherwise.
///
/// # Example
///
/// ```rust
/// use resultflow::{assert_success, Outcome};
///
/// assert_success!(Outcome::<_, ()>::success("done"));
/// ```
#[macro_export]
macro_rules! assert_success {
    ($outcome:expr) => {
        match &$outcome {
            outcome => {
                if let ::core::result::Result::Err(e) = outcome.as_result() {
                    panic!(
                        "Expected Success, got Failure: {:?} (meta: {:?})",
                        e,
                        outcome.meta()
                    );
                }
            }
        }
    };
}

/// Assert that an outcome is a failure.
///
/// Panics with the success value otherwise.
///
/// # Example
///
/// ```rust
/// use resultflow::{assert_failure, Outcome};
///
/// assert_failure!(Outcome::<(), _>::failure("nope"));
/// ```
#[macro_export]
macro_rules! assert_failure {
    ($outcome:expr) => {
        match &$outcome {
            outcome => {
                if let ::core::result::Result::Ok(v) = outcome.as_result() {
                    panic!("Expected Failure, got Success: {:?}", v);
                }
            }
        }
    };
}

/// Assert that an outcome is a failure with a specific payload.
///
/// # Example
///
/// ```rust
/// use resultflow::{assert_failure_eq, Outcome};
///
/// assert_failure_eq!(Outcome::<(), _>::failure(404), 404);
/// ```
#[macro_export]
macro_rules! assert_failure_eq {
    ($outcome:expr, $expected:expr) => {
        match &$outcome {
            outcome => match outcome.as_result() {
                ::core::result::Result::Err(e) => assert_eq!(*e, $expected),
                ::core::result::Result::Ok(v) => panic!(
                    "Expected Failure with error {:?}, got Success: {:?}",
                    $expected, v
                ),
            },
        }
    };
}

#[cfg(feature = "proptest")]
use crate::meta::{Meta, Value};
#[cfg(feature = "proptest")]
use crate::Outcome;
#[cfg(feature = "proptest")]
use proptest::prelude::*;

/// Strategy for small flat metadata bags with string keys.
#[cfg(feature = "proptest")]
pub fn arb_meta() -> impl Strategy<Value = Meta> {
    let value = prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        "[a-z0-9 ]{0,12}".prop_map(Value::String),
    ];
    proptest::collection::vec(("[a-z_]{1,8}", value), 0..4)
        .prop_map(|entries| entries.into_iter().collect())
}

#[cfg(feature = "proptest")]
impl<S, F> Arbitrary for Outcome<S, F>
where
    S: Arbitrary + 'static,
    F: Arbitrary + 'static,
{
    type Parameters = (S::Parameters, F::Parameters);
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        let (s_params, f_params) = args;
        prop_oneof![
            (any_with::<S>(s_params), arb_meta()).prop_map(|(v, m)| Outcome::success_with(v, m)),
            (any_with::<F>(f_params), arb_meta()).prop_map(|(e, m)| Outcome::failure_with(e, m)),
        ]
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use crate::{meta, Outcome};

    #[test]
    fn assert_success_macro() {
        assert_success!(Outcome::<_, String>::success_with(42, meta! { "k" => 1 }));
    }

    #[test]
    fn assert_failure_macro() {
        assert_failure!(Outcome::<i32, _>::failure("error".to_string()));
    }

    #[test]
    fn assert_failure_eq_macro() {
        assert_failure_eq!(Outcome::<i32, _>::failure("e1"), "e1");
    }

    #[test]
    fn macros_do_not_consume_the_outcome() {
        let o = Outcome::<_, String>::success(1);
        assert_success!(o);
        assert_eq!(o.into_value(), Some(1));
    }

    #[test]
    #[should_panic(expected = "Expected Success, got Failure")]
    fn assert_success_panics_on_failure() {
        assert_success!(Outcome::<i32, _>::failure("error".to_string()));
    }

    #[test]
    #[should_panic(expected = "Expected Failure, got Success")]
    fn assert_failure_panics_on_success() {
        assert_failure!(Outcome::<_, String>::success(42));
    }

    #[test]
    #[should_panic(expected = "Expected Failure with error")]
    fn assert_failure_eq_panics_on_success() {
        assert_failure_eq!(Outcome::<_, String>::success(42), "error".to_string());
    }

    #[cfg(feature = "proptest")]
    mod proptest_tests {
        use crate::Outcome;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn outcome_arbitrary_generates_both_branches(
                o in any::<Outcome<i32, String>>()
            ) {
                prop_assert_ne!(o.is_success(), o.is_failure());
                prop_assert!(o.meta().len() <= 4);
            }
        }
    }
}
