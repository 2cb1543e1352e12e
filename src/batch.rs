//! Mapping a function over keyed collections of items
//!
//! Each function takes `(key, item)` pairs and a per-item function
//! `(item, &key) -> impl IntoStepOutput`. Every invocation is isolated: a
//! raised `Err` becomes a failure for that item alone.
//!
//! - [`map_items`]: one outcome per key, never fails as a whole
//! - [`map_all`]: fail-fast, stops at the first failing item
//! - [`map_collect_errors`]: visits every item and gathers all failures
//!
//! Output collections are chosen by the caller through `FromIterator`, so a
//! `Vec<(K, V)>`, `BTreeMap<K, V>` or `HashMap<K, V>` all work. Input order is
//! the iteration order of the input.
//!
//! # Examples
//!
//! ```
//! use resultflow::batch;
//! use resultflow::{Outcome, StepOutput};
//! use std::collections::BTreeMap;
//!
//! let prices = vec![("apple", "1.20"), ("pear", "x"), ("fig", "3.00")];
//!
//! let parsed: Outcome<BTreeMap<_, f64>, BTreeMap<_, String>> =
//!     batch::map_collect_errors(prices, |raw, _key| {
//!         raw.parse::<f64>().map(StepOutput::Value).map_err(|e| e.to_string())
//!     });
//!
//! let errors = parsed.error().unwrap();
//! assert_eq!(errors.len(), 1);
//! assert!(errors.contains_key("pear"));
//! ```

use crate::meta::Meta;
use crate::outcome::Outcome;
use crate::step::IntoStepOutput;

fn map_one<K, T, O, F, R>(f: &mut impl FnMut(T, &K) -> R, item: T, key: &K) -> Outcome<O, F>
where
    R: IntoStepOutput<O, F>,
{
    match f(item, key).into_step_result() {
        Ok(output) => output.into_outcome(Meta::new()),
        Err(error) => Outcome::failure(error),
    }
}

/// Apply `f` to every item, keeping each item's outcome under its key.
///
/// ```
/// use resultflow::batch;
/// use resultflow::{Outcome, StepOutput};
///
/// let out: Vec<(u32, Outcome<u32, &str>)> = batch::map_items(vec![(1, 10), (2, 0)], |n, _| {
///     if n == 0 { Err("zero") } else { Ok(StepOutput::Value(100 / n)) }
/// });
///
/// assert!(out[0].1.is_success());
/// assert!(out[1].1.is_failure());
/// ```
pub fn map_items<K, T, O, F, R, Out>(
    items: impl IntoIterator<Item = (K, T)>,
    mut f: impl FnMut(T, &K) -> R,
) -> Out
where
    R: IntoStepOutput<O, F>,
    Out: FromIterator<(K, Outcome<O, F>)>,
{
    items
        .into_iter()
        .map(|(key, item)| {
            let outcome = map_one(&mut f, item, &key);
            (key, outcome)
        })
        .collect()
}

/// Apply `f` to items in order, stopping at the first failure.
///
/// On failure the error is that item's error and the metadata is everything
/// merged so far, the failing item's included. Items after it are never
/// visited. On success every value is collected under its key.
pub fn map_all<K, T, O, F, R, Out>(
    items: impl IntoIterator<Item = (K, T)>,
    mut f: impl FnMut(T, &K) -> R,
) -> Outcome<Out, F>
where
    R: IntoStepOutput<O, F>,
    Out: FromIterator<(K, O)>,
{
    let mut values = Vec::new();
    let mut merged = Meta::new();

    for (key, item) in items {
        let (result, meta) = map_one(&mut f, item, &key).into_parts();
        merged.merge(meta);
        match result {
            Ok(value) => values.push((key, value)),
            Err(error) => return Outcome::failure_with(error, merged),
        }
    }

    Outcome::success_with(values.into_iter().collect(), merged)
}

/// Apply `f` to every item, collecting failures by key.
///
/// If any item failed, the result is a failure holding only the errors;
/// successful values are dropped. Metadata from every item is merged in
/// order either way.
pub fn map_collect_errors<K, T, O, F, R, Out, Errs>(
    items: impl IntoIterator<Item = (K, T)>,
    mut f: impl FnMut(T, &K) -> R,
) -> Outcome<Out, Errs>
where
    R: IntoStepOutput<O, F>,
    Out: FromIterator<(K, O)>,
    Errs: FromIterator<(K, F)>,
{
    let mut values = Vec::new();
    let mut errors = Vec::new();
    let mut merged = Meta::new();

    for (key, item) in items {
        let (result, meta) = map_one(&mut f, item, &key).into_parts();
        merged.merge(meta);
        match result {
            Ok(value) => values.push((key, value)),
            Err(error) => errors.push((key, error)),
        }
    }

    if errors.is_empty() {
        Outcome::success_with(values.into_iter().collect(), merged)
    } else {
        Outcome::failure_with(errors.into_iter().collect(), merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta;
    use crate::step::StepOutput;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    fn abc() -> Vec<(&'static str, i32)> {
        vec![("a", 1), ("b", 2), ("c", 3)]
    }

    fn fail_on_b<'a>(
        visited: &'a RefCell<Vec<&'static str>>,
    ) -> impl FnMut(i32, &&'static str) -> Outcome<i32, String> + 'a {
        move |n, key| {
            visited.borrow_mut().push(*key);
            if *key == "b" {
                Outcome::failure_with(format!("bad {}", key), meta! { "at" => *key })
            } else {
                Outcome::success_with(n * 10, meta! { "at" => *key, *key => n })
            }
        }
    }

    #[test]
    fn map_items_keeps_every_key() {
        let out: BTreeMap<_, Outcome<i32, String>> =
            map_items(abc(), |n, _| StepOutput::Value(n + 1));
        assert_eq!(out.len(), 3);
        assert_eq!(out["c"], Outcome::success(4));
    }

    #[test]
    fn map_items_isolates_raised_errors() {
        let out: Vec<(&str, Outcome<i32, String>)> = map_items(abc(), |n, key| {
            if *key == "a" {
                Err::<StepOutput<i32, String>, _>("raised")
            } else {
                Ok(StepOutput::Value(n))
            }
        });
        assert_eq!(out[0].1, Outcome::failure("raised".to_string()));
        assert!(out[1].1.is_success());
        assert!(out[2].1.is_success());
    }

    #[test]
    fn map_all_stops_at_first_failure() {
        let visited = RefCell::new(Vec::new());
        let out: Outcome<BTreeMap<_, i32>, String> = map_all(abc(), fail_on_b(&visited));

        assert_eq!(*visited.borrow(), vec!["a", "b"]);
        assert_eq!(
            out,
            Outcome::failure_with("bad b".to_string(), meta! { "at" => "b", "a" => 1 })
        );
    }

    #[test]
    fn map_all_collects_values_and_merges_meta() {
        let out: Outcome<Vec<(&str, i32)>, String> =
            map_all(abc(), |n, key| Outcome::success_with(n, meta! { "last" => *key }));
        assert_eq!(
            out,
            Outcome::success_with(vec![("a", 1), ("b", 2), ("c", 3)], meta! { "last" => "c" })
        );
    }

    #[test]
    fn map_collect_errors_visits_everything() {
        let visited = RefCell::new(Vec::new());
        let out: Outcome<BTreeMap<_, i32>, BTreeMap<_, String>> =
            map_collect_errors(abc(), fail_on_b(&visited));

        assert_eq!(*visited.borrow(), vec!["a", "b", "c"]);
        let errors: BTreeMap<_, _> = [("b", "bad b".to_string())].into_iter().collect();
        assert_eq!(out.error(), Some(&errors));
        assert_eq!(out.meta().get("at"), Some(&meta::Value::from("c")));
        assert!(out.meta().contains_key("a"));
        assert!(out.meta().contains_key("c"));
    }

    #[test]
    fn map_collect_errors_succeeds_without_failures() {
        let out: Outcome<BTreeMap<_, i32>, BTreeMap<_, String>> =
            map_collect_errors(abc(), |n, _| StepOutput::Value(n * 2));
        assert_eq!(out.value().map(|m| m["b"]), Some(4));
    }

    #[test]
    fn empty_input_yields_empty_success() {
        let none: Vec<(&str, i32)> = Vec::new();

        let items: Vec<(&str, Outcome<i32, String>)> = map_items(none.clone(), |n, _| StepOutput::Value(n));
        assert!(items.is_empty());

        let all: Outcome<BTreeMap<&str, i32>, String> = map_all(none.clone(), |n, _| StepOutput::Value(n));
        assert_eq!(all, Outcome::success(BTreeMap::new()));

        let collected: Outcome<BTreeMap<&str, i32>, Vec<(&str, String)>> =
            map_collect_errors(none, |n, _| StepOutput::Value(n));
        assert_eq!(collected, Outcome::success(BTreeMap::new()));
    }
}
