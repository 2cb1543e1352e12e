//! Redaction and truncation of metadata for diagnostic output
//!
//! A [`Sanitizer`] walks a [`Meta`] tree and produces a copy that is safe to
//! log:
//!
//! - values under a sensitive key are replaced by the redaction text
//! - strings longer than the limit are cut to that many characters and
//!   followed by `…`
//! - everything else is copied as-is
//!
//! Only named keys are checked. Index keys are never sensitive.
//!
//! # Examples
//!
//! ```
//! use resultflow::config::DebugConfig;
//! use resultflow::meta;
//! use resultflow::meta::Value;
//!
//! let sanitizer = DebugConfig::default().sanitizer();
//! let clean = sanitizer.sanitize_meta(&meta! {
//!     "user" => "ada",
//!     "auth" => meta! { "api_key" => "k-123" },
//! });
//!
//! assert_eq!(clean.get("user"), Some(&Value::from("ada")));
//! assert_eq!(
//!     clean.get("auth").and_then(|a| a.get("api_key")),
//!     Some(&Value::from("***REDACTED***"))
//! );
//! ```

mod pattern;

pub use pattern::{PatternSet, CACHE_CAPACITY};

use std::sync::Arc;

use crate::config::DebugConfig;
use crate::meta::{Key, Meta, Value};

/// Marker appended to truncated strings.
pub const ELLIPSIS: char = '…';

/// Produces redaction-safe copies of metadata.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    enabled: bool,
    redaction: String,
    max_string_length: usize,
    truncate_strings: bool,
    patterns: Arc<PatternSet>,
}

impl Sanitizer {
    /// Build a sanitizer from `config`.
    pub fn new(config: &DebugConfig) -> Self {
        Sanitizer {
            enabled: config.enabled,
            redaction: config.redaction.clone(),
            max_string_length: config.max_string_length,
            truncate_strings: config.truncate_strings,
            patterns: PatternSet::compile(&config.sensitive_keys),
        }
    }

    /// Returns true when sanitization is switched on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true if the value under `key` would be redacted.
    pub fn is_sensitive(&self, key: &Key) -> bool {
        key.as_name().is_some_and(|name| self.patterns.is_match(name))
    }

    /// Sanitize every entry of `meta`.
    pub fn sanitize_meta(&self, meta: &Meta) -> Meta {
        if !self.enabled {
            return meta.clone();
        }
        meta.iter()
            .map(|(key, value)| {
                let clean = if self.is_sensitive(key) {
                    Value::String(self.redaction.clone())
                } else {
                    self.walk(value)
                };
                (key.clone(), clean)
            })
            .collect()
    }

    /// Sanitize a single value, recursing into lists and maps.
    pub fn sanitize_value(&self, value: &Value) -> Value {
        if !self.enabled {
            return value.clone();
        }
        self.walk(value)
    }

    /// Apply string truncation to `s`.
    ///
    /// ```
    /// use resultflow::config::DebugConfig;
    ///
    /// let sanitizer = DebugConfig::default().with_max_string_length(3).sanitizer();
    /// assert_eq!(sanitizer.sanitize_str("abcdef"), "abc…");
    /// assert_eq!(sanitizer.sanitize_str("abc"), "abc");
    /// ```
    pub fn sanitize_str(&self, s: &str) -> String {
        if !self.enabled || !self.truncate_strings {
            return s.to_string();
        }
        match s.char_indices().nth(self.max_string_length) {
            Some((cut, _)) => {
                let mut out = String::with_capacity(cut + ELLIPSIS.len_utf8());
                out.push_str(&s[..cut]);
                out.push(ELLIPSIS);
                out
            }
            None => s.to_string(),
        }
    }

    fn walk(&self, value: &Value) -> Value {
        match value {
            Value::Map(meta) => Value::Map(self.sanitize_meta(meta)),
            Value::List(items) => Value::List(items.iter().map(|v| self.walk(v)).collect()),
            Value::String(s) => Value::String(self.sanitize_str(s)),
            other => other.clone(),
        }
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Sanitizer::new(&DebugConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta;

    fn with_keys(keys: &[&str]) -> Sanitizer {
        DebugConfig::default()
            .with_sensitive_keys(keys.iter().copied())
            .sanitizer()
    }

    #[test]
    fn default_keys_are_redacted() {
        let clean = Sanitizer::default().sanitize_meta(&meta! {
            "password" => "hunter2",
            "Authorization" => "Bearer abc",
            "user" => "ada",
        });
        assert_eq!(clean.get("password"), Some(&Value::from("***REDACTED***")));
        assert_eq!(clean.get("Authorization"), Some(&Value::from("***REDACTED***")));
        assert_eq!(clean.get("user"), Some(&Value::from("ada")));
    }

    #[test]
    fn redaction_replaces_whole_subtree() {
        let clean = Sanitizer::default().sanitize_meta(&meta! {
            "secrets" => meta! { "a" => 1, "b" => vec![1, 2] },
        });
        assert_eq!(clean.get("secrets"), Some(&Value::from("***REDACTED***")));
    }

    #[test]
    fn glob_with_both_stars_ignores_case() {
        let s = with_keys(&["*token*"]);
        let clean = s.sanitize_meta(&meta! { "X_TOKEN_ID" => 1, "other" => 2 });
        assert_eq!(clean.get("X_TOKEN_ID"), Some(&Value::from("***REDACTED***")));
        assert_eq!(clean.get("other"), Some(&Value::Int(2)));
    }

    #[test]
    fn index_keys_are_never_sensitive() {
        let s = with_keys(&["123"]);
        let clean = s.sanitize_meta(&meta! { 123 => "keep", "x123" => "drop" });
        assert_eq!(clean.get_key(&Key::Index(123)), Some(&Value::from("keep")));
        assert_eq!(clean.get("x123"), Some(&Value::from("***REDACTED***")));
    }

    #[test]
    fn long_strings_are_truncated_by_characters() {
        let s = Sanitizer::default();
        let long = "é".repeat(250);
        let clean = s.sanitize_meta(&meta! { "note" => long });
        let note = clean.get("note").and_then(Value::as_str).unwrap();
        assert_eq!(note.chars().count(), 201);
        assert!(note.ends_with(ELLIPSIS));
    }

    #[test]
    fn truncation_can_be_switched_off() {
        let s = DebugConfig::default().with_truncate_strings(false).sanitizer();
        let long = "x".repeat(500);
        assert_eq!(s.sanitize_str(&long), long);
    }

    #[test]
    fn lists_are_walked() {
        let s = DebugConfig::default().with_max_string_length(2).sanitizer();
        let clean = s.sanitize_value(&Value::from(vec!["abcd", "ab"]));
        assert_eq!(clean, Value::from(vec!["ab…", "ab"]));
    }

    #[test]
    fn nested_maps_inside_lists_are_redacted() {
        let s = Sanitizer::default();
        let clean = s.sanitize_meta(&meta! {
            "users" => vec![Value::from(meta! { "name" => "a", "token" => "t" })],
        });
        let first = &clean.get("users").and_then(Value::as_list).unwrap()[0];
        assert_eq!(first.get("token"), Some(&Value::from("***REDACTED***")));
        assert_eq!(first.get("name"), Some(&Value::from("a")));
    }

    #[test]
    fn non_string_scalars_pass_through() {
        let s = Sanitizer::default();
        let input = meta! { "n" => 5, "f" => 1.5, "b" => true, "z" => () };
        assert_eq!(s.sanitize_meta(&input), input);
    }

    #[test]
    fn disabled_returns_input_unchanged() {
        let s = DebugConfig::disabled().sanitizer();
        let input = meta! { "password" => "x".repeat(300) };
        assert_eq!(s.sanitize_meta(&input), input);
    }

    #[test]
    fn custom_redaction_text() {
        let s = DebugConfig::default().with_redaction("[hidden]").sanitizer();
        let clean = s.sanitize_meta(&meta! { "ssn" => "123-45-6789" });
        assert_eq!(clean.get("ssn"), Some(&Value::from("[hidden]")));
    }
}
