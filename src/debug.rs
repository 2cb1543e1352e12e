//! Diagnostic view of an outcome
//!
//! [`Outcome::to_debug_view`] flattens an outcome into a [`DebugView`] that is
//! safe to log: payload type names, a sanitized error message, a resolved log
//! level and sanitized metadata. Payload values themselves are never copied
//! into the view.
//!
//! # Examples
//!
//! ```
//! use resultflow::{meta, Outcome};
//!
//! let failed = Outcome::<u32, String>::failure_with(
//!     "card declined".to_string(),
//!     meta! { "card" => "4111 1111 1111 1111", "order" => 12 },
//! );
//!
//! let view = failed.to_debug_view();
//! assert!(!view.ok);
//! assert_eq!(view.error_message.as_deref(), Some("card declined"));
//! assert_eq!(view.log_level.as_deref(), Some("error"));
//! assert_eq!(view.meta.get("card").and_then(|v| v.as_str()), Some("***REDACTED***"));
//! ```

use std::any::type_name;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::io;

use crate::config::DebugConfig;
use crate::error::{BoxError, FlowError};
use crate::meta::{Meta, Value};
use crate::outcome::Outcome;
use crate::step::short_type_name;

/// How a failure payload describes itself in diagnostics.
///
/// Both methods default to `None`. Textual payloads and std errors report a
/// message; integers report a code used for log-level lookup.
pub trait ErrorMessage {
    /// Human-readable message, if the payload has one.
    fn message(&self) -> Option<String> {
        None
    }

    /// Code used to look up a log level, if the payload has one.
    fn code(&self) -> Option<String> {
        None
    }
}

impl ErrorMessage for String {
    fn message(&self) -> Option<String> {
        Some(self.clone())
    }

    fn code(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl ErrorMessage for &str {
    fn message(&self) -> Option<String> {
        Some((*self).to_string())
    }

    fn code(&self) -> Option<String> {
        Some((*self).to_string())
    }
}

impl ErrorMessage for Cow<'_, str> {
    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }

    fn code(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ErrorMessage for BoxError {
    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ErrorMessage for io::Error {
    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }

    fn code(&self) -> Option<String> {
        self.raw_os_error().map(|c| c.to_string())
    }
}

impl ErrorMessage for FlowError {
    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

/// Structured errors: a string is its own message, a map offers `message`
/// and `code` entries.
impl ErrorMessage for Value {
    fn message(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Map(m) => m.get("message").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }

    fn code(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Map(m) => match m.get("code") {
                Some(Value::Int(i)) => Some(i.to_string()),
                Some(Value::String(s)) => Some(s.clone()),
                _ => None,
            },
            _ => None,
        }
    }
}

impl ErrorMessage for Meta {}
impl ErrorMessage for () {}
impl<T> ErrorMessage for Vec<T> {}
impl<K, V> ErrorMessage for BTreeMap<K, V> {}
impl<K, V, H> ErrorMessage for HashMap<K, V, H> {}

macro_rules! code_only {
    ($($t:ty),*) => {
        $(
            impl ErrorMessage for $t {
                fn code(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

code_only!(i32, i64, u16, u32, u64, usize);

/// A flattened, sanitized description of an outcome.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DebugView {
    /// The branch.
    pub ok: bool,
    /// Type name of the success payload, on success.
    pub value_type: Option<&'static str>,
    /// Type name of the failure payload, on failure.
    pub error_type: Option<&'static str>,
    /// Sanitized message, on failure when the payload has one.
    pub error_message: Option<String>,
    /// Resolved log level, on failure.
    pub log_level: Option<String>,
    /// Sanitized metadata.
    pub meta: Meta,
}

impl<S, F: ErrorMessage> Outcome<S, F> {
    /// Build a [`DebugView`] with the default configuration.
    pub fn to_debug_view(&self) -> DebugView {
        self.to_debug_view_with(&DebugConfig::default())
    }

    /// Build a [`DebugView`] with `config`.
    pub fn to_debug_view_with(&self, config: &DebugConfig) -> DebugView {
        let sanitizer = config.sanitizer();
        let meta = sanitizer.sanitize_meta(self.meta());

        match self.as_result() {
            Ok(_) => DebugView {
                ok: true,
                value_type: Some(type_name::<S>()),
                error_type: None,
                error_message: None,
                log_level: None,
                meta,
            },
            Err(error) => DebugView {
                ok: false,
                value_type: None,
                error_type: Some(type_name::<F>()),
                error_message: error.message().map(|m| sanitizer.sanitize_str(&m)),
                log_level: resolve_log_level(error, config),
                meta,
            },
        }
    }
}

/// Look up the level for `error`: full type name, short type name, code,
/// then the configured default.
fn resolve_log_level<F: ErrorMessage>(error: &F, config: &DebugConfig) -> Option<String> {
    let map = &config.log_level_map;
    let full = type_name::<F>();
    let short = short_type_name(full);

    map.get(full)
        .or_else(|| map.get(short))
        .or_else(|| error.code().and_then(|code| map.get(&code)))
        .cloned()
        .or_else(|| config.default_log_level.clone())
}
