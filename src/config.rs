//! Configuration for diagnostic output.
//!
//! [`DebugConfig`] carries everything the sanitizer and the debug view need.
//! Every field has a default, so the crate works without any configuration
//! source. With the `serde` feature the struct deserializes from any serde
//! format, and missing fields fall back to their defaults.

use std::collections::BTreeMap;

use crate::sanitize::Sanitizer;

/// Sensitive key patterns used when none are configured.
pub const DEFAULT_SENSITIVE_KEYS: &[&str] = &[
    "password",
    "pass",
    "secret",
    "token",
    "api_key",
    "apikey",
    "ssn",
    "card",
    "authorization",
];

/// Replacement text for redacted values.
pub const DEFAULT_REDACTION: &str = "***REDACTED***";

/// Strings longer than this many characters are truncated.
pub const DEFAULT_MAX_STRING_LENGTH: usize = 200;

/// Settings for sanitization and the debug view.
///
/// # Examples
///
/// ```
/// use resultflow::config::DebugConfig;
///
/// let config = DebugConfig::default()
///     .with_sensitive_keys(["*_id", "session"])
///     .with_max_string_length(32)
///     .with_log_level("TimeoutError", "warning");
///
/// assert!(config.enabled);
/// assert_eq!(config.sensitive_keys.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DebugConfig {
    /// When false, sanitization returns its input unchanged.
    pub enabled: bool,
    /// Replacement for values under sensitive keys.
    pub redaction: String,
    /// Key patterns: plain substrings, or globs using `*` and `?`.
    pub sensitive_keys: Vec<String>,
    /// Maximum string length, in characters, before truncation.
    pub max_string_length: usize,
    /// Whether long strings are truncated.
    pub truncate_strings: bool,
    /// Log levels keyed by error type name or error code.
    pub log_level_map: BTreeMap<String, String>,
    /// Level used when nothing in `log_level_map` matches; `None` disables it.
    pub default_log_level: Option<String>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        DebugConfig {
            enabled: true,
            redaction: DEFAULT_REDACTION.to_string(),
            sensitive_keys: DEFAULT_SENSITIVE_KEYS.iter().map(|k| k.to_string()).collect(),
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            truncate_strings: true,
            log_level_map: BTreeMap::new(),
            default_log_level: Some("error".to_string()),
        }
    }
}

impl DebugConfig {
    /// Defaults with sanitization switched off.
    pub fn disabled() -> Self {
        DebugConfig {
            enabled: false,
            ..Self::default()
        }
    }

    /// Replace the sensitive key patterns.
    pub fn with_sensitive_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.sensitive_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Set the redaction text.
    pub fn with_redaction(mut self, redaction: impl Into<String>) -> Self {
        self.redaction = redaction.into();
        self
    }

    /// Set the truncation threshold.
    pub fn with_max_string_length(mut self, max: usize) -> Self {
        self.max_string_length = max;
        self
    }

    /// Enable or disable truncation.
    pub fn with_truncate_strings(mut self, enabled: bool) -> Self {
        self.truncate_strings = enabled;
        self
    }

    /// Map an error type name or code to a log level.
    pub fn with_log_level(mut self, key: impl Into<String>, level: impl Into<String>) -> Self {
        self.log_level_map.insert(key.into(), level.into());
        self
    }

    /// Set the fallback log level.
    pub fn with_default_log_level(mut self, level: Option<String>) -> Self {
        self.default_log_level = level;
        self
    }

    /// Build a sanitizer from these settings.
    pub fn sanitizer(&self) -> Sanitizer {
        Sanitizer::new(self)
    }
}
