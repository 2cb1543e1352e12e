//! Sensitive-key patterns and their compiled cache.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;

type Cache = HashMap<Vec<String>, Arc<PatternSet>>;

/// Distinct pattern lists kept compiled at once. Inserting past this empties
/// the cache first.
pub const CACHE_CAPACITY: usize = 64;

static COMPILED: Lazy<Mutex<Cache>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// One sensitive-key pattern.
#[derive(Debug, Clone)]
enum KeyPattern {
    /// Lowercased substring matched anywhere in the lowercased key.
    Substring(String),
    /// Anchored, case-insensitive glob.
    Glob(Regex),
}

impl KeyPattern {
    fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        if !raw.contains(|c: char| c == '*' || c == '?') {
            return Some(KeyPattern::Substring(raw.to_lowercase()));
        }

        match Regex::new(&glob_to_regex(raw)) {
            Ok(re) => Some(KeyPattern::Glob(re)),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(pattern = raw, error = %_err, "ignoring sensitive key pattern that failed to compile");
                None
            }
        }
    }

    fn matches(&self, key: &str, lowered: &str) -> bool {
        match self {
            KeyPattern::Substring(needle) => lowered.contains(needle.as_str()),
            KeyPattern::Glob(re) => re.is_match(key),
        }
    }
}

/// `*` matches any run of characters, `?` exactly one; everything else is literal.
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    out.push_str("(?is)^");
    let mut buf = [0u8; 4];
    for ch in glob.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    out.push('$');
    out
}

fn compile_cached(cache: &mut Cache, capacity: usize, patterns: &[String]) -> Arc<PatternSet> {
    if let Some(set) = cache.get(patterns) {
        return Arc::clone(set);
    }

    let set = Arc::new(PatternSet {
        patterns: patterns.iter().filter_map(|p| KeyPattern::parse(p)).collect(),
    });
    if cache.len() >= capacity {
        cache.clear();
    }
    cache.insert(patterns.to_vec(), Arc::clone(&set));
    set
}

/// A compiled list of sensitive-key patterns.
///
/// Sets are cached per distinct pattern list, so building a sanitizer from
/// the same configuration twice compiles the globs once.
#[derive(Debug)]
pub struct PatternSet {
    patterns: Vec<KeyPattern>,
}

impl PatternSet {
    /// Compile `patterns`, reusing a cached set when the list was seen before.
    ///
    /// At most [`CACHE_CAPACITY`] lists stay cached; sets already handed out
    /// remain valid after eviction.
    pub fn compile(patterns: &[String]) -> Arc<PatternSet> {
        compile_cached(&mut COMPILED.lock(), CACHE_CAPACITY, patterns)
    }

    /// Returns true if `key` matches any pattern.
    pub fn is_match(&self, key: &str) -> bool {
        let lowered = key.to_lowercase();
        self.patterns.iter().any(|p| p.matches(key, &lowered))
    }

    /// Number of usable patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if no usable pattern was configured.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> Arc<PatternSet> {
        let owned: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        PatternSet::compile(&owned)
    }

    #[test]
    fn plain_patterns_match_substrings_ignoring_case() {
        let s = set(&["token"]);
        assert!(s.is_match("X-Auth-TOKEN-value"));
        assert!(!s.is_match("tok"));
    }

    #[test]
    fn plain_pattern_does_not_match_shorter_key() {
        assert!(!set(&["password"]).is_match("pass"));
    }

    #[test]
    fn leading_star_anchors_suffix() {
        let s = set(&["*token"]);
        assert!(s.is_match("mytoken"));
        assert!(!s.is_match("tokenmy"));
    }

    #[test]
    fn trailing_star_anchors_prefix() {
        let s = set(&["token*"]);
        assert!(s.is_match("token123"));
        assert!(!s.is_match("123token"));
    }

    #[test]
    fn question_mark_matches_exactly_one_char() {
        let s = set(&["?id"]);
        assert!(s.is_match("xid"));
        assert!(!s.is_match("id"));
        assert!(!s.is_match("xxid"));
    }

    #[test]
    fn globs_ignore_case() {
        assert!(set(&["*ToKeN*"]).is_match("refresh_TOKEN_v2"));
    }

    #[test]
    fn glob_literals_are_escaped() {
        let s = set(&["api_*", "*_key"]);
        assert!(s.is_match("api_secret"));
        assert!(s.is_match("private_key"));
        assert!(!s.is_match("apikey"));

        let dotted = set(&["a.b*"]);
        assert!(dotted.is_match("a.bc"));
        assert!(!dotted.is_match("axbc"));
    }

    #[test]
    fn empty_patterns_are_skipped() {
        let s = set(&["", "ssn"]);
        assert_eq!(s.len(), 1);
        assert!(!s.is_match("anything"));
    }

    #[test]
    fn identical_lists_share_compiled_set() {
        let mut cache = Cache::new();
        let list = vec!["*_shared_*".to_string()];
        let a = compile_cached(&mut cache, 4, &list);
        let b = compile_cached(&mut cache, 4, &list);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn cache_never_grows_past_capacity() {
        let mut cache = Cache::new();
        let first = compile_cached(&mut cache, 4, &["key_0".to_string()]);

        for i in 1..20 {
            compile_cached(&mut cache, 4, &[format!("key_{}", i)]);
            assert!(cache.len() <= 4);
        }

        assert!(first.is_match("KEY_0"));
        let again = compile_cached(&mut cache, 4, &["key_0".to_string()]);
        assert!(!Arc::ptr_eq(&first, &again));
    }
}
