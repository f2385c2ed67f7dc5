//! Host patterns and their compiled form.
//!
//! [`Pattern`] is the data a policy author writes. [`CompiledPattern`] is what
//! the resolver evaluates: the pattern text lower-cased once, and for globs a
//! pre-built anchored regex.

use std::borrow::Cow;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Exactly one matcher kind with its pattern text.
///
/// Serializes externally tagged, e.g. `{"Suffix": ".example.com"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    /// Whole hostname equals the text.
    Exact(String),
    /// Hostname starts with the text. No label boundary is implied.
    Prefix(String),
    /// Hostname ends with the text. Use a leading `.` for "subdomains of".
    Suffix(String),
    /// `*` is any run of characters, `?` exactly one, everything else literal.
    Glob(String),
}

impl Pattern {
    /// Matcher kind name as written in policy documents.
    pub fn kind(&self) -> &'static str {
        match self {
            Pattern::Exact(_) => "Exact",
            Pattern::Prefix(_) => "Prefix",
            Pattern::Suffix(_) => "Suffix",
            Pattern::Glob(_) => "Glob",
        }
    }

    /// Raw pattern text.
    pub fn text(&self) -> &str {
        match self {
            Pattern::Exact(s) | Pattern::Prefix(s) | Pattern::Suffix(s) | Pattern::Glob(s) => s,
        }
    }

    /// Compile for evaluation.
    pub fn compile(self) -> Result<CompiledPattern, regex::Error> {
        CompiledPattern::new(self)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind(), self.text())
    }
}

// ─────────────────────────────────────────────────────────────────
// Compiled Pattern
// ─────────────────────────────────────────────────────────────────

/// A pattern ready for case-insensitive evaluation against hostnames.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: Pattern,
    needle: String,
    glob: Option<Regex>,
}

impl CompiledPattern {
    pub fn new(pattern: Pattern) -> Result<Self, regex::Error> {
        let needle = pattern.text().to_lowercase();
        let glob = match &pattern {
            Pattern::Glob(_) => Some(glob_to_regex(&needle)?),
            _ => None,
        };
        Ok(Self {
            pattern,
            needle,
            glob,
        })
    }

    /// The source pattern.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Evaluate against a hostname, ignoring case.
    pub fn matches(&self, host: &str) -> bool {
        let host = lowercase(host);
        let host = host.as_ref();
        match &self.pattern {
            Pattern::Exact(_) => host == self.needle,
            Pattern::Prefix(_) => host.starts_with(&self.needle),
            Pattern::Suffix(_) => host.ends_with(&self.needle),
            Pattern::Glob(_) => self.glob.as_ref().is_some_and(|re| re.is_match(host)),
        }
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

/// Lower-case without allocating when the input already is.
pub(crate) fn lowercase(host: &str) -> Cow<'_, str> {
    if host.chars().any(char::is_uppercase) {
        Cow::Owned(host.to_lowercase())
    } else {
        Cow::Borrowed(host)
    }
}

/// Translate glob text into an anchored regex. Only `*` and `?` are special.
/// A run of `*` is equivalent to a single one and compiles to one `.*`.
fn glob_to_regex(glob: &str) -> Result<Regex, regex::Error> {
    let mut source = String::with_capacity(glob.len() + 8);
    source.push_str("(?s)^");
    let mut literal = [0u8; 4];
    let mut previous = None;
    for c in glob.chars() {
        match c {
            '*' if previous == Some('*') => {}
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut literal))),
        }
        previous = Some(c);
    }
    source.push('$');
    Regex::new(&source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(pattern: Pattern) -> CompiledPattern {
        pattern.compile().unwrap()
    }

    #[test]
    fn test_exact_is_case_insensitive() {
        let p = compiled(Pattern::Exact("Example.com".into()));
        assert!(p.matches("example.com"));
        assert!(p.matches("EXAMPLE.COM"));
        assert!(!p.matches("www.example.com"));
    }

    #[test]
    fn test_prefix_has_no_label_boundary() {
        let p = compiled(Pattern::Prefix("ab".into()));
        assert!(p.matches("abc.com"));
        assert!(p.matches("AB.org"));
        assert!(!p.matches("cab.com"));
    }

    #[test]
    fn test_suffix_inserts_no_separator() {
        let p = compiled(Pattern::Suffix(".example.com".into()));
        assert!(p.matches("shop.example.com"));
        assert!(p.matches("Shop.Example.COM"));
        assert!(!p.matches("example.com"));
        assert!(!p.matches("example.org"));

        let bare = compiled(Pattern::Suffix("example.com".into()));
        assert!(bare.matches("badexample.com"));
    }

    #[test]
    fn test_glob_star_spans_labels() {
        let p = compiled(Pattern::Glob("*.example.com".into()));
        assert!(p.matches("a.example.com"));
        assert!(p.matches("a.b.example.com"));
        assert!(!p.matches("example.com"));
        assert!(!p.matches("a.example.com.evil"));
    }

    #[test]
    fn test_glob_question_mark_is_one_char() {
        let p = compiled(Pattern::Glob("img?.cdn.com".into()));
        assert!(p.matches("img1.cdn.com"));
        assert!(p.matches("IMGx.cdn.com"));
        assert!(!p.matches("img12.cdn.com"));
        assert!(!p.matches("img.cdn.com"));
    }

    #[test]
    fn test_glob_escapes_metacharacters() {
        let p = compiled(Pattern::Glob("a.b".into()));
        assert!(p.matches("a.b"));
        assert!(!p.matches("axb"));

        let p = compiled(Pattern::Glob("[ab]+(c)|d^$\\".into()));
        assert!(p.matches("[ab]+(c)|d^$\\"));
        assert!(!p.matches("a"));
    }

    #[test]
    fn test_glob_star_runs_collapse() {
        let doubled = compiled(Pattern::Glob("img**.cdn.com".into()));
        assert!(doubled.matches("img.cdn.com"));
        assert!(doubled.matches("img42.eu.cdn.com"));
        assert!(!doubled.matches("img.cdn.org"));

        let huge = compiled(Pattern::Glob("*".repeat(200_000)));
        assert!(huge.matches("anything.example"));
        assert!(huge.matches(""));
    }

    #[test]
    fn test_empty_pattern_semantics() {
        assert!(compiled(Pattern::Exact(String::new())).matches(""));
        assert!(!compiled(Pattern::Exact(String::new())).matches("a.com"));
        assert!(compiled(Pattern::Prefix(String::new())).matches("anything.com"));
        assert!(compiled(Pattern::Suffix(String::new())).matches("anything.com"));
        assert!(compiled(Pattern::Glob(String::new())).matches(""));
        assert!(!compiled(Pattern::Glob(String::new())).matches("a"));
    }

    #[test]
    fn test_serde_external_tagging() {
        let json = serde_json::to_string(&Pattern::Suffix(".google.com".into())).unwrap();
        assert_eq!(json, r#"{"Suffix":".google.com"}"#);
        let parsed: Pattern = serde_json::from_str(r#"{"Glob":"*.cdn.com"}"#).unwrap();
        assert_eq!(parsed, Pattern::Glob("*.cdn.com".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Pattern::Exact("a.com".into()).to_string(), r#"Exact("a.com")"#);
    }
}
