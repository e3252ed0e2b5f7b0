//! Package name patterns in the `go` tool's `...` syntax.

use regex::Regex;

/// Compiled set of patterns; a name is kept when any of them matches.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    patterns: Vec<(String, Regex)>,
}

/// Translate a pattern into an anchored regex: `...` matches any string, and a
/// trailing `/...` also matches the bare prefix.
fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    let mut re = regex::escape(pattern).replace(r"\.\.\.", ".*");
    if let Some(prefix) = re.strip_suffix("/.*") {
        re = format!("{}(/.*)?", prefix);
    }
    Regex::new(&format!("^{}$", re))
}

impl PatternMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Ok((p.as_ref().to_string(), compile(p.as_ref())?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True when no patterns are configured or any pattern matches.
    pub fn matches(&self, name: &str) -> bool {
        self.is_empty() || self.patterns.iter().any(|(_, re)| re.is_match(name))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> + '_ {
        self.patterns.iter().map(|(p, _)| p.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        bare_prefix = { "foo/...", "foo", true },
        child = { "foo/...", "foo/bar", true },
        grandchild = { "foo/...", "foo/bar/baz", true },
        sibling_prefix = { "foo/...", "foobar", false },
        exact = { "example.com/x", "example.com/x", true },
        exact_is_anchored = { "example.com/x", "example.com/x/y", false },
        dots_are_literal = { "example.com/x", "exampleXcom/x", false },
        inner_wildcard = { "net/.../http", "net/foo/bar/http", true },
        inner_wildcard_needs_suffix = { "net/.../http", "net/foo", false },
        everything = { "...", "anything/at/all", true },
        suffix_wildcard = { "foo...", "foobar", true },
    )]
    fn test_pattern(pattern: &str, name: &str, expected: bool) {
        let matcher = PatternMatcher::new(&[pattern]).unwrap();
        assert_eq!(matcher.matches(name), expected);
    }

    #[test]
    fn test_no_patterns_keep_everything() {
        let matcher = PatternMatcher::new::<&str>(&[]).unwrap();
        assert!(matcher.is_empty());
        assert!(matcher.matches("whatever"));
    }

    #[test]
    fn test_any_pattern_matches() {
        let matcher = PatternMatcher::new(&["a/...", "b"]).unwrap();
        assert!(matcher.matches("a/x"));
        assert!(matcher.matches("b"));
        assert!(!matcher.matches("c"));
        assert_eq!(matcher.patterns().collect::<Vec<_>>(), vec!["a/...", "b"]);
    }
}
