// src/pipeline/matcher.rs

use std::fmt;

use regex::Regex;

use crate::errors::{Result, TailshipError};

/// Returns true if any expression in `expressions` matches `value`.
///
/// Evaluation stops at the first match; an empty slice never matches.
pub fn matches_any(value: &str, expressions: &[Regex]) -> bool {
    expressions.iter().any(|exp| exp.is_match(value))
}

/// Ordered set of compiled regular expressions.
///
/// One instance suppresses tailing of whole files (matched against the file
/// path), another suppresses forwarding of individual lines (matched against
/// the transformed line text).
#[derive(Clone, Default)]
pub struct ExclusionSet {
    patterns: Vec<Regex>,
}

impl fmt::Debug for ExclusionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.patterns.iter().map(Regex::as_str))
            .finish()
    }
}

impl ExclusionSet {
    /// An exclusion set that never matches.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile every pattern, failing on the first invalid one.
    pub fn compile<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|source| TailshipError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, value: &str) -> bool {
        matches_any(value, &self.patterns)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Source text of each pattern, in evaluation order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_never_matches() {
        let set = ExclusionSet::empty();
        assert!(!set.matches(""));
        assert!(!set.matches("anything at all"));
    }

    #[test]
    fn any_pattern_matching_is_enough() {
        let set = ExclusionSet::compile([r"\.gz$", "^/tmp/"]).unwrap();
        assert!(set.matches("/var/log/app.log.1.gz"));
        assert!(set.matches("/tmp/app.log"));
        assert!(!set.matches("/var/log/app.log"));
    }

    #[test]
    fn invalid_pattern_is_reported_with_its_source() {
        let err = ExclusionSet::compile(["ok", "(unclosed"]).unwrap_err();
        match err {
            TailshipError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sources_preserve_order() {
        let set = ExclusionSet::compile(["b", "a"]).unwrap();
        assert_eq!(set.sources().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(set.len(), 2);
    }
}
