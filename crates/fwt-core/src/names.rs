//! File-name rewrite rules
//!
//! Rules apply to each segment of a project-relative path independently, in
//! the order they were added.

use crate::{Error, Result};
use fwt_fs::NormalizedPath;
use regex::Regex;

/// A single segment rewrite.
#[derive(Debug, Clone)]
pub enum NameRule {
    /// Delete every match.
    Remove(Regex),
    /// Replace every match; `$1`-style group references are expanded.
    Replace(Regex, String),
    /// Lowercase the whole segment.
    Lowercase,
}

impl NameRule {
    pub fn remove(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::pattern(pattern, e))?;
        Ok(Self::Remove(regex))
    }

    pub fn replace(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::pattern(pattern, e))?;
        Ok(Self::Replace(regex, replacement.into()))
    }

    /// Parse `PATTERN=REPLACEMENT`, splitting at the first `=`.
    pub fn parse_replace(spec: &str) -> Result<Self> {
        match spec.split_once('=') {
            Some((pattern, replacement)) => Self::replace(pattern, replacement),
            None => Self::replace(spec, ""),
        }
    }

    fn apply(&self, segment: &str) -> String {
        match self {
            Self::Remove(regex) => regex.replace_all(segment, "").into_owned(),
            Self::Replace(regex, with) => regex.replace_all(segment, with.as_str()).into_owned(),
            Self::Lowercase => segment.to_lowercase(),
        }
    }
}

/// An ordered list of [`NameRule`]s.
#[derive(Debug, Clone, Default)]
pub struct NameRules {
    rules: Vec<NameRule>,
}

impl NameRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: NameRule) {
        self.rules.push(rule);
    }

    pub fn with(mut self, rule: NameRule) -> Self {
        self.push(rule);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Rewrite one path segment. A rule that would empty the segment is
    /// skipped.
    pub fn apply_segment(&self, segment: &str) -> String {
        self.rules.iter().fold(segment.to_string(), |current, rule| {
            let next = rule.apply(&current);
            if next.is_empty() { current } else { next }
        })
    }

    /// Rewrite every segment of a relative path.
    pub fn apply(&self, relative: &NormalizedPath) -> NormalizedPath {
        relative
            .segments()
            .map(|segment| self.apply_segment(segment))
            .fold(NormalizedPath::empty(), |path, segment| path.join(segment))
    }
}

impl FromIterator<NameRule> for NameRules {
    fn from_iter<I: IntoIterator<Item = NameRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn lowercase_applies_to_every_segment() {
        let rules = NameRules::new().with(NameRule::Lowercase);
        assert_eq!(
            rules.apply(&NormalizedPath::new("IMG/Hero.PNG")).as_str(),
            "img/hero.png"
        );
    }

    #[rstest]
    #[case(r"\(\d+\)", "a(1).png", "a.png")]
    #[case(r"\s+", "big map.webp", "bigmap.webp")]
    #[case(r"^.*$", "token.png", "token.png")]
    fn remove_rule(#[case] pattern: &str, #[case] input: &str, #[case] expected: &str) {
        let rules = NameRules::new().with(NameRule::remove(pattern).unwrap());
        assert_eq!(rules.apply_segment(input), expected);
    }

    #[test]
    fn rules_apply_in_order() {
        let rules: NameRules = [
            NameRule::parse_replace(" =_").unwrap(),
            NameRule::Lowercase,
        ]
        .into_iter()
        .collect();
        assert_eq!(
            rules.apply(&NormalizedPath::new("Maps/Big Map.WEBP")).as_str(),
            "maps/big_map.webp"
        );
    }

    #[test]
    fn replace_expands_groups() {
        let rule = NameRule::replace(r"(\w+)-copy", "$1").unwrap();
        let rules = NameRules::new().with(rule);
        assert_eq!(rules.apply_segment("hero-copy.png"), "hero.png");
    }

    #[test]
    fn invalid_pattern_is_reported() {
        assert!(matches!(
            NameRule::remove("("),
            Err(Error::InvalidPattern { .. })
        ));
    }
}
