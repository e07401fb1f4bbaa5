//! Typed command options

use super::Preset;
use crate::Result;
use crate::dedup::DetectionMode;
use crate::names::{NameRule, NameRules};

/// Options shared by the workflows.
///
/// `None` scalars mean "not given" so that merging can tell an explicit
/// `false` from an absent flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOptions {
    pub extensions: Vec<String>,
    pub preferred: Vec<String>,
    pub by_name: Option<bool>,
    pub by_content: Option<bool>,
    /// Directory-exclusion globs, relative to the project root.
    pub exclude: Vec<String>,
    pub remove: Option<String>,
    /// `PATTERN=REPLACEMENT` rules.
    pub replace: Vec<String>,
    pub lowercase: Option<bool>,
    pub keep_src: Option<bool>,
}

fn union(first: &[String], second: &[String]) -> Vec<String> {
    let mut merged = first.to_vec();
    for item in second {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}

impl ToolOptions {
    /// Fill gaps in `self` from `fallback`. Scalars set in `self` win; lists
    /// are unioned with `self`'s entries first.
    ///
    /// The two detection flags are one setting: when `self` sets either of
    /// them, both of `fallback`'s are ignored.
    pub fn merge(&self, fallback: &ToolOptions) -> ToolOptions {
        let (by_name, by_content) = if self.by_name.is_some() || self.by_content.is_some() {
            (self.by_name, self.by_content)
        } else {
            (fallback.by_name, fallback.by_content)
        };
        ToolOptions {
            extensions: union(&self.extensions, &fallback.extensions),
            preferred: union(&self.preferred, &fallback.preferred),
            by_name,
            by_content,
            exclude: union(&self.exclude, &fallback.exclude),
            remove: self.remove.clone().or_else(|| fallback.remove.clone()),
            replace: union(&self.replace, &fallback.replace),
            lowercase: self.lowercase.or(fallback.lowercase),
            keep_src: self.keep_src.or(fallback.keep_src),
        }
    }

    pub fn detection_mode(&self) -> Result<DetectionMode> {
        DetectionMode::from_flags(
            self.by_content.unwrap_or(false),
            self.by_name.unwrap_or(false),
        )
    }

    /// Rename rules in application order: remove, replacements, lowercase.
    pub fn name_rules(&self) -> Result<NameRules> {
        let mut rules = NameRules::new();
        if let Some(pattern) = &self.remove {
            rules.push(NameRule::remove(pattern)?);
        }
        for spec in &self.replace {
            rules.push(NameRule::parse_replace(spec)?);
        }
        if self.lowercase.unwrap_or(false) {
            rules.push(NameRule::Lowercase);
        }
        Ok(rules)
    }

    pub fn keep_src(&self) -> bool {
        self.keep_src.unwrap_or(false)
    }
}

impl From<&Preset> for ToolOptions {
    fn from(preset: &Preset) -> Self {
        Self {
            extensions: preset.ext.clone(),
            preferred: preset.preferred.clone(),
            by_name: preset.by_name,
            by_content: preset.by_content,
            exclude: preset.exclude.clone(),
            remove: preset.remove.clone(),
            replace: preset.replace.clone(),
            lowercase: preset.lowercase,
            keep_src: preset.keep_src,
        }
    }
}
