//! Glob handling for file selection and key exclusion
//!
//! File and archive-member selection uses [`PatternSet`], a priority-ordered
//! list of compiled globs. Key exclusion in namelists uses [`KeyFilter`], which
//! translates every glob to a regex and compiles their union once.
use std::path::Path;

use glob::Pattern;
use regex::Regex;

use crate::error::{Result, ScanError};

/// Translate a shell glob to an (unanchored) regex fragment.
///
/// `*` and `?` match any character including `/`; `[...]` and `[!...]` are
/// character classes. An unclosed `[` is taken literally.
#[must_use]
pub fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                // Consecutive stars mean the same thing as one
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => {
                let mut j = i;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str(r"\[");
                    continue;
                }
                out.push('[');
                let class = &chars[i..j];
                for (k, &ch) in class.iter().enumerate() {
                    match ch {
                        '!' if k == 0 => out.push('^'),
                        '-' => out.push('-'),
                        '\\' | '[' | ']' | '&' | '~' | '^' => {
                            out.push('\\');
                            out.push(ch);
                        }
                        _ => out.push(ch),
                    }
                }
                out.push(']');
                i = j + 1;
            }
            _ => out.push_str(&regex::escape(&c.to_string())),
        }
    }

    out
}

/// Precompiled exclude rule for qualified keys.
///
/// A key is excluded when it fully matches any of the globs. An empty list
/// excludes nothing.
#[derive(Debug, Clone, Default)]
pub struct KeyFilter {
    re: Option<Regex>,
}

impl KeyFilter {
    /// Compile the union of `patterns`
    pub fn new(patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self { re: None });
        }
        let alternatives: Vec<String> = patterns
            .iter()
            .map(|p| format!(r"(?s:{})\z", glob_to_regex(p)))
            .collect();
        let combined = format!("^(?:{})", alternatives.join("|"));
        let re = Regex::new(&combined).map_err(|e| ScanError::InvalidPattern {
            pattern: patterns.join(", "),
            reason: e.to_string(),
        })?;
        Ok(Self { re: Some(re) })
    }

    #[must_use]
    pub fn is_excluded(&self, key: &str) -> bool {
        self.re.as_ref().is_some_and(|re| re.is_match(key))
    }
}

/// Priority-ordered list of file globs
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|e| ScanError::InvalidPattern {
                    pattern: p.as_ref().to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Patterns in priority order
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Check a path against one pattern: full text first, then the file name
    #[must_use]
    pub fn pattern_matches(pattern: &Pattern, path: &Path) -> bool {
        if pattern.matches(&path.to_string_lossy()) {
            return true;
        }
        path.file_name()
            .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
    }

    /// Check if a path matches any pattern in the set
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        self.patterns
            .iter()
            .any(|p| Self::pattern_matches(p, path))
    }

    /// Comma-separated pattern list for error messages
    #[must_use]
    pub fn describe(&self) -> String {
        self.patterns
            .iter()
            .map(Pattern::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_literal_and_star() {
        assert_eq!(glob_to_regex("*.nml"), r".*\.nml");
        assert_eq!(glob_to_regex("a**b"), "a.*b");
    }

    #[test]
    fn test_translate_classes() {
        assert_eq!(glob_to_regex("[abc]"), "[abc]");
        assert_eq!(glob_to_regex("[!0-9]x"), "[^0-9]x");
        assert_eq!(glob_to_regex("x[y"), r"x\[y");
    }

    #[test]
    fn test_key_filter_empty_matches_nothing() {
        let filter = KeyFilter::new(&[]).unwrap();
        assert!(!filter.is_excluded(""));
        assert!(!filter.is_excluded("ocean_nml%dt"));
    }

    #[test]
    fn test_key_filter_union() {
        let filter =
            KeyFilter::new(&["*%layout".to_string(), "coupler_nml%dt_?".to_string()]).unwrap();
        assert!(filter.is_excluded("ocean_model_nml%layout"));
        assert!(filter.is_excluded("coupler_nml%dt_a"));
        assert!(!filter.is_excluded("coupler_nml%dt_atmos"));
        assert!(!filter.is_excluded("ocean_model_nml%layout_x"));
    }

    #[test]
    fn test_key_filter_is_anchored() {
        let filter = KeyFilter::new(&["dt".to_string()]).unwrap();
        assert!(filter.is_excluded("dt"));
        assert!(!filter.is_excluded("x%dt"));
        assert!(!filter.is_excluded("dt2"));
    }

    #[test]
    fn test_pattern_set_matches_full_path_or_name() {
        let set = PatternSet::new(&["*MOM_parameter_doc.all", "input.nml"]).unwrap();
        assert!(set.matches(Path::new("run/001/MOM_parameter_doc.all")));
        assert!(set.matches(Path::new("run/input.nml")));
        assert!(!set.matches(Path::new("run/MOM_parameter_doc.short")));
    }

    #[test]
    fn test_pattern_set_star_crosses_separator() {
        let set = PatternSet::new(&["*logfile.*"]).unwrap();
        assert!(set.matches(Path::new("a/b/ocean.logfile.000000.out")));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = PatternSet::new(&["[a-"]);
        assert!(matches!(result, Err(ScanError::InvalidPattern { .. })));
    }

    #[test]
    fn test_describe() {
        let set = PatternSet::new(&["*.nml", "input.nml"]).unwrap();
        assert_eq!(set.describe(), "*.nml, input.nml");
    }
}
