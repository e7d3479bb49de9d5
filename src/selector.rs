//! Required-file patterns and the selection built from them
//!
//! Every analyzer declares the files it reads as [`FilePattern`]s. The registry
//! folds all of them into one [`FileSelection`], which the extractor consults
//! for each archive entry so that only relevant files are ever buffered.
//!
//! Matching rule: paths are normalized first (leading `/` and `./` removed),
//! then an entry is selected if it equals an `Exact` path or if any `Regex`
//! pattern matches it. Regexes are not implicitly anchored, and a `^/` anchor
//! is rewritten to `^` so it can match a normalized path.

use crate::extractor::normalize_path;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

/// A single required-file declaration
#[derive(Clone)]
pub enum FilePattern {
    Exact(String),
    Regex(Regex),
}

impl FilePattern {
    /// Exact path, normalized so `/etc/os-release` and `etc/os-release` are the same entry
    pub fn exact(path: impl AsRef<str>) -> Self {
        FilePattern::Exact(normalize_path(path.as_ref()).to_string())
    }

    /// Regex over normalized paths
    ///
    /// Archive paths are compared without their leading `/`, so a pattern
    /// anchored as `^/...` is rewritten to `^...`. An unanchored pattern is
    /// left alone.
    ///
    /// # Example
    ///
    /// ```
    /// use layerscan::FilePattern;
    ///
    /// let rpmdb = FilePattern::regex(r"^/var/lib/rpm/Packages(\.db)?$").unwrap();
    /// assert!(rpmdb.matches("var/lib/rpm/Packages"));
    /// assert!(rpmdb.matches("./var/lib/rpm/Packages.db"));
    /// assert_eq!(rpmdb, FilePattern::regex(r"^var/lib/rpm/Packages(\.db)?$").unwrap());
    /// ```
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = match pattern.strip_prefix("^/") {
            Some(rest) => Cow::Owned(format!("^{}", rest)),
            None => Cow::Borrowed(pattern),
        };
        Ok(FilePattern::Regex(Regex::new(&pattern)?))
    }

    pub fn matches(&self, path: &str) -> bool {
        let path = normalize_path(path);
        match self {
            FilePattern::Exact(exact) => exact == path,
            FilePattern::Regex(re) => re.is_match(path),
        }
    }

    fn key(&self) -> (&'static str, &str) {
        match self {
            FilePattern::Exact(p) => ("exact", p.as_str()),
            FilePattern::Regex(re) => ("regex", re.as_str()),
        }
    }
}

impl PartialEq for FilePattern {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for FilePattern {}

impl fmt::Debug for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilePattern::Exact(p) => write!(f, "Exact({:?})", p),
            FilePattern::Regex(re) => write!(f, "Regex({:?})", re.as_str()),
        }
    }
}

impl From<&str> for FilePattern {
    fn from(path: &str) -> Self {
        FilePattern::exact(path)
    }
}

/// Deduplicated union of required-file patterns
#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    exact: HashSet<String>,
    patterns: Vec<Regex>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pattern: FilePattern) {
        match pattern {
            FilePattern::Exact(path) => {
                self.exact.insert(path);
            }
            FilePattern::Regex(re) => {
                if !self.patterns.iter().any(|p| p.as_str() == re.as_str()) {
                    self.patterns.push(re);
                }
            }
        }
    }

    /// Whether an archive entry at `path` should be retained
    pub fn matches(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.exact.contains(path) || self.patterns.iter().any(|re| re.is_match(path))
    }

    /// Whether `pattern` is part of this selection (by declaration, not by match)
    pub fn contains(&self, pattern: &FilePattern) -> bool {
        match pattern {
            FilePattern::Exact(path) => self.exact.contains(path),
            FilePattern::Regex(re) => self.patterns.iter().any(|p| p.as_str() == re.as_str()),
        }
    }

    pub fn contains_all<'a>(&self, patterns: impl IntoIterator<Item = &'a FilePattern>) -> bool {
        patterns.into_iter().all(|p| self.contains(p))
    }

    pub fn exact_paths(&self) -> impl Iterator<Item = &str> {
        self.exact.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }
}

impl FromIterator<FilePattern> for FileSelection {
    fn from_iter<I: IntoIterator<Item = FilePattern>>(iter: I) -> Self {
        let mut selection = Self::new();
        selection.extend(iter);
        selection
    }
}

impl Extend<FilePattern> for FileSelection {
    fn extend<I: IntoIterator<Item = FilePattern>>(&mut self, iter: I) {
        for pattern in iter {
            self.insert(pattern);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        absolute = { "/etc/os-release" },
        relative = { "etc/os-release" },
        dot_relative = { "./etc/os-release" },
    )]
    fn test_exact_pattern_ignores_leading_prefix(path: &str) {
        let pattern = FilePattern::exact("/etc/os-release");
        assert!(pattern.matches(path));
    }

    #[test]
    fn test_exact_pattern_is_not_prefix() {
        let pattern = FilePattern::exact("etc/os-release");
        assert!(!pattern.matches("etc/os-release.bak"));
        assert!(!pattern.matches("usr/etc/os-release"));
    }

    #[test]
    fn test_regex_pattern() {
        let pattern = FilePattern::regex(r"^var/lib/rpm/Packages(\.db)?$").unwrap();
        assert!(pattern.matches("/var/lib/rpm/Packages"));
        assert!(pattern.matches("var/lib/rpm/Packages.db"));
        assert!(!pattern.matches("var/lib/rpm/Basenames"));
    }

    #[test]
    fn test_regex_with_absolute_anchor_matches_normalized_path() {
        let pattern = FilePattern::regex("^/etc/os-release$").unwrap();
        assert!(pattern.matches("etc/os-release"));
        assert!(pattern.matches("/etc/os-release"));
        assert!(!pattern.matches("usr/lib/os-release"));

        let selection: FileSelection = vec![
            pattern,
            FilePattern::regex("^etc/os-release$").unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        assert!(FilePattern::regex("([").is_err());
    }

    #[test]
    fn test_selection_deduplicates() {
        let selection: FileSelection = vec![
            FilePattern::exact("/etc/os-release"),
            FilePattern::exact("etc/os-release"),
            FilePattern::regex("^lib/apk/").unwrap(),
            FilePattern::regex("^lib/apk/").unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(selection.len(), 2);
        assert!(selection.contains(&FilePattern::exact("etc/os-release")));
        assert!(selection.contains(&FilePattern::regex("^lib/apk/").unwrap()));
    }

    #[test]
    fn test_selection_matches() {
        let selection: FileSelection = vec![
            FilePattern::exact("etc/debian_version"),
            FilePattern::regex(r"^usr/lib/os-release$").unwrap(),
        ]
        .into_iter()
        .collect();

        assert!(selection.matches("./etc/debian_version"));
        assert!(selection.matches("/usr/lib/os-release"));
        assert!(!selection.matches("etc/passwd"));
    }

    #[test]
    fn test_empty_selection_matches_nothing() {
        let selection = FileSelection::new();
        assert!(selection.is_empty());
        assert!(!selection.matches("etc/os-release"));
    }
}
