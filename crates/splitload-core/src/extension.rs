//! Extension sets
//!
//! An [`ExtensionSet`] holds the file extensions one backend accepts. Entries
//! are normalised once at construction (trimmed, leading dot stripped,
//! lowercased) so lookups only have to lowercase their input.

use std::collections::BTreeSet;

/// Normalised set of file extensions (lowercase, no leading dot).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExtensionSet {
    extensions: BTreeSet<String>,
}

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize(ext.as_ref()))
            .collect();
        Self { extensions }
    }

    /// Build a set from a comma separated list such as `"txt, .CSV,log"`.
    pub fn parse_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Case-insensitive membership test. The input is only lowercased, not
    /// trimmed, so `" txt"` is not a member of a set holding `txt`.
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(&extension.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /// Extensions present in both sets, in sorted order.
    pub fn overlap<'a>(&'a self, other: &'a ExtensionSet) -> impl Iterator<Item = &'a str> {
        self.extensions
            .intersection(&other.extensions)
            .map(String::as_str)
    }
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_on_construction() {
        let set = ExtensionSet::parse_list(" TXT, .csv ,,Log ");
        let entries: Vec<&str> = set.iter().collect();
        assert_eq!(entries, vec!["csv", "log", "txt"]);
    }

    #[test]
    fn membership_is_case_insensitive() {
        let set = ExtensionSet::new(["jpg", "png"]);
        assert!(set.contains("JPG"));
        assert!(set.contains("Png"));
        assert!(!set.contains("gif"));
        assert!(!set.contains(""));
    }

    #[test]
    fn membership_does_not_trim_input() {
        let set = ExtensionSet::new(["txt"]);
        assert!(!set.contains(" txt"));
        assert!(!set.contains(".txt"));
        assert!(!set.contains("txt "));
    }

    #[test]
    fn empty_list_yields_empty_set() {
        assert!(ExtensionSet::parse_list("").is_empty());
        assert!(ExtensionSet::parse_list(" , ,").is_empty());
    }

    #[test]
    fn overlap_lists_shared_extensions() {
        let a = ExtensionSet::parse_list("txt,jpg,csv");
        let b = ExtensionSet::parse_list("JPG,png,csv");
        let shared: Vec<&str> = a.overlap(&b).collect();
        assert_eq!(shared, vec!["csv", "jpg"]);
    }
}
