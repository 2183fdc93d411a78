use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Optional constraints applied by a format handler at enumeration time.
///
/// Each allow-list is ignored when empty. `types` holds canonical type names;
/// handlers expand them through [`denormalize_all`](crate::kind::denormalize_all)
/// so that legacy codes stored in the source database still match.
/// `frameworks` and `languages` are always lower-case, however they were
/// built or deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryFilters {
    pub types: BTreeSet<String>,
    #[serde(deserialize_with = "lowercase_set")]
    pub frameworks: BTreeSet<String>,
    #[serde(deserialize_with = "lowercase_set")]
    pub languages: BTreeSet<String>,
    pub limit: Option<u64>,
}
impl EntryFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn with_frameworks<I, S>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frameworks.extend(frameworks.into_iter().map(|f| f.into().to_lowercase()));
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages.extend(languages.into_iter().map(|l| l.into().to_lowercase()));
        self
    }

    pub fn with_limit(mut self, limit: impl Into<Option<u64>>) -> Self {
        self.limit = limit.into();
        self
    }

    /// Every raw type code that should match the `types` allow-list.
    pub fn type_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.types.iter().flat_map(|t| crate::kind::denormalize_all(t)).collect();
        codes.sort();
        codes.dedup();
        codes
    }

    /// Clamp a raw row count to the configured limit.
    pub fn clamp(&self, count: u64) -> u64 {
        self.limit.map_or(count, |limit| count.min(limit))
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.frameworks.is_empty() && self.languages.is_empty() && self.limit.is_none()
    }
}

fn lowercase_set<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<String>, D::Error> {
    let values = Vec::<String>::deserialize(deserializer)?;
    Ok(values.into_iter().map(|value| value.to_lowercase()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes_include_legacy_forms() {
        let filters = EntryFilters::new().with_types(["Function", "Class"]);
        let codes = filters.type_codes();
        for expected in ["Function", "func", "Class", "cl"] {
            assert!(codes.iter().any(|c| c == expected), "missing {expected} in {codes:?}");
        }
    }

    #[test]
    fn test_clamp() {
        assert_eq!(EntryFilters::new().clamp(10), 10);
        assert_eq!(EntryFilters::new().with_limit(3).clamp(10), 3);
        assert_eq!(EntryFilters::new().with_limit(30).clamp(10), 10);
    }

    #[test]
    fn test_deserialized_frameworks_and_languages_are_lowercase() {
        let filters: EntryFilters =
            serde_json::from_str(r#"{"frameworks": ["UIKit"], "languages": ["Swift", "Objective-C"]}"#).unwrap();
        assert_eq!(filters, EntryFilters::new().with_frameworks(["uikit"]).with_languages(["swift", "objective-c"]));
    }

    #[test]
    fn test_deserializes_partial() {
        let filters: EntryFilters = serde_json::from_str(r#"{"types": ["Method"], "limit": 5}"#).unwrap();
        assert!(filters.types.contains("Method"));
        assert!(filters.frameworks.is_empty());
        assert_eq!(filters.limit, Some(5));
        assert!(!filters.is_empty());
        assert!(EntryFilters::default().is_empty());
    }
}
