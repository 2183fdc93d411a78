use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Opaque entry identifier, unique within one docset.
///
/// SQLite-backed formats use the row's integer primary key; formats keyed by
/// document path use the path itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Int(i64),
    Text(String),
}
impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => write!(f, "{id}"),
        }
    }
}
impl From<i64> for EntryId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}
impl From<String> for EntryId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}
impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

/// One documentation item, as enumerated by a format handler.
///
/// Entries are produced lazily, never mutated and never persisted; they only
/// live for the duration of one conversion pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEntry {
    pub id: EntryId,
    /// Raw display name. May contain signature syntax (`init(frame:)`) or
    /// namespace separators.
    pub name: String,
    /// Type code, either raw (`func`) or already canonical (`Function`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Source-relative reference used to locate the entry's content. This is
    /// **not** the output path.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
}
impl NormalizedEntry {
    pub fn new(
        id: impl Into<EntryId>,
        name: impl Into<String>,
        kind: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            path: path.into(),
            language: None,
            framework: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<Option<String>>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_framework(mut self, framework: impl Into<Option<String>>) -> Self {
        self.framework = framework.into();
        self
    }

    /// The entry's type code mapped to its canonical name.
    pub fn canonical_kind(&self) -> String {
        crate::kind::normalize(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_display() {
        assert_eq!(EntryId::from(42).to_string(), "42");
        assert_eq!(EntryId::from("ls/documentation/uikit").to_string(), "ls/documentation/uikit");
    }

    #[test]
    fn test_canonical_kind() {
        let entry = NormalizedEntry::new(1, "array_map", "func", "array-map.html");
        assert_eq!(entry.canonical_kind(), "Function");
        assert_eq!(entry.kind, "func", "raw type code is left untouched");
    }

    #[test]
    fn test_serializes_type_field() {
        let entry = NormalizedEntry::new(7, "DateTime", "Class", "class.datetime.html").with_language("php".to_string());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "Class");
        assert_eq!(json["id"], 7);
        assert_eq!(json["language"], "php");
        assert!(json.get("framework").is_none());
    }
}
