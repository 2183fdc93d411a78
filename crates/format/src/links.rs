//! Cross-entry link resolution.
//!
//! Formats whose pages link to each other by *source* file path (CoreData)
//! need to know, before any page is converted, where every linked file will
//! end up in the output tree. [`LinkMap`] holds that mapping. It is produced
//! by [`DocsetFormat::prepare`](crate::DocsetFormat::prepare) and has to be
//! passed to every [`extract_content`](crate::DocsetFormat::extract_content)
//! call, so content can only be extracted once the map exists.

use crate::consts::MARKDOWN_LINK;
use docset_model::layout::relative_link;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Source document path (optionally with `#anchor`) to output page path,
/// relative to the output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMap {
    targets: HashMap<String, PathBuf>,
}
impl LinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where `source` is written. The first mapping for a source wins;
    /// returns `false` when `source` was already mapped.
    pub fn insert(&mut self, source: impl Into<String>, output: impl Into<PathBuf>) -> bool {
        let source = normalize_source(&source.into());
        match self.targets.entry(source) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(output.into());
                true
            },
        }
    }

    pub fn get(&self, source: &str) -> Option<&Path> {
        self.targets.get(&normalize_source(source)).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Resolve `href`, as written inside the document at `source_file`, to an
    /// output page. `path#anchor` is tried before the bare path.
    pub fn resolve(&self, source_file: &str, href: &str) -> Option<&Path> {
        if href.contains("://") || href.starts_with("mailto:") {
            return None;
        }
        let (path, anchor) = match href.split_once('#') {
            Some((path, anchor)) => (path, Some(anchor)),
            None => (href, None),
        };
        if path.is_empty() {
            return None;
        }
        let base = Path::new(source_file).parent().unwrap_or(Path::new(""));
        let joined = normalize_source(&base.join(path).to_string_lossy());
        anchor
            .and_then(|anchor| self.targets.get(&format!("{joined}#{anchor}")))
            .or_else(|| self.targets.get(&joined))
            .map(PathBuf::as_path)
    }

    /// Rewrite every markdown link target in `markdown` that points at a
    /// mapped source document into a relative link between output pages.
    ///
    /// `source_file` is the document the markdown was converted from and
    /// `output_file` the page it is written to. Unresolvable and external
    /// links are left alone.
    pub fn rewrite(&self, markdown: &str, source_file: &str, output_file: &Path) -> String {
        if self.is_empty() {
            return markdown.to_string();
        }
        MARKDOWN_LINK
            .replace_all(markdown, |caps: &regex::Captures<'_>| match self.resolve(source_file, &caps[1]) {
                Some(target) => format!("]({})", relative_link(output_file, target)),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Collapse `.` and `..` and use `/` separators so that differently spelled
/// references to the same document share one key.
fn normalize_source(source: &str) -> String {
    let (path, anchor) = match source.split_once('#') {
        Some((path, anchor)) => (path, Some(anchor)),
        None => (source, None),
    };
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop();
            },
            _ => {},
        }
    }
    let path = parts.join("/");
    match anchor {
        Some(anchor) => format!("{path}#{anchor}"),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fixture() -> LinkMap {
        let mut map = LinkMap::new();
        map.insert("Classes/NSString.html", "class/nsstring.md");
        map.insert("Classes/NSString.html#length", "property/length.md");
        map.insert("Functions/NSLog.html", "function/nslog.md");
        map
    }

    #[test]
    fn test_first_insert_wins() {
        let mut map = fixture();
        assert!(!map.insert("./Classes/NSString.html", "class/other.md"));
        assert_eq!(map.get("Classes/NSString.html"), Some(Path::new("class/nsstring.md")));
        assert_eq!(map.len(), 3);
    }

    #[rstest]
    #[case("Classes/NSString.html", "NSString.html#length", Some("property/length.md"))]
    #[case("Classes/NSString.html", "NSString.html#unknown", Some("class/nsstring.md"))]
    #[case("Classes/NSString.html", "../Functions/NSLog.html", Some("function/nslog.md"))]
    #[case("Classes/NSString.html", "#length", None)]
    #[case("Classes/NSString.html", "https://example.com/NSLog.html", None)]
    #[case("Classes/NSString.html", "Missing.html", None)]
    fn test_resolve(#[case] source: &str, #[case] href: &str, #[case] expected: Option<&str>) {
        assert_eq!(fixture().resolve(source, href), expected.map(Path::new));
    }

    #[test]
    fn test_rewrite() {
        let markdown = "See [NSLog](../Functions/NSLog.html) and [length](NSString.html#length), \
                        not [the web](https://example.com).";
        let out = fixture().rewrite(markdown, "Classes/NSString.html", Path::new("class/nsstring.md"));
        assert_eq!(
            out,
            "See [NSLog](../function/nslog.md) and [length](../property/length.md), not [the web](https://example.com)."
        );
    }

    #[test]
    fn test_empty_map_leaves_markdown_untouched() {
        let markdown = "[a](b.html)";
        assert_eq!(LinkMap::new().rewrite(markdown, "x.html", Path::new("type/x.md")), markdown);
    }
}
