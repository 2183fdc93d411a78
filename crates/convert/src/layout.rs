//! Output layouts: where each entry's page goes and which index pages
//! summarise the tree.

use crate::generator::{IndexLink, IndexPage, IndexSection};
use docset_model::layout::{
    CATEGORY_INDEX, GENERAL_SEGMENT, ROOT_INDEX, apple_relative_path, relative_link, standard_relative_path,
};
use docset_model::{NormalizedEntry, ParsedContent};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

const ROOT_TITLE: &str = "Documentation";

/// Maps entries onto output paths and accumulates what was written so that
/// index pages can be produced without re-reading the output tree.
pub trait Layout: Send + Sync {
    /// Output path of an entry, relative to the output directory. A pure
    /// function of its inputs.
    fn relative_path(&self, entry: &NormalizedEntry, content: &ParsedContent) -> PathBuf;

    /// Rewrite cross-reference URLs into links relative to the page at
    /// `relative`.
    fn link_content(&self, _content: &mut ParsedContent, _relative: &Path) {}

    /// Forget everything tracked so far.
    fn reset(&mut self);

    /// Record a written page.
    fn track(&mut self, entry: &NormalizedEntry, content: &ParsedContent, relative: &Path);

    /// Number of tracked pages.
    fn tracked(&self) -> usize;

    /// Root and per-category index pages for everything tracked.
    fn index_pages(&self) -> Vec<IndexPage>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Tracked {
    title: String,
    path: PathBuf,
    summary: Option<String>,
}
impl Tracked {
    fn new(entry: &NormalizedEntry, content: &ParsedContent, relative: &Path) -> Self {
        Self { title: entry.name.clone(), path: relative.to_path_buf(), summary: content.summary.clone() }
    }

    fn link_from(&self, page: &Path) -> IndexLink {
        IndexLink {
            title: self.title.clone(),
            href: relative_link(page, &self.path),
            summary: self.summary.clone(),
            count: None,
        }
    }
}

fn sorted(entries: &[Tracked]) -> Vec<&Tracked> {
    let mut sorted: Vec<&Tracked> = entries.iter().collect();
    sorted.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()).then_with(|| a.path.cmp(&b.path)));
    sorted
}

fn parent_link(page: &Path) -> IndexLink {
    IndexLink {
        title: ROOT_TITLE.to_string(),
        href: relative_link(page, Path::new(ROOT_INDEX)),
        ..Default::default()
    }
}

fn segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Default)]
struct TypeGroup {
    title: String,
    entries: Vec<Tracked>,
}

/// `<type>/<name>.md`, used for Standard Dash and CoreData docsets.
#[derive(Debug, Default)]
pub struct StandardLayout {
    // Keyed by type directory.
    types: BTreeMap<String, TypeGroup>,
}
impl Layout for StandardLayout {
    fn relative_path(&self, entry: &NormalizedEntry, _content: &ParsedContent) -> PathBuf {
        standard_relative_path(&entry.name, &entry.kind)
    }

    fn reset(&mut self) {
        self.types.clear();
    }

    fn track(&mut self, entry: &NormalizedEntry, content: &ParsedContent, relative: &Path) {
        let directory = segments(relative).into_iter().next().unwrap_or_default();
        let group = self.types.entry(directory).or_insert_with(|| TypeGroup {
            title: entry.canonical_kind(),
            entries: Vec::new(),
        });
        group.entries.push(Tracked::new(entry, content, relative));
    }

    fn tracked(&self) -> usize {
        self.types.values().map(|group| group.entries.len()).sum()
    }

    fn index_pages(&self) -> Vec<IndexPage> {
        let root = PathBuf::from(ROOT_INDEX);
        let mut pages = vec![IndexPage {
            path: root.clone(),
            title: ROOT_TITLE.to_string(),
            parent: None,
            summary: Some(format!("{} entries in {} types.", self.tracked(), self.types.len())),
            sections: vec![IndexSection {
                title: Some("Types".to_string()),
                links: self
                    .types
                    .iter()
                    .map(|(directory, group)| IndexLink {
                        title: group.title.clone(),
                        href: relative_link(&root, &Path::new(directory).join(CATEGORY_INDEX)),
                        summary: None,
                        count: Some(group.entries.len() as u64),
                    })
                    .collect(),
            }],
        }];
        for (directory, group) in &self.types {
            let path = Path::new(directory).join(CATEGORY_INDEX);
            pages.push(IndexPage {
                parent: Some(parent_link(&path)),
                title: group.title.clone(),
                summary: None,
                sections: vec![IndexSection {
                    title: None,
                    links: sorted(&group.entries).into_iter().map(|t| t.link_from(&path)).collect(),
                }],
                path,
            });
        }
        pages
    }
}

#[derive(Debug, Default)]
struct FrameworkGroup {
    title: String,
    types: BTreeMap<String, Vec<Tracked>>,
}
impl FrameworkGroup {
    fn len(&self) -> usize {
        self.types.values().map(Vec::len).sum()
    }
}

/// `<language>/<framework>/<path…>.md`, mirroring DocC request paths.
#[derive(Debug, Default)]
pub struct AppleLayout {
    // language directory -> framework directory -> group
    languages: BTreeMap<String, BTreeMap<String, FrameworkGroup>>,
}
impl AppleLayout {
    fn language(entry: &NormalizedEntry, content: &ParsedContent) -> Option<String> {
        entry.language.clone().or_else(|| content.language.clone())
    }
}
impl Layout for AppleLayout {
    fn relative_path(&self, entry: &NormalizedEntry, content: &ParsedContent) -> PathBuf {
        apple_relative_path(Self::language(entry, content).as_deref(), &entry.path, &entry.name)
    }

    /// `/documentation/…` URLs become links to where that page is (or would
    /// be) written for the same language.
    fn link_content(&self, content: &mut ParsedContent, relative: &Path) {
        let language = segments(relative).into_iter().next().filter(|l| l != GENERAL_SEGMENT);
        for item in content.items_mut() {
            let Some(url) = item.url.as_deref().filter(|url| url.starts_with("/documentation/")) else {
                continue;
            };
            let target = apple_relative_path(language.as_deref(), url, &item.title);
            item.url = Some(relative_link(relative, &target));
        }
    }

    fn reset(&mut self) {
        self.languages.clear();
    }

    fn track(&mut self, entry: &NormalizedEntry, content: &ParsedContent, relative: &Path) {
        let mut parts = segments(relative).into_iter();
        let language = parts.next().unwrap_or_else(|| GENERAL_SEGMENT.to_string());
        let framework = parts.next().unwrap_or_else(|| GENERAL_SEGMENT.to_string());
        let title = match framework.as_str() {
            GENERAL_SEGMENT => GENERAL_SEGMENT.to_string(),
            _ => content.framework.clone().or_else(|| entry.framework.clone()).unwrap_or_else(|| framework.clone()),
        };
        let group = self
            .languages
            .entry(language)
            .or_default()
            .entry(framework)
            .or_insert_with(|| FrameworkGroup { title, types: BTreeMap::new() });
        group.types.entry(content.kind.clone()).or_default().push(Tracked::new(entry, content, relative));
    }

    fn tracked(&self) -> usize {
        self.languages.values().flat_map(BTreeMap::values).map(FrameworkGroup::len).sum()
    }

    fn index_pages(&self) -> Vec<IndexPage> {
        let root = PathBuf::from(ROOT_INDEX);
        let sections = self
            .languages
            .iter()
            .map(|(language, frameworks)| IndexSection {
                title: Some(language.clone()),
                links: frameworks
                    .iter()
                    .map(|(framework, group)| IndexLink {
                        title: group.title.clone(),
                        href: relative_link(&root, &Path::new(language).join(framework).join(CATEGORY_INDEX)),
                        summary: None,
                        count: Some(group.len() as u64),
                    })
                    .collect(),
            })
            .collect();
        let frameworks: usize = self.languages.values().map(BTreeMap::len).sum();
        let mut pages = vec![IndexPage {
            path: root,
            title: ROOT_TITLE.to_string(),
            parent: None,
            summary: Some(format!("{} entries in {frameworks} frameworks.", self.tracked())),
            sections,
        }];
        for (language, frameworks) in &self.languages {
            for (framework, group) in frameworks {
                let path = Path::new(language).join(framework).join(CATEGORY_INDEX);
                pages.push(IndexPage {
                    parent: Some(parent_link(&path)),
                    title: format!("{} ({language})", group.title),
                    summary: None,
                    sections: group
                        .types
                        .iter()
                        .map(|(kind, entries)| IndexSection {
                            title: Some(kind.clone()),
                            links: sorted(entries).into_iter().map(|t| t.link_from(&path)).collect(),
                        })
                        .collect(),
                    path,
                });
            }
        }
        pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docset_model::ContentItem;
    use docset_model::TopicSection;
    use rstest::rstest;

    fn track(layout: &mut impl Layout, entry: NormalizedEntry, content: ParsedContent) -> PathBuf {
        let path = layout.relative_path(&entry, &content);
        layout.track(&entry, &content, &path);
        path
    }

    #[rstest]
    #[case("array_map", "Function", "function/array_map.md")]
    #[case("DateTime", "Class", "class/datetime.md")]
    #[case("DateTime", "cl", "class/datetime.md")]
    fn test_standard_relative_path(#[case] name: &str, #[case] kind: &str, #[case] expected: &str) {
        let entry = NormalizedEntry::new(1, name, kind, "x.html");
        let path = StandardLayout::default().relative_path(&entry, &ParsedContent::new(name, kind));
        assert_eq!(path, Path::new(expected));
    }

    #[test]
    fn test_standard_index_pages() {
        let mut layout = StandardLayout::default();
        track(&mut layout, NormalizedEntry::new(1, "strlen", "func", ""), ParsedContent::new("strlen", "Function"));
        track(&mut layout, NormalizedEntry::new(2, "array_map", "func", ""), ParsedContent::new("array_map", "Function"));
        track(&mut layout, NormalizedEntry::new(3, "DateTime", "cl", ""), ParsedContent::new("DateTime", "Class"));
        assert_eq!(layout.tracked(), 3);

        let pages = layout.index_pages();
        let paths: Vec<&Path> = pages.iter().map(|p| p.path.as_path()).collect();
        assert_eq!(paths, [Path::new("index.md"), Path::new("class/_index.md"), Path::new("function/_index.md")]);
        let root = &pages[0].sections[0].links;
        assert_eq!((root[1].title.as_str(), root[1].href.as_str(), root[1].count), ("Function", "function/_index.md", Some(2)));
        let functions: Vec<(&str, &str)> =
            pages[2].sections[0].links.iter().map(|l| (l.title.as_str(), l.href.as_str())).collect();
        assert_eq!(functions, [("array_map", "array_map.md"), ("strlen", "strlen.md")]);
        assert_eq!(pages[2].parent.as_ref().unwrap().href, "../index.md");

        layout.reset();
        assert_eq!(layout.tracked(), 0);
        assert_eq!(layout.index_pages().len(), 1);
    }

    #[test]
    fn test_apple_paths_and_links() {
        let layout = AppleLayout::default();
        let entry = NormalizedEntry::new(2, "UIView", "Class", "ls/documentation/uikit/uiview")
            .with_language(Some("swift".to_string()));
        let mut content = ParsedContent::new("UIView", "Class");
        content.topics.push(TopicSection {
            title: "Creating a View Object".into(),
            items: vec![
                ContentItem::new("init(frame:)").with_url("/documentation/uikit/uiview/init(frame:)"),
                ContentItem::new("UIKit").with_url("/documentation/uikit"),
                ContentItem::new("Video").with_url("https://developer.apple.com/videos"),
                ContentItem::new("Unresolved"),
            ],
        });
        let path = layout.relative_path(&entry, &content);
        assert_eq!(path, Path::new("swift/uikit/uiview.md"));
        layout.link_content(&mut content, &path);
        let urls: Vec<Option<&str>> = content.topics[0].items.iter().map(|i| i.url.as_deref()).collect();
        assert_eq!(urls, [Some("uiview/init_frame.md"), Some("uikit.md"), Some("https://developer.apple.com/videos"), None]);
    }

    #[test]
    fn test_apple_index_pages() {
        let mut layout = AppleLayout::default();
        let swift = Some("swift".to_string());
        let mut uikit = ParsedContent::new("UIKit", "Framework");
        uikit.framework = Some("UIKit".into());
        track(&mut layout, NormalizedEntry::new(1, "UIKit", "Framework", "ls/documentation/uikit").with_language(swift.clone()), uikit);
        let mut uiview = ParsedContent::new("UIView", "Class");
        uiview.framework = Some("UIKit".into());
        track(&mut layout, NormalizedEntry::new(2, "UIView", "Class", "ls/documentation/uikit/uiview").with_language(swift), uiview);
        track(
            &mut layout,
            NormalizedEntry::new(4, "UIView", "Class", "lc/documentation/uikit/uiview").with_language(Some("objc".to_string())),
            ParsedContent::new("UIView", "Class"),
        );
        assert_eq!(layout.tracked(), 3);

        let pages = layout.index_pages();
        let paths: Vec<&Path> = pages.iter().map(|p| p.path.as_path()).collect();
        assert_eq!(
            paths,
            [Path::new("index.md"), Path::new("objc/uikit/_index.md"), Path::new("swift/uikit/_index.md")]
        );
        let languages: Vec<Option<&str>> = pages[0].sections.iter().map(|s| s.title.as_deref()).collect();
        assert_eq!(languages, [Some("objc"), Some("swift")]);
        assert_eq!(pages[0].sections[1].links[0].href, "swift/uikit/_index.md");
        assert_eq!(pages[0].sections[1].links[0].count, Some(2));
        assert_eq!(pages[2].title, "UIKit (swift)");
        let kinds: Vec<Option<&str>> = pages[2].sections.iter().map(|s| s.title.as_deref()).collect();
        assert_eq!(kinds, [Some("Class"), Some("Framework")]);
        assert_eq!(pages[2].sections[0].links[0].href, "uiview.md");
        assert_eq!(pages[2].parent.as_ref().unwrap().href, "../../index.md");
    }
}
