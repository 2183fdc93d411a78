//! Markdown rendering of entry and index pages.
//!
//! Both page kinds are [upon] templates embedded at compile time from
//! `templates/` via [`rust-embed`](rust_embed). Templates see a flattened
//! view of the content so that link syntax, badges and breadcrumbs are
//! decided here rather than in template logic. One formatter is registered:
//!
//! - **`oneline`**: collapses every whitespace run (newlines included) into a
//!   single space, for summaries shown inside list items.

use crate::error::{ErrorKind, Result};
use docset_model::{ContentItem, Parameter, ParsedContent};
use exn::{OptionExt, ResultExt};
use rust_embed::Embed;
use serde::Serialize;
use std::path::PathBuf;
use tracing::instrument;
use upon::{Engine, Template};

const ENTRY_TEMPLATE: &str = "entry.md";
const INDEX_TEMPLATE: &str = "index.md";
const SEPARATOR: &str = " · ";

#[derive(Embed)]
#[folder = "templates/"]
struct Templates;

/// One generated index page. `path` is relative to the output directory and
/// every `href` relative to `path`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexPage {
    #[serde(skip)]
    pub path: PathBuf,
    pub title: String,
    pub parent: Option<IndexLink>,
    pub summary: Option<String>,
    pub sections: Vec<IndexSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexSection {
    pub title: Option<String>,
    pub links: Vec<IndexLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexLink {
    pub title: String,
    pub href: String,
    pub summary: Option<String>,
    pub count: Option<u64>,
}

#[derive(Debug, Serialize)]
struct EntryView<'a> {
    title: &'a str,
    breadcrumb: Option<String>,
    badges: String,
    summary: Option<&'a str>,
    declaration: Option<&'a str>,
    declaration_language: &'a str,
    parameters: &'a [Parameter],
    return_value: Option<&'a str>,
    description: Option<&'a str>,
    sections: Vec<SectionView<'a>>,
    platforms: Option<String>,
}

#[derive(Debug, Serialize)]
struct SectionView<'a> {
    heading: &'static str,
    groups: Vec<GroupView<'a>>,
}

#[derive(Debug, Serialize)]
struct GroupView<'a> {
    title: &'a str,
    items: Vec<ItemView<'a>>,
}

#[derive(Debug, Serialize)]
struct ItemView<'a> {
    link: String,
    flags: String,
    summary: Option<&'a str>,
}
impl<'a> From<&'a ContentItem> for ItemView<'a> {
    fn from(item: &'a ContentItem) -> Self {
        let link = match &item.url {
            Some(url) => format!("[{}]({url})", item.title),
            None => item.title.clone(),
        };
        let flags = [(item.required, "Required"), (item.deprecated, "Deprecated"), (item.beta, "Beta")]
            .into_iter()
            .filter_map(|(set, flag)| set.then_some(flag))
            .collect::<Vec<_>>()
            .join(", ");
        Self { link, flags, summary: item.summary.as_deref() }
    }
}
impl<'a> From<&'a ParsedContent> for EntryView<'a> {
    fn from(content: &'a ParsedContent) -> Self {
        let badges = std::iter::once(content.kind.as_str())
            .chain(content.framework.as_deref())
            .chain(content.language.as_deref())
            .chain(content.deprecated.then_some("Deprecated"))
            .chain(content.beta.then_some("Beta"))
            .filter(|badge| !badge.is_empty())
            .collect::<Vec<_>>()
            .join(SEPARATOR);
        let group = |title: &'a str, items: &'a [ContentItem]| GroupView {
            title,
            items: items.iter().map(ItemView::from).collect(),
        };
        let sections = [
            ("Topics", content.topics.iter().map(|s| group(s.title.as_str(), s.items.as_slice())).collect::<Vec<_>>()),
            ("Relationships", content.relationships.iter().map(|r| group(r.title.as_str(), r.items.as_slice())).collect()),
            ("See Also", content.see_also.iter().map(|s| group(s.title.as_str(), s.items.as_slice())).collect()),
        ]
        .into_iter()
        .filter(|(_, groups)| groups.iter().any(|g| !g.items.is_empty()))
        .map(|(heading, groups)| SectionView { heading, groups })
        .collect();
        let platforms = content
            .platforms
            .iter()
            .map(|p| match &p.version {
                Some(version) => format!("{} {version}+", p.name),
                None => p.name.clone(),
            })
            .collect::<Vec<_>>();
        Self {
            title: &content.title,
            breadcrumb: (!content.hierarchy.is_empty()).then(|| content.hierarchy.join(" › ")),
            badges,
            summary: content.summary.as_deref(),
            declaration: content.declaration.as_deref(),
            declaration_language: content.language.as_deref().unwrap_or_default(),
            parameters: &content.parameters,
            return_value: content.return_value.as_deref(),
            description: content.description.as_deref(),
            sections,
            platforms: (!platforms.is_empty()).then(|| platforms.join(", ")),
        }
    }
}

/// Renders entry and index pages from the embedded templates.
///
/// Templates are compiled once in [`new`](Self::new), so a broken template
/// fails the run before any page is written.
pub struct MarkdownGenerator {
    engine: Engine<'static>,
    entry: Template<'static>,
    index: Template<'static>,
}
impl MarkdownGenerator {
    pub fn new() -> Result<Self> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let entry = Self::compile(&engine, ENTRY_TEMPLATE)?;
        let index = Self::compile(&engine, INDEX_TEMPLATE)?;
        Ok(Self { engine, entry, index })
    }

    fn compile(engine: &Engine<'static>, name: &'static str) -> Result<Template<'static>> {
        let source = Templates::get(name).ok_or_raise(|| ErrorKind::Render(name))?.data;
        let source = String::from_utf8(source.into_owned()).or_raise(|| ErrorKind::Render(name))?;
        engine.compile(source).or_raise(|| ErrorKind::Render(name))
    }

    #[instrument(level = "trace", skip_all, fields(title = content.title))]
    pub fn render_entry(&self, content: &ParsedContent) -> Result<String> {
        let rendered = self
            .entry
            .render(&self.engine, EntryView::from(content))
            .to_string()
            .or_raise(|| ErrorKind::Render(ENTRY_TEMPLATE))?;
        Ok(tidy(&rendered))
    }

    #[instrument(level = "trace", skip_all, fields(path = %page.path.display()))]
    pub fn render_index(&self, page: &IndexPage) -> Result<String> {
        let rendered =
            self.index.render(&self.engine, page).to_string().or_raise(|| ErrorKind::Render(INDEX_TEMPLATE))?;
        Ok(tidy(&rendered))
    }
}

/// Collapse blank-line runs left behind by template tags, outside code
/// fences, and end the page with exactly one newline.
fn tidy(rendered: &str) -> String {
    let mut out = String::with_capacity(rendered.len());
    let mut fenced = false;
    let mut blank = true;
    for line in rendered.lines() {
        if line.trim_start().starts_with("```") {
            fenced = !fenced;
        } else if !fenced && line.trim().is_empty() {
            if blank {
                continue;
            }
            blank = true;
            out.push('\n');
            continue;
        }
        blank = false;
        out.push_str(if fenced { line } else { line.trim_end() });
        out.push('\n');
    }
    let trimmed = out.trim_end();
    format!("{trimmed}\n")
}

/// Custom [`upon`] formatters for markdown output.
mod addons {
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    fn oneline_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", s.split_whitespace().collect::<Vec<_>>().join(" "))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("oneline", oneline_formatter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docset_model::{Platform, Relationship, TopicSection};

    fn uiview() -> ParsedContent {
        let mut content = ParsedContent::new("UIView", "Class");
        content.framework = Some("UIKit".into());
        content.language = Some("swift".into());
        content.summary = Some("An object that manages\n  the content of a rectangle.".into());
        content.declaration = Some("@MainActor class UIView".into());
        content.description = Some("## Overview\n\nViews are the fundamental building blocks.".into());
        content.hierarchy = vec!["UIKit".into()];
        content.topics.push(TopicSection {
            title: "Creating a View Object".into(),
            items: vec![ContentItem {
                summary: Some("Initializes a view\nwith a frame.".into()),
                ..ContentItem::new("init(frame:)").with_url("uiview/init_frame.md")
            }],
        });
        content.relationships.push(Relationship {
            kind: "inheritsFrom".into(),
            title: "Inherits From".into(),
            items: vec![ContentItem::new("UIResponder")],
        });
        content.platforms.push(Platform { name: "iOS".into(), version: Some("2.0".into()) });
        content
    }

    #[test]
    fn test_render_entry() {
        let generator = MarkdownGenerator::new().unwrap();
        let page = generator.render_entry(&uiview()).unwrap();
        assert!(page.starts_with("# UIView\n\nUIKit\n\n*Class · UIKit · swift*\n"), "{page}");
        assert!(page.contains("```swift\n@MainActor class UIView\n```"), "{page}");
        assert!(page.contains("## Topics"), "{page}");
        assert!(page.contains("### Creating a View Object"), "{page}");
        assert!(page.contains("- [init(frame:)](uiview/init_frame.md): Initializes a view with a frame.\n"), "{page}");
        assert!(page.contains("### Inherits From\n\n- UIResponder\n"), "{page}");
        assert!(page.contains("## Availability\n\niOS 2.0+"), "{page}");
        assert!(!page.contains("See Also"), "{page}");
        assert!(!page.contains("\n\n\n"), "{page}");
        assert!(page.ends_with("iOS 2.0+\n"), "{page}");
    }

    #[test]
    fn test_render_minimal_entry() {
        let generator = MarkdownGenerator::new().unwrap();
        let page = generator.render_entry(&ParsedContent::new("array_map", "Function")).unwrap();
        assert_eq!(page, "# array_map\n\n*Function*\n");
    }

    #[test]
    fn test_render_parameters_and_return_value() {
        let generator = MarkdownGenerator::new().unwrap();
        let mut content = ParsedContent::new("init(frame:)", "Initializer");
        content.parameters = vec![
            Parameter { name: "frame".into(), description: "The frame\nrectangle.".into() },
            Parameter { name: "style".into(), description: "A style.".into() },
        ];
        content.return_value = Some("An initialized view.".into());
        content.deprecated = true;
        let page = generator.render_entry(&content).unwrap();
        assert!(page.contains("*Initializer · Deprecated*"), "{page}");
        assert!(page.contains("## Parameters\n\n- `frame`: The frame rectangle.\n- `style`: A style.\n"), "{page}");
        assert!(page.contains("## Return Value\n\nAn initialized view."), "{page}");
    }

    #[test]
    fn test_render_index() {
        let generator = MarkdownGenerator::new().unwrap();
        let page = IndexPage {
            path: PathBuf::from("function/_index.md"),
            title: "Function".into(),
            parent: Some(IndexLink { title: "Documentation".into(), href: "../index.md".into(), ..Default::default() }),
            summary: None,
            sections: vec![IndexSection {
                title: None,
                links: vec![
                    IndexLink { title: "array_map".into(), href: "array_map.md".into(), summary: Some("Applies\nthe callback".into()), count: None },
                    IndexLink { title: "strlen".into(), href: "strlen.md".into(), summary: None, count: None },
                ],
            }],
        };
        let rendered = generator.render_index(&page).unwrap();
        assert_eq!(
            rendered,
            "# Function\n\n[Up: Documentation](../index.md)\n\n- [array_map](array_map.md): Applies the callback\n- [strlen](strlen.md)\n"
        );
    }

    #[test]
    fn test_tidy_keeps_code_blocks() {
        let tidied = tidy("\n\n# T\n\n\n\ntext  \n```\na\n\n\nb\n```\n\n\n");
        assert_eq!(tidied, "# T\n\ntext\n```\na\n\n\nb\n```\n");
    }
}
