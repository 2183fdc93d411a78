//! DocC render JSON.
//!
//! Only the parts of the render node that carry documentation are modelled;
//! unknown section, block and inline kinds deserialize to `Unknown` and are
//! skipped.

use docset_model::{ContentItem, Parameter, ParsedContent, Platform, Relationship, TopicSection};
use serde::Deserialize;
use std::collections::HashMap;

const RETURN_VALUE_HEADING: &str = "Return Value";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RenderNode {
    metadata: Metadata,
    #[serde(rename = "abstract")]
    summary: Vec<Inline>,
    primary_content_sections: Vec<Section>,
    topic_sections: Vec<Group>,
    see_also_sections: Vec<Group>,
    relationships_sections: Vec<Group>,
    hierarchy: Hierarchy,
    references: HashMap<String, Reference>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Metadata {
    title: Option<String>,
    role_heading: Option<String>,
    symbol_kind: Option<String>,
    modules: Vec<Module>,
    platforms: Vec<PlatformAvailability>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Module {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PlatformAvailability {
    name: String,
    introduced_at: Option<String>,
    deprecated: bool,
    beta: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum Section {
    Declarations {
        #[serde(default)]
        declarations: Vec<Declaration>,
    },
    Parameters {
        #[serde(default)]
        parameters: Vec<ParameterDoc>,
    },
    Content {
        #[serde(default)]
        content: Vec<Block>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Declaration {
    tokens: Vec<Token>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Token {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParameterDoc {
    name: String,
    content: Vec<Block>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Block {
    Paragraph {
        #[serde(rename = "inlineContent", default)]
        inline_content: Vec<Inline>,
    },
    Heading {
        #[serde(default)]
        level: u8,
        #[serde(default)]
        text: String,
    },
    CodeListing {
        #[serde(default)]
        syntax: Option<String>,
        #[serde(default)]
        code: Vec<String>,
    },
    UnorderedList {
        #[serde(default)]
        items: Vec<ListItem>,
    },
    OrderedList {
        #[serde(default)]
        items: Vec<ListItem>,
    },
    Aside {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        style: Option<String>,
        #[serde(default)]
        content: Vec<Block>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListItem {
    content: Vec<Block>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Inline {
    Text {
        #[serde(default)]
        text: String,
    },
    CodeVoice {
        #[serde(default)]
        code: String,
    },
    Reference {
        identifier: String,
        #[serde(rename = "overridingTitle", default)]
        overriding_title: Option<String>,
    },
    Emphasis {
        #[serde(rename = "inlineContent", default)]
        inline_content: Vec<Inline>,
    },
    Strong {
        #[serde(rename = "inlineContent", default)]
        inline_content: Vec<Inline>,
    },
    NewTerm {
        #[serde(rename = "inlineContent", default)]
        inline_content: Vec<Inline>,
    },
    Link {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        destination: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Group {
    title: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    identifiers: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Hierarchy {
    paths: Vec<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Reference {
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "abstract")]
    summary: Vec<Inline>,
    required: bool,
    deprecated: bool,
    beta: bool,
}

impl RenderNode {
    pub(crate) fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub(crate) fn title(&self) -> Option<&str> {
        self.metadata.title.as_deref()
    }

    /// Role heading (`Class`, `Instance Method`) or symbol kind, as stored.
    pub(crate) fn kind(&self) -> Option<&str> {
        self.metadata.role_heading.as_deref().or(self.metadata.symbol_kind.as_deref())
    }

    pub(crate) fn module(&self) -> Option<&str> {
        self.metadata.modules.first().map(|m| m.name.as_str()).filter(|name| !name.is_empty())
    }

    /// Fill `content` with everything the render node documents.
    pub(crate) fn into_content(self, mut content: ParsedContent) -> ParsedContent {
        let refs = &self.references;
        content.summary = non_empty(inlines(&self.summary, refs));
        for section in &self.primary_content_sections {
            match section {
                Section::Declarations { declarations } => {
                    if content.declaration.is_none() {
                        content.declaration = declarations
                            .first()
                            .and_then(|d| non_empty(d.tokens.iter().map(|t| t.text.as_str()).collect()));
                    }
                },
                Section::Parameters { parameters } => {
                    content.parameters.extend(parameters.iter().map(|p| Parameter {
                        name: p.name.clone(),
                        description: blocks(&p.content, refs),
                    }));
                },
                Section::Content { content: body } => {
                    let (description, return_value) = split_return_value(body, refs);
                    content.description = join_optional(content.description.take(), description);
                    content.return_value = join_optional(content.return_value.take(), return_value);
                },
                Section::Unknown => {},
            }
        }
        content.topics = self.topic_sections.iter().map(|g| topic_section(g, refs)).collect();
        content.see_also = self.see_also_sections.iter().map(|g| topic_section(g, refs)).collect();
        content.relationships = self
            .relationships_sections
            .iter()
            .map(|g| Relationship {
                kind: g.kind.clone().unwrap_or_default(),
                title: g.title.clone().unwrap_or_default(),
                items: g.identifiers.iter().map(|id| content_item(id, refs)).collect(),
            })
            .collect();
        content.hierarchy = self
            .hierarchy
            .paths
            .first()
            .map(|path| path.iter().filter_map(|id| refs.get(id).and_then(|r| r.title.clone())).collect())
            .unwrap_or_default();
        content.platforms = self
            .metadata
            .platforms
            .iter()
            .map(|p| Platform { name: p.name.clone(), version: p.introduced_at.clone() })
            .collect();
        content.deprecated |= self.metadata.platforms.iter().any(|p| p.deprecated);
        content.beta |= self.metadata.platforms.iter().any(|p| p.beta);
        content
    }
}

fn topic_section(group: &Group, refs: &HashMap<String, Reference>) -> TopicSection {
    TopicSection {
        title: group.title.clone().unwrap_or_default(),
        items: group.identifiers.iter().map(|id| content_item(id, refs)).collect(),
    }
}

/// A cross-reference; unresolvable identifiers keep their last path segment
/// as the title and have no URL.
fn content_item(identifier: &str, refs: &HashMap<String, Reference>) -> ContentItem {
    match refs.get(identifier) {
        Some(reference) => ContentItem {
            title: reference.title.clone().unwrap_or_else(|| fallback_title(identifier)),
            url: reference.url.clone(),
            summary: non_empty(inlines(&reference.summary, refs)),
            required: reference.required,
            deprecated: reference.deprecated,
            beta: reference.beta,
        },
        None => ContentItem::new(fallback_title(identifier)),
    }
}

fn fallback_title(identifier: &str) -> String {
    identifier.rsplit('/').next().unwrap_or(identifier).to_string()
}

/// Separate the blocks under a "Return Value" heading from the rest.
fn split_return_value(body: &[Block], refs: &HashMap<String, Reference>) -> (Option<String>, Option<String>) {
    let mut description = Vec::new();
    let mut return_value = Vec::new();
    let mut in_return: Option<u8> = None;
    for block in body {
        if let Block::Heading { level, text } = block {
            match in_return {
                Some(return_level) if *level <= return_level => in_return = None,
                _ => {},
            }
            if text.trim().eq_ignore_ascii_case(RETURN_VALUE_HEADING) {
                in_return = Some(*level);
                continue;
            }
        }
        match in_return {
            Some(_) => return_value.push(block),
            None => description.push(block),
        }
    }
    (non_empty(render_blocks(description, refs)), non_empty(render_blocks(return_value, refs)))
}

fn blocks(blocks: &[Block], refs: &HashMap<String, Reference>) -> String {
    render_blocks(blocks.iter(), refs)
}

fn render_blocks<'b>(blocks: impl IntoIterator<Item = &'b Block>, refs: &HashMap<String, Reference>) -> String {
    blocks.into_iter().filter_map(|b| block(b, refs)).collect::<Vec<_>>().join("\n\n")
}

fn block(block: &Block, refs: &HashMap<String, Reference>) -> Option<String> {
    let rendered = match block {
        Block::Paragraph { inline_content } => inlines(inline_content, refs),
        Block::Heading { level, text } => format!("{} {text}", "#".repeat((*level).clamp(2, 6).into())),
        Block::CodeListing { syntax, code } => {
            format!("```{}\n{}\n```", syntax.as_deref().unwrap_or_default(), code.join("\n"))
        },
        Block::UnorderedList { items } => list(items, refs, |_| "-".to_string()),
        Block::OrderedList { items } => list(items, refs, |i| format!("{}.", i + 1)),
        Block::Aside { name, style, content } => {
            let label = name.clone().or_else(|| style.as_deref().map(capitalize)).unwrap_or_else(|| "Note".into());
            let body = blocks(content, refs);
            body.lines().fold(format!("> **{label}:**"), |acc, line| format!("{acc}\n> {line}"))
        },
        Block::Unknown => return None,
    };
    non_empty(rendered)
}

fn list(items: &[ListItem], refs: &HashMap<String, Reference>, marker: impl Fn(usize) -> String) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{} {}", marker(i), blocks(&item.content, refs).replace('\n', "\n  ")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn inlines(inlines: &[Inline], refs: &HashMap<String, Reference>) -> String {
    inlines.iter().map(|i| inline(i, refs)).collect()
}

fn inline(inline: &Inline, refs: &HashMap<String, Reference>) -> String {
    match inline {
        Inline::Text { text } => text.clone(),
        Inline::CodeVoice { code } => format!("`{code}`"),
        Inline::Reference { identifier, overriding_title } => {
            let title = overriding_title
                .clone()
                .or_else(|| refs.get(identifier).and_then(|r| r.title.clone()))
                .unwrap_or_else(|| fallback_title(identifier));
            format!("`{title}`")
        },
        Inline::Emphasis { inline_content } => format!("*{}*", inlines(inline_content, refs)),
        Inline::Strong { inline_content } => format!("**{}**", inlines(inline_content, refs)),
        Inline::NewTerm { inline_content } => format!("*{}*", inlines(inline_content, refs)),
        Inline::Link { title, destination } => {
            format!("[{}]({destination})", title.as_deref().unwrap_or(destination.as_str()))
        },
        Inline::Unknown => String::new(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn join_optional(a: Option<String>, b: Option<String>) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) => Some(format!("{a}\n\n{b}")),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UIVIEW_INIT: &str = r#"{
        "metadata": {
            "title": "init(frame:)",
            "roleHeading": "Initializer",
            "symbolKind": "init",
            "modules": [{"name": "UIKit"}],
            "platforms": [
                {"name": "iOS", "introducedAt": "2.0"},
                {"name": "visionOS", "introducedAt": "1.0", "beta": true}
            ]
        },
        "abstract": [
            {"type": "text", "text": "Initializes a view with the "},
            {"type": "codeVoice", "code": "frame"},
            {"type": "text", "text": " rectangle."}
        ],
        "primaryContentSections": [
            {"kind": "declarations", "declarations": [{"tokens": [
                {"kind": "keyword", "text": "init"},
                {"kind": "text", "text": "("},
                {"kind": "externalParam", "text": "frame"},
                {"kind": "text", "text": ": "},
                {"kind": "typeIdentifier", "text": "CGRect"},
                {"kind": "text", "text": ")"}
            ]}]},
            {"kind": "parameters", "parameters": [
                {"name": "frame", "content": [{"type": "paragraph", "inlineContent": [{"type": "text", "text": "The frame rectangle."}]}]}
            ]},
            {"kind": "mentions", "mentions": []},
            {"kind": "content", "content": [
                {"type": "heading", "level": 2, "text": "Return Value", "anchor": "return-value"},
                {"type": "paragraph", "inlineContent": [{"type": "text", "text": "An initialized view."}]},
                {"type": "heading", "level": 2, "text": "Discussion", "anchor": "discussion"},
                {"type": "paragraph", "inlineContent": [
                    {"type": "text", "text": "See "},
                    {"type": "reference", "identifier": "doc://com.apple.uikit/documentation/UIKit/UIView", "isActive": true}
                ]},
                {"type": "unorderedList", "items": [
                    {"content": [{"type": "paragraph", "inlineContent": [{"type": "text", "text": "one"}]}]}
                ]},
                {"type": "video", "identifier": "intro.mp4"}
            ]}
        ],
        "topicSections": [
            {"title": "Related", "identifiers": [
                "doc://com.apple.uikit/documentation/UIKit/UIView",
                "doc://com.apple.uikit/documentation/UIKit/Unresolved"
            ]}
        ],
        "relationshipsSections": [
            {"type": "conformsTo", "title": "Conforms To", "identifiers": ["doc://com.apple.uikit/documentation/UIKit/UIView"]}
        ],
        "hierarchy": {"paths": [["doc://com.apple.documentation/documentation/technologies", "doc://com.apple.uikit/documentation/UIKit", "doc://com.apple.uikit/documentation/UIKit/UIView"]]},
        "references": {
            "doc://com.apple.uikit/documentation/UIKit": {"type": "topic", "title": "UIKit", "url": "/documentation/uikit"},
            "doc://com.apple.uikit/documentation/UIKit/UIView": {
                "type": "topic", "title": "UIView", "url": "/documentation/uikit/uiview",
                "abstract": [{"type": "text", "text": "An object that manages content."}],
                "kind": "symbol"
            },
            "intro.mp4": {"type": "video", "alt": "An introduction"}
        }
    }"#;

    fn render(json: &str) -> ParsedContent {
        RenderNode::from_slice(json.as_bytes()).unwrap().into_content(ParsedContent::new("fallback", "Method"))
    }

    #[test]
    fn test_metadata() {
        let node = RenderNode::from_slice(UIVIEW_INIT.as_bytes()).unwrap();
        assert_eq!(node.title(), Some("init(frame:)"));
        assert_eq!(node.kind(), Some("Initializer"));
        assert_eq!(node.module(), Some("UIKit"));
    }

    #[test]
    fn test_into_content() {
        let content = render(UIVIEW_INIT);
        assert_eq!(content.summary.as_deref(), Some("Initializes a view with the `frame` rectangle."));
        assert_eq!(content.declaration.as_deref(), Some("init(frame: CGRect)"));
        assert_eq!(content.parameters, [Parameter { name: "frame".into(), description: "The frame rectangle.".into() }]);
        assert_eq!(content.return_value.as_deref(), Some("An initialized view."));
        assert_eq!(content.description.as_deref(), Some("## Discussion\n\nSee `UIView`\n\n- one"));
        assert_eq!(content.hierarchy, ["UIKit", "UIView"]);
        assert_eq!(content.platforms.len(), 2);
        assert!(content.beta);
        assert!(!content.deprecated);
    }

    #[test]
    fn test_references_resolve_to_items() {
        let content = render(UIVIEW_INIT);
        let items = &content.topics[0].items;
        assert_eq!(items[0].title, "UIView");
        assert_eq!(items[0].url.as_deref(), Some("/documentation/uikit/uiview"));
        assert_eq!(items[0].summary.as_deref(), Some("An object that manages content."));
        assert_eq!(items[1].title, "Unresolved");
        assert_eq!(items[1].url, None);
        assert_eq!(content.relationships[0].kind, "conformsTo");
        assert_eq!(content.relationships[0].items[0].title, "UIView");
    }

    #[test]
    fn test_minimal_node() {
        let content = render(r#"{"metadata": {"title": "Date"}}"#);
        assert_eq!(content.title, "fallback");
        assert!(content.summary.is_none());
        assert!(content.topics.is_empty());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(RenderNode::from_slice(b"{\"metadata\": [").is_err());
    }
}
