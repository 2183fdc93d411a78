use serde::{Deserialize, Serialize};

/// A cross-reference to another documentation item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub title: String,
    pub url: Option<String>,
    #[serde(rename = "abstract")]
    pub summary: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub beta: bool,
}
impl ContentItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Default::default() }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A named group of cross-references ("Topics", "See Also").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSection {
    pub title: String,
    pub items: Vec<ContentItem>,
}

/// A kind-tagged group of cross-references ("Inherits From", "Conforms To").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: String,
    pub title: String,
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    pub version: Option<String>,
}

/// The extracted body of one entry.
///
/// Only `title` and `type` are guaranteed; everything else depends on how
/// much structure the source format carries. A handler that finds no body at
/// all returns no `ParsedContent` rather than an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedContent {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub language: Option<String>,
    pub framework: Option<String>,
    #[serde(rename = "abstract")]
    pub summary: Option<String>,
    pub declaration: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_value: Option<String>,
    pub topics: Vec<TopicSection>,
    pub see_also: Vec<TopicSection>,
    pub relationships: Vec<Relationship>,
    /// Ancestor titles, outermost first.
    pub hierarchy: Vec<String>,
    pub deprecated: bool,
    pub beta: bool,
    pub platforms: Vec<Platform>,
}
impl ParsedContent {
    pub fn new(title: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { title: title.into(), kind: kind.into(), ..Default::default() }
    }

    /// Every cross-reference in the content, mutably, in display order.
    ///
    /// Used by layouts that rewrite reference URLs into local links.
    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut ContentItem> {
        self.topics
            .iter_mut()
            .chain(self.see_also.iter_mut())
            .flat_map(|section| section.items.iter_mut())
            .chain(self.relationships.iter_mut().flat_map(|r| r.items.iter_mut()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_mut_visits_every_reference() {
        let mut content = ParsedContent::new("UIView", "Class");
        content.topics.push(TopicSection {
            title: "Creating a View".into(),
            items: vec![ContentItem::new("init(frame:)"), ContentItem::new("init(coder:)")],
        });
        content.see_also.push(TopicSection { title: "Related".into(), items: vec![ContentItem::new("UIWindow")] });
        content.relationships.push(Relationship {
            kind: "inheritsFrom".into(),
            title: "Inherits From".into(),
            items: vec![ContentItem::new("UIResponder")],
        });
        for item in content.items_mut() {
            item.url = Some(format!("#{}", item.title));
        }
        let urls: Vec<_> = content.items_mut().map(|i| i.url.clone().unwrap()).collect();
        assert_eq!(urls, ["#init(frame:)", "#init(coder:)", "#UIWindow", "#UIResponder"]);
    }

    #[test]
    fn test_serializes_abstract_and_type() {
        let mut content = ParsedContent::new("array_map", "Function");
        content.summary = Some("Applies the callback".into());
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["abstract"], "Applies the callback");
        assert_eq!(json["type"], "Function");
        assert_eq!(json["return_value"], serde_json::Value::Null);
    }
}
