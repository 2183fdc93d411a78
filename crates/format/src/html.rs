//! HTML helpers shared by the file-backed formats.
//!
//! [`scraper::Html`] is not `Send`, so everything here is synchronous and
//! must not be held across an `.await`.

use crate::consts::{H1_SELECTOR, PARAGRAPH_SELECTOR, PRE_SELECTOR};
use html2md::rewrite_html as html_to_markdown;
use scraper::{ElementRef, Html, Selector};

/// The parts of a static documentation page that map onto content fields.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Page {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub declaration: Option<String>,
    pub description: Option<String>,
}

pub(crate) fn parse_page(html: &str) -> Page {
    let document = Html::parse_document(html);
    let description = markdown(html);
    Page {
        title: first_text(&document, &H1_SELECTOR),
        summary: first_text(&document, &PARAGRAPH_SELECTOR),
        declaration: document
            .select(&PRE_SELECTOR)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .find(|text| !text.is_empty()),
        description,
    }
}

/// Markdown rendering of an HTML fragment or document, `None` when empty.
pub(crate) fn markdown(html: &str) -> Option<String> {
    let markdown = html_to_markdown(html, true);
    let markdown = markdown.trim();
    (!markdown.is_empty()).then(|| markdown.to_string())
}

/// Visible text of an HTML fragment, whitespace collapsed.
pub(crate) fn text(html: &str) -> Option<String> {
    let fragment = Html::parse_fragment(html);
    let text = collapse(fragment.root_element());
    (!text.is_empty()).then_some(text)
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).map(collapse).find(|text| !text.is_empty())
}

fn collapse(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}
