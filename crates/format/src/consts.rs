use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

selector!(H1_SELECTOR, "h1");
selector!(PARAGRAPH_SELECTOR, "p");
selector!(PRE_SELECTOR, "pre");
// Dash prefixes search index paths with `<dash_entry_name=…>` style markers.
regex!(DASH_ENTRY_MARKER, r"<dash_entry_[^>]*>");
regex!(REQUEST_KEY, r"request_key=([^&#\s]+)");
// Inline markdown links and images: `[text](target)` / `![alt](target)`.
regex!(MARKDOWN_LINK, r"\]\(([^)\s]+)\)");
