//! Output-tree path helpers shared by converters and format handlers.
//!
//! All paths produced here are *relative* to the conversion's output
//! directory and use sanitized segments only, so they are stable across runs
//! and safe on case-insensitive filesystems.

use crate::kind::normalize;
use crate::{FALLBACK_NAME, sanitize};
use std::path::{Component, Path, PathBuf};

/// File name of the top-level index page.
pub const ROOT_INDEX: &str = "index.md";
/// File name of a per-category index page.
pub const CATEGORY_INDEX: &str = "_index.md";
/// Extension of every generated page.
pub const EXTENSION: &str = "md";
/// Directory used for Apple entries that are not under `documentation/`.
pub const GENERAL_SEGMENT: &str = "general";

/// The directory a canonical or raw type code is written under.
///
/// ```
/// use docset_model::layout::type_directory;
/// assert_eq!(type_directory("func"), "function");
/// assert_eq!(type_directory("Class"), "class");
/// ```
pub fn type_directory(kind: impl AsRef<str>) -> String {
    directory(normalize(kind))
}

/// A sanitized directory segment. Dot-only segments (`.`, `..`) would
/// point elsewhere and are replaced with [`FALLBACK_NAME`].
fn directory(segment: impl AsRef<str>) -> String {
    let segment = sanitize(segment);
    match segment.trim_matches('.').is_empty() {
        true => FALLBACK_NAME.to_string(),
        false => segment,
    }
}

/// `<type>/<name>.md` for the Standard Dash and CoreData layouts.
///
/// ```
/// use docset_model::layout::standard_relative_path;
/// use std::path::Path;
/// assert_eq!(standard_relative_path("array_map", "Function"), Path::new("function/array_map.md"));
/// assert_eq!(standard_relative_path("DateTime", "cl"), Path::new("class/datetime.md"));
/// ```
pub fn standard_relative_path(name: impl AsRef<str>, kind: impl AsRef<str>) -> PathBuf {
    let mut path = PathBuf::from(type_directory(kind));
    path.push(file_name(name));
    path
}

/// `<segment>.md`. The extension is appended, never substituted, so dotted
/// names keep every part.
fn file_name(segment: impl AsRef<str>) -> String {
    format!("{}.{EXTENSION}", sanitize(segment))
}

/// Location of a DocC page in the Apple layout.
///
/// `doc_path` is the request path of the page (`/documentation/uikit/uiview`),
/// optionally carrying a query string or fragment, which are ignored. The
/// result is:
/// - `<language>/<framework>/<framework>.md` for a framework root,
/// - `<language>/<framework>/<segment>/…/<last>.md` below it,
/// - `<language>/general/<name>.md` when there is no `documentation/` segment.
///
/// A missing language is written under `general` as well.
pub fn apple_relative_path(language: Option<&str>, doc_path: &str, name: &str) -> PathBuf {
    let language = language
        .filter(|l| !l.trim_matches('.').trim().is_empty())
        .map_or_else(|| GENERAL_SEGMENT.to_string(), directory);
    let mut path = PathBuf::from(language);
    match documentation_segments(doc_path).as_deref() {
        Some([framework]) => {
            path.push(directory(framework));
            path.push(file_name(framework));
        },
        Some([framework, directories @ .., last]) => {
            path.push(directory(framework));
            directories.iter().for_each(|segment| path.push(directory(segment)));
            path.push(file_name(last));
        },
        _ => {
            path.push(GENERAL_SEGMENT);
            path.push(file_name(name));
        },
    }
    path
}

/// Framework directory name of a DocC request path, if it has one.
///
/// ```
/// use docset_model::layout::apple_framework;
/// assert_eq!(apple_framework("/documentation/UIKit/UIView").as_deref(), Some("uikit"));
/// assert_eq!(apple_framework("/design/human-interface-guidelines"), None);
/// ```
pub fn apple_framework(doc_path: &str) -> Option<String> {
    documentation_segments(doc_path).and_then(|segments| segments.first().map(directory))
}

/// Path segments following `documentation`, without query or fragment.
///
/// `.` and `..` segments are dropped so the result never leaves the
/// framework directory.
fn documentation_segments(doc_path: &str) -> Option<Vec<&str>> {
    let doc_path = doc_path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = doc_path.split('/').filter(|s| !matches!(*s, "" | "." | "..")).collect();
    let position = segments.iter().position(|s| s.eq_ignore_ascii_case("documentation"))?;
    Some(segments[position + 1..].to_vec())
}

/// A relative markdown link from one generated page to another.
///
/// Both arguments are paths relative to the output directory. The result
/// always uses `/` separators.
///
/// ```
/// use docset_model::layout::relative_link;
/// use std::path::Path;
/// assert_eq!(relative_link(Path::new("class/datetime.md"), Path::new("class/dateinterval.md")), "dateinterval.md");
/// assert_eq!(relative_link(Path::new("class/datetime.md"), Path::new("function/date.md")), "../function/date.md");
/// assert_eq!(relative_link(Path::new("index.md"), Path::new("class/_index.md")), "class/_index.md");
/// ```
pub fn relative_link(from_file: &Path, to_file: &Path) -> String {
    let from_dir: Vec<_> = from_file.parent().map(normal_components).unwrap_or_default();
    let to: Vec<_> = normal_components(to_file);
    let common = from_dir.iter().zip(&to).take_while(|(a, b)| a == b).count();
    let ups = std::iter::repeat_n("..".to_string(), from_dir.len() - common);
    ups.chain(to[common..].iter().cloned()).collect::<Vec<_>>().join("/")
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}
