//! Apple API request keys.
//!
//! Apple bundles address every page with a request key such as
//! `ls/documentation/uikit/uiview`: a two-character language prefix followed
//! by the DocC request path. The same key, hashed, names the page's row in
//! the content cache.

use crate::consts::{DASH_ENTRY_MARKER, REQUEST_KEY};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use docset_model::layout::apple_framework;
use sha1::{Digest, Sha1};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

const PREFIX_LEN: usize = 2;
const HASH_BYTES: usize = 6;
/// Language prefixes and the language names they stand for.
pub const LANGUAGES: [(&str, &str); 2] = [("ls", "swift"), ("lc", "objc")];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    prefix: String,
    path: String,
}
impl RequestKey {
    /// Extract the key from a search index path
    /// (`dash-apple-api://load?request_key=ls/documentation/uikit&language=swift`).
    pub fn from_index_path(raw: &str) -> Option<Self> {
        let cleaned = DASH_ENTRY_MARKER.replace_all(raw, "");
        let key = REQUEST_KEY.captures(&cleaned)?.get(1)?.as_str();
        key.parse().ok()
    }

    /// Two-character language prefix, `ls` or `lc`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Request path, starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn language(&self) -> Option<&'static str> {
        prefix_language(&self.prefix)
    }

    pub fn framework(&self) -> Option<String> {
        apple_framework(&self.path)
    }

    /// The content cache identifier of this page:
    /// `prefix + base64url(sha1(lowercase(path))[..6])`.
    ///
    /// ```
    /// use docset_format::apple::RequestKey;
    /// let key: RequestKey = "ls/documentation/uikit".parse().unwrap();
    /// assert!(key.cache_uuid().starts_with("ls"));
    /// assert_eq!(key.cache_uuid().len(), 10);
    /// ```
    pub fn cache_uuid(&self) -> String {
        let digest = Sha1::digest(self.path.to_lowercase().as_bytes());
        format!("{}{}", self.prefix, URL_SAFE_NO_PAD.encode(&digest[..HASH_BYTES]))
    }
}
impl FromStr for RequestKey {
    type Err = InvalidKey;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match (s.get(..PREFIX_LEN), s.get(PREFIX_LEN..)) {
            (Some(prefix), Some(path)) if path.starts_with('/') && path.len() > 1 => {
                Ok(Self { prefix: prefix.to_string(), path: path.to_string() })
            },
            _ => Err(InvalidKey),
        }
    }
}
impl Display for RequestKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}", self.prefix, self.path)
    }
}

/// A string that is not a `<prefix>/<path>` request key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid request key")]
pub struct InvalidKey;

pub fn prefix_language(prefix: &str) -> Option<&'static str> {
    LANGUAGES.iter().find(|(p, _)| *p == prefix).map(|(_, language)| *language)
}

pub fn language_prefix(language: &str) -> Option<&'static str> {
    LANGUAGES.iter().find(|(_, l)| l.eq_ignore_ascii_case(language)).map(|(prefix, _)| *prefix)
}
