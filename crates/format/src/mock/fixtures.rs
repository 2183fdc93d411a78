//! Small but complete docsets of every flavour, written to disk.
//!
//! Each builder creates its bundle below `root` and returns the bundle path.
//! Builders panic on failure: they only exist for tests.

use crate::DocsetPaths;
use crate::apple::RequestKey;
use docset_blob::Compression;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::path::{Path, PathBuf};

pub const DASH_DOCSET: &str = "PHP.docset";
pub const COREDATA_DOCSET: &str = "Foundation.docset";
pub const APPLE_DOCSET: &str = "Apple_API_Reference.docset";

const ARRAY_MAP_HTML: &str = r#"<!DOCTYPE html>
<html><head><title>array_map</title></head>
<body>
  <h1 class="refname">array_map</h1>
  <p class="refpurpose">Applies the callback to the
     elements of the given arrays</p>
  <pre class="methodsynopsis">array_map(?callable $callback, array $array, array ...$arrays): array</pre>
  <p><strong>array_map()</strong> returns an array containing the results.</p>
</body></html>"#;

const DATETIME_HTML: &str = r#"<!DOCTYPE html>
<html><body>
  <h1>The DateTime class</h1>
  <p>Representation of date and time.</p>
  <pre>class DateTime implements DateTimeInterface</pre>
</body></html>"#;

const NSSTRING_HTML: &str = r#"<html><body>
  <h1>NSString</h1>
  <p>A static, plain-text Unicode string object.</p>
  <p>Log with <a href="NSLog.html">NSLog</a>, measure with <a href="NSString.html#length">length</a>,
     bridge to <a href="../Swift/String.html">String</a> or read <a href="https://example.com/strings">more</a>.</p>
  <h2 id="length">length</h2>
  <p>The number of UTF-16 code units in the receiver.</p>
</body></html>"#;

const NSLOG_HTML: &str = r#"<html><body><h1>NSLog</h1><p>Logs an error message to the Apple System Log facility.</p></body></html>"#;

const STRING_HTML: &str = r#"<html><body><h1>String</h1><p>A Unicode string value that is a collection of characters.</p></body></html>"#;

pub const UIKIT_JSON: &str = r#"{
    "metadata": {"title": "UIKit", "roleHeading": "Framework", "symbolKind": "module", "modules": [{"name": "UIKit"}]},
    "abstract": [{"type": "text", "text": "Construct and manage a graphical, event-driven user interface."}],
    "topicSections": [{"title": "Views", "identifiers": ["doc://com.apple.uikit/documentation/UIKit/UIView"]}],
    "references": {
        "doc://com.apple.uikit/documentation/UIKit/UIView": {"type": "topic", "title": "UIView", "url": "/documentation/uikit/uiview"}
    }
}"#;

pub const UIVIEW_JSON: &str = r#"{
    "metadata": {
        "title": "UIView", "roleHeading": "Class", "symbolKind": "class", "modules": [{"name": "UIKit"}],
        "platforms": [{"name": "iOS", "introducedAt": "2.0"}]
    },
    "abstract": [{"type": "text", "text": "An object that manages the content for a rectangular area on the screen."}],
    "primaryContentSections": [
        {"kind": "declarations", "declarations": [{"tokens": [
            {"kind": "attribute", "text": "@MainActor"}, {"kind": "text", "text": " "},
            {"kind": "keyword", "text": "class"}, {"kind": "text", "text": " "},
            {"kind": "identifier", "text": "UIView"}
        ]}]},
        {"kind": "content", "content": [
            {"type": "heading", "level": 2, "text": "Overview", "anchor": "overview"},
            {"type": "paragraph", "inlineContent": [{"type": "text", "text": "Views are the fundamental building blocks."}]}
        ]}
    ],
    "topicSections": [{"title": "Creating a View Object", "identifiers": ["doc://com.apple.uikit/documentation/UIKit/UIView/init(frame:)"]}],
    "relationshipsSections": [{"type": "inheritsFrom", "title": "Inherits From", "identifiers": ["doc://com.apple.uikit/documentation/UIKit/UIResponder"]}],
    "hierarchy": {"paths": [["doc://com.apple.uikit/documentation/UIKit"]]},
    "references": {
        "doc://com.apple.uikit/documentation/UIKit": {"type": "topic", "title": "UIKit", "url": "/documentation/uikit"},
        "doc://com.apple.uikit/documentation/UIKit/UIView/init(frame:)": {
            "type": "topic", "title": "init(frame:)", "url": "/documentation/uikit/uiview/init(frame:)",
            "abstract": [{"type": "text", "text": "Initializes and returns a newly allocated view object."}]
        },
        "doc://com.apple.uikit/documentation/UIKit/UIResponder": {"type": "topic", "title": "UIResponder", "url": "/documentation/uikit/uiresponder"}
    }
}"#;

pub const INIT_FRAME_JSON: &str = r#"{
    "metadata": {"title": "init(frame:)", "roleHeading": "Initializer", "symbolKind": "init", "modules": [{"name": "UIKit"}]},
    "abstract": [{"type": "text", "text": "Initializes and returns a newly allocated view object."}],
    "primaryContentSections": [
        {"kind": "declarations", "declarations": [{"tokens": [
            {"kind": "keyword", "text": "init"}, {"kind": "text", "text": "("},
            {"kind": "externalParam", "text": "frame"}, {"kind": "text", "text": ": "},
            {"kind": "typeIdentifier", "text": "CGRect"}, {"kind": "text", "text": ")"}
        ]}]},
        {"kind": "parameters", "parameters": [
            {"name": "frame", "content": [{"type": "paragraph", "inlineContent": [{"type": "text", "text": "The frame rectangle."}]}]}
        ]}
    ],
    "hierarchy": {"paths": [["doc://com.apple.uikit/documentation/UIKit", "doc://com.apple.uikit/documentation/UIKit/UIView"]]},
    "references": {
        "doc://com.apple.uikit/documentation/UIKit": {"type": "topic", "title": "UIKit", "url": "/documentation/uikit"},
        "doc://com.apple.uikit/documentation/UIKit/UIView": {"type": "topic", "title": "UIView", "url": "/documentation/uikit/uiview"}
    }
}"#;

pub const UIVIEW_OBJC_JSON: &str = r#"{
    "metadata": {"title": "UIView", "roleHeading": "Class", "symbolKind": "class", "modules": [{"name": "UIKit"}]},
    "abstract": [{"type": "text", "text": "An object that manages the content for a rectangular area on the screen."}],
    "primaryContentSections": [
        {"kind": "declarations", "declarations": [{"tokens": [{"kind": "text", "text": "@interface UIView : UIResponder"}]}]}
    ],
    "topicSections": [{"title": "Creating a View Object", "identifiers": ["doc://com.apple.uikit/documentation/UIKit/UIView/1622488-initWithFrame"]}],
    "references": {
        "doc://com.apple.uikit/documentation/UIKit/UIView/1622488-initWithFrame": {
            "type": "topic", "title": "initWithFrame:", "url": "/documentation/uikit/uiview/1622488-init"
        }
    }
}"#;

/// A writable connection to a fresh SQLite database at `path`.
pub async fn create_database(path: &Path) -> SqlitePool {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.expect("create database directory");
    }
    let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
    SqlitePool::connect_with(options).await.expect("create database")
}

/// Run each statement in order, then close the pool.
pub async fn execute_all(pool: SqlitePool, statements: &[&str]) {
    for statement in statements {
        sqlx::query(statement).execute(&pool).await.unwrap_or_else(|err| panic!("{statement}: {err}"));
    }
    pool.close().await;
}

async fn write_document(paths: &DocsetPaths, relative: &str, contents: &str) {
    let path = paths.documents.join(relative);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.expect("create document directory");
    }
    tokio::fs::write(path, contents).await.expect("write document");
}

/// Standard Dash docset with four entries: two with local pages, one whose
/// page is missing and one pointing at a remote URL.
pub async fn dash_docset(root: &Path) -> PathBuf {
    let docset = root.join(DASH_DOCSET);
    let paths = DocsetPaths::new(&docset);
    let pool = create_database(&paths.index).await;
    execute_all(pool, &[
        "CREATE TABLE searchIndex(id INTEGER PRIMARY KEY, name TEXT, type TEXT, path TEXT)",
        "CREATE UNIQUE INDEX anchor ON searchIndex (name, type, path)",
        "INSERT INTO searchIndex (id, name, type, path) VALUES
            (1, 'array_map', 'func', '<dash_entry_name=array_map><dash_entry_originalName=array_map>www.php.net/manual/en/function.array-map.html#refsect1-function.array-map-description'),
            (2, 'DateTime', 'cl', 'www.php.net/manual/en/class.datetime.html'),
            (3, 'strlen', 'Function', 'www.php.net/manual/en/function.strlen.html'),
            (4, 'array_filter', 'func', 'https://www.php.net/manual/en/function.array-filter.php')",
    ])
    .await;
    write_document(&paths, "www.php.net/manual/en/function.array-map.html", ARRAY_MAP_HTML).await;
    write_document(&paths, "www.php.net/manual/en/class.datetime.html", DATETIME_HTML).await;
    docset
}

/// CoreData docset with Objective-C and Swift tokens spread over three
/// cross-linked pages, plus one token without any metadata.
pub async fn coredata_docset(root: &Path) -> PathBuf {
    let docset = root.join(COREDATA_DOCSET);
    let paths = DocsetPaths::new(&docset);
    let pool = create_database(&paths.index).await;
    execute_all(pool, &[
        "CREATE TABLE ZTOKENTYPE (Z_PK INTEGER PRIMARY KEY, ZTYPENAME VARCHAR)",
        "CREATE TABLE ZAPILANGUAGE (Z_PK INTEGER PRIMARY KEY, ZFULLNAME VARCHAR)",
        "CREATE TABLE ZFILEPATH (Z_PK INTEGER PRIMARY KEY, ZPATH VARCHAR)",
        "CREATE TABLE ZTOKEN (Z_PK INTEGER PRIMARY KEY, ZTOKENNAME VARCHAR, ZTOKENTYPE INTEGER, ZLANGUAGE INTEGER)",
        "CREATE TABLE ZTOKENMETAINFORMATION (
            Z_PK INTEGER PRIMARY KEY, ZTOKEN INTEGER, ZFILE INTEGER, ZANCHOR VARCHAR,
            ZDECLARATION VARCHAR, ZABSTRACT VARCHAR, ZDEPRECATIONSUMMARY VARCHAR
        )",
        "INSERT INTO ZTOKENTYPE (Z_PK, ZTYPENAME) VALUES (1, 'cl'), (2, 'instm'), (3, 'func'), (4, 'Struct')",
        "INSERT INTO ZAPILANGUAGE (Z_PK, ZFULLNAME) VALUES (1, 'Objective-C'), (2, 'Swift')",
        "INSERT INTO ZFILEPATH (Z_PK, ZPATH) VALUES
            (1, 'Foundation/NSString.html'), (2, 'Foundation/NSLog.html'), (3, 'Swift/String.html')",
        "INSERT INTO ZTOKEN (Z_PK, ZTOKENNAME, ZTOKENTYPE, ZLANGUAGE) VALUES
            (1, 'NSString', 1, 1), (2, 'length', 2, 1), (3, 'NSLog', 3, 1), (4, 'String', 4, 2), (5, 'Orphan', 3, 1)",
        "INSERT INTO ZTOKENMETAINFORMATION (Z_PK, ZTOKEN, ZFILE, ZANCHOR, ZDECLARATION, ZABSTRACT, ZDEPRECATIONSUMMARY) VALUES
            (1, 1, 1, NULL, '<code>@interface NSString : NSObject</code>', '<p>A static, plain-text Unicode string object.</p>', NULL),
            (2, 2, 1, 'length', '<code>@property(readonly) NSUInteger length;</code>', '<p>The number of UTF-16 code units.</p>', NULL),
            (3, 3, 2, NULL, '<code>void NSLog(NSString *format, ...);</code>', '<p>Logs an error message.</p>', '<p>Use <code>os_log</code> instead.</p>'),
            (4, 4, 3, NULL, '<code>struct String</code>', '<p>A Unicode string value.</p>', '')",
    ])
    .await;
    write_document(&paths, "Foundation/NSString.html", NSSTRING_HTML).await;
    write_document(&paths, "Foundation/NSLog.html", NSLOG_HTML).await;
    write_document(&paths, "Swift/String.html", STRING_HTML).await;
    docset
}

/// Apple API bundle.
///
/// - `ls/documentation/uikit`, `…/uiview` and `…/uiview/init(frame:)` live in
///   Brotli blob 1
/// - `lc/documentation/uikit/uiview` lives in gzip blob 2
/// - `ls/documentation/foundation/date` is indexed but has no cache entry
/// - one non-API row is not part of the bundle's entries at all
pub async fn apple_docset(root: &Path) -> PathBuf {
    let docset = root.join(APPLE_DOCSET);
    let paths = DocsetPaths::new(&docset);
    let pool = create_database(&paths.index).await;
    execute_all(pool, &[
        "CREATE TABLE searchIndex(id INTEGER PRIMARY KEY, name TEXT, type TEXT, path TEXT)",
        "INSERT INTO searchIndex (id, name, type, path) VALUES
            (1, 'UIKit', 'Framework', 'dash-apple-api://load?request_key=ls/documentation/uikit&language=swift'),
            (2, 'UIView', 'Class', 'dash-apple-api://load?request_key=ls/documentation/uikit/uiview&language=swift'),
            (3, 'init(frame:)', 'Method', '<dash_entry_language=swift>dash-apple-api://load?request_key=ls/documentation/uikit/uiview/init(frame:)'),
            (4, 'UIView', 'cl', 'dash-apple-api://load?request_key=lc/documentation/uikit/uiview&language=objc'),
            (5, 'Date', 'Struct', 'dash-apple-api://load?request_key=ls/documentation/foundation/date'),
            (6, 'Human Interface Guidelines', 'Guide', 'https://developer.apple.com/design/human-interface-guidelines')",
    ])
    .await;

    let blobs: [(i64, Compression, &[(&str, &str)]); 2] = [
        (1, Compression::Brotli, &[
            ("ls/documentation/uikit", UIKIT_JSON),
            ("ls/documentation/uikit/uiview", UIVIEW_JSON),
            ("ls/documentation/uikit/uiview/init(frame:)", INIT_FRAME_JSON),
        ]),
        (2, Compression::Gzip, &[("lc/documentation/uikit/uiview", UIVIEW_OBJC_JSON)]),
    ];
    let cache_db = paths.documents.join("cache.db");
    execute_all(create_database(&cache_db).await, &[
        r#"CREATE TABLE refs (uuid TEXT PRIMARY KEY, data_id INTEGER NOT NULL, "offset" INTEGER NOT NULL, "length" INTEGER NOT NULL)"#,
        "CREATE TABLE metadata (key TEXT PRIMARY KEY, value TEXT)",
    ])
    .await;
    let cache = create_database(&cache_db).await;
    let blob_dir = paths.documents.join("fs");
    tokio::fs::create_dir_all(&blob_dir).await.expect("create blob directory");
    for (data_id, compression, pages) in blobs {
        let mut blob = Vec::new();
        for (key, json) in pages {
            let key: RequestKey = key.parse().expect("valid request key");
            sqlx::query(r#"INSERT INTO refs (uuid, data_id, "offset", "length") VALUES (?, ?, ?, ?)"#)
                .bind(key.cache_uuid())
                .bind(data_id)
                .bind(blob.len() as i64)
                .bind(json.len() as i64)
                .execute(&cache)
                .await
                .expect("insert cache reference");
            blob.extend_from_slice(json.as_bytes());
        }
        let compressed = compression.compress(&blob).expect("compress blob");
        tokio::fs::write(blob_dir.join(data_id.to_string()), compressed).await.expect("write blob");
    }
    cache.close().await;
    docset
}
