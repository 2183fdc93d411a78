use docset_convert::error::ErrorKind;
use docset_convert::search::{DATABASE, SearchBinary};
use docset_convert::{
    AnyConverter, ConversionOptions, ConverterKind, ConverterStrategy, StandardConverter, convert_docset,
};
use docset_format::mock::{MockFormat, fixtures};
use docset_format::{FormatHandler, FormatOptions};
use docset_model::{EntryFilters, NormalizedEntry, ParsedContent};
use std::path::Path;

fn page(name: &str, kind: &str, summary: &str) -> ParsedContent {
    let mut content = ParsedContent::new(name, kind);
    content.summary = Some(summary.to_string());
    content
}

fn php_mock() -> MockFormat {
    MockFormat::default()
        .with_entry(
            NormalizedEntry::new(1, "array_map", "func", "function.array-map.html"),
            page("array_map", "Function", "Applies the callback to the elements of the given arrays"),
        )
        .with_absent_entry(NormalizedEntry::new(2, "strlen", "func", "function.strlen.html"))
        .with_entry(
            NormalizedEntry::new(3, "DateTime", "cl", "class.datetime.html"),
            page("DateTime", "Class", "Representation of date and time."),
        )
}

async fn read(path: impl AsRef<Path>) -> String {
    tokio::fs::read_to_string(path).await.unwrap()
}

#[tokio::test]
async fn test_absent_content_is_skipped_not_failed() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output");
    let options = ConversionOptions::new(&output);
    let mut converter = AnyConverter::new(php_mock());
    assert_eq!(converter.kind(), ConverterKind::Standard);

    let mut seen = Vec::new();
    let mut progress = |current: u64, total: u64, entry: &NormalizedEntry| {
        seen.push((current, total, entry.name.clone()));
    };
    let result = converter.convert(&options, Some(&mut progress)).await.unwrap();

    assert_eq!(result.processed, 3);
    assert_eq!(result.successful, 2);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.failed, 0);
    assert_eq!(seen, [
        (1, 3, "array_map".to_string()),
        (2, 3, "strlen".to_string()),
        (3, 3, "DateTime".to_string()),
    ]);

    let array_map = read(output.join("function/array_map.md")).await;
    assert!(array_map.starts_with("# array_map\n"));
    assert!(array_map.contains("Applies the callback"));
    assert!(read(output.join("class/datetime.md")).await.contains("*Class*"));
    assert!(!output.join("function/strlen.md").exists());

    // Two entry pages, the root index and two type indexes.
    assert_eq!(result.stats.files_written, 5);
    assert_eq!(result.index_entries, Some(2));
    assert!(output.join(DATABASE).exists());
    assert_eq!(result.search_binary_built(), None);
}

#[tokio::test]
async fn test_failed_extraction_continues() {
    let dir = tempfile::tempdir().unwrap();
    let format = php_mock().with_failing_entry(NormalizedEntry::new(4, "broken", "func", "broken.html"));
    let mut converter = StandardConverter::new(format);
    let result = converter.convert(&ConversionOptions::new(dir.path()), None).await.unwrap();
    assert_eq!((result.processed, result.successful, result.skipped, result.failed), (4, 2, 1, 1));
}

#[tokio::test]
async fn test_stream_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut converter = StandardConverter::new(php_mock().uninitialized());
    let err = converter.convert(&ConversionOptions::new(dir.path()), None).await.unwrap_err();
    assert!(matches!(&*err, ErrorKind::Format));
}

#[tokio::test]
async fn test_rerun_starts_from_scratch() {
    let dir = tempfile::tempdir().unwrap();
    let options = ConversionOptions::new(dir.path());
    let mut converter = StandardConverter::new(php_mock());
    let first = converter.convert(&options, None).await.unwrap();
    let second = converter.convert(&options, None).await.unwrap();
    assert_eq!(first.successful, second.successful);
    assert_eq!(second.index_entries, Some(2));

    let root = read(dir.path().join("index.md")).await;
    assert!(root.contains("2 entries in 2 types."), "{root}");
    let functions = read(dir.path().join("function/_index.md")).await;
    assert_eq!(functions.matches("array_map").count(), 1, "{functions}");
}

#[tokio::test]
async fn test_filters_and_disabled_index() {
    let dir = tempfile::tempdir().unwrap();
    let options = ConversionOptions::new(dir.path())
        .with_filters(EntryFilters::new().with_types(["Class"]))
        .with_generate_index(false)
        .with_search(SearchBinary::new("sh", ["-c", "true"]));
    let mut converter = StandardConverter::new(php_mock());
    let result = converter.convert(&options, None).await.unwrap();
    assert_eq!(result.processed, 1);
    assert_eq!(result.stats.files_written, 1);
    assert_eq!(result.index_entries, None);
    assert_eq!(result.search_binary, None);
    assert!(!dir.path().join("index.md").exists());
    assert!(!dir.path().join(DATABASE).exists());
}

#[tokio::test]
async fn test_convert_dash_docset() {
    let dir = tempfile::tempdir().unwrap();
    let docset = fixtures::dash_docset(dir.path()).await;
    let output = dir.path().join("php");
    let result = convert_docset(&docset, &ConversionOptions::new(&output), &FormatOptions::default(), None)
        .await
        .unwrap();

    // strlen has no page and array_filter is remote.
    assert_eq!((result.processed, result.successful, result.skipped, result.failed), (4, 2, 2, 0));
    let array_map = read(output.join("function/array_map.md")).await;
    assert!(array_map.contains("array_map(?callable $callback"), "{array_map}");
    assert!(output.join("class/datetime.md").exists());
    let root = read(output.join("index.md")).await;
    assert!(root.contains("(class/_index.md) (1)"), "{root}");
    assert!(root.contains("(function/_index.md) (1)"), "{root}");
}

#[tokio::test]
async fn test_convert_coredata_docset() {
    let dir = tempfile::tempdir().unwrap();
    let docset = fixtures::coredata_docset(dir.path()).await;
    let handler = FormatHandler::open(&docset, &FormatOptions::default()).await.unwrap();
    let mut converter = AnyConverter::new(handler);
    assert_eq!(converter.kind(), ConverterKind::CoreData);

    let output = dir.path().join("foundation");
    let result = converter.convert(&ConversionOptions::new(&output), None).await;
    converter.close().await;
    let result = result.unwrap();

    // Orphan has no metadata and no page.
    assert_eq!((result.processed, result.successful, result.skipped, result.failed), (5, 4, 1, 0));
    let nsstring = read(output.join("class/nsstring.md")).await;
    assert!(nsstring.contains("](../function/nslog.md)"), "{nsstring}");
    assert!(nsstring.contains("](../method/length.md)"), "{nsstring}");
    assert!(output.join("struct/string.md").exists());
    assert!(read(output.join("function/nslog.md")).await.contains("Deprecated"));
}

#[tokio::test]
async fn test_convert_apple_docset() {
    let dir = tempfile::tempdir().unwrap();
    let docset = fixtures::apple_docset(dir.path()).await;
    let output = dir.path().join("apple");
    let format_options = FormatOptions { preload_blobs: true };
    let result = convert_docset(&docset, &ConversionOptions::new(&output), &format_options, None).await.unwrap();

    // Date has no cache entry.
    assert_eq!((result.processed, result.successful, result.skipped, result.failed), (5, 4, 1, 0));
    for page in ["swift/uikit/uikit.md", "swift/uikit/uiview/init_frame.md", "objc/uikit/uiview.md"] {
        assert!(output.join(page).exists(), "missing {page}");
    }
    let uiview = read(output.join("swift/uikit/uiview.md")).await;
    assert!(uiview.contains("[init(frame:)](uiview/init_frame.md)"), "{uiview}");

    let root = read(output.join("index.md")).await;
    assert!(root.contains("## objc"), "{root}");
    assert!(root.contains("(swift/uikit/_index.md) (3)"), "{root}");
    let uikit = read(output.join("swift/uikit/_index.md")).await;
    assert!(uikit.contains("[Up: Documentation](../../index.md)"), "{uikit}");
    assert!(uikit.contains("(uiview/init_frame.md)"), "{uikit}");
}

#[cfg(unix)]
#[tokio::test]
async fn test_search_binary_is_built_from_database() {
    let dir = tempfile::tempdir().unwrap();
    let options =
        ConversionOptions::new(dir.path()).with_search(SearchBinary::new("sh", ["-c", r#"cp "$0" "$1""#, "{database}", "{output}"]));
    let mut converter = StandardConverter::new(php_mock());
    let result = converter.convert(&options, None).await.unwrap();
    assert_eq!(result.search_binary_built(), Some(true));
    assert!(dir.path().join("search").exists());
}

#[tokio::test]
async fn test_missing_search_tool_is_recoverable() {
    let dir = tempfile::tempdir().unwrap();
    let options = ConversionOptions::new(dir.path()).with_search(SearchBinary::new("docset-md-no-such-search-tool", ["{output}"]));
    let mut converter = StandardConverter::new(php_mock());
    let result = converter.convert(&options, None).await.unwrap();
    assert_eq!(result.successful, 2);
    assert_eq!(result.search_binary_built(), Some(false));
}
