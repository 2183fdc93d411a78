//! Type-code normalization.
//!
//! Docsets store entry types either as short legacy codes (`func`, `clm`,
//! `tdef`) or as canonical names (`Function`, `Method`, `Type`). This module
//! maps between the two in both directions:
//!
//! - [`normalize`] turns any code into its canonical name,
//! - [`denormalize_all`] lists every code that means a canonical name, so that
//!   a single query can match both legacy and modern rows,
//! - [`denormalize_one`] picks the one code most commonly stored in source
//!   databases.
//!
//! All functions are total: unknown input passes through unchanged.

/// Canonical names and the legacy codes that map onto them.
///
/// The first code in each list is the form most commonly found in source
/// databases; [`denormalize_one`] relies on that ordering.
const KINDS: &[(&str, &[&str])] = &[
    ("Attribute", &["attr"]),
    ("Binding", &["binding"]),
    ("Callback", &["callback"]),
    ("Category", &["cat"]),
    ("Class", &["cl", "clas", "specialization"]),
    ("Command", &["cmd"]),
    ("Component", &["component"]),
    ("Constant", &["clconst", "econst", "data", "const"]),
    ("Constructor", &["constructor", "init"]),
    ("Define", &["define"]),
    ("Delegate", &["delegate"]),
    ("Directive", &["directive"]),
    ("Element", &["element"]),
    ("Entry", &["entry"]),
    ("Enum", &["enum", "enumeration"]),
    ("Event", &["event"]),
    ("Exception", &["exception"]),
    ("Extension", &["ext", "extension"]),
    ("Field", &["ivar", "field"]),
    ("Filter", &["filter"]),
    ("Framework", &["framework", "module"]),
    ("Function", &["func", "ffunc", "fn"]),
    ("Global", &["global", "gvar"]),
    ("Guide", &["guide", "doc"]),
    ("Interface", &["interface"]),
    ("Keyword", &["keyword"]),
    ("Library", &["lib", "library"]),
    ("Macro", &["macro"]),
    ("Method", &["clm", "instm", "intfm", "intfcm", "method"]),
    ("Mixin", &["mixin"]),
    ("Namespace", &["ns", "namespace"]),
    ("Operator", &["op", "opfunc"]),
    ("Option", &["option"]),
    ("Package", &["pkg", "package"]),
    ("Parameter", &["param", "parameter"]),
    ("Property", &["instp", "intfp", "clp", "property"]),
    ("Protocol", &["intf", "protocol"]),
    ("Record", &["record"]),
    ("Sample", &["samplecode", "sample"]),
    ("Section", &["section"]),
    ("Service", &["service"]),
    ("Struct", &["struct", "structure"]),
    ("Style", &["style"]),
    ("Subroutine", &["subroutine"]),
    ("Tag", &["tag"]),
    ("Trait", &["trait"]),
    ("Type", &["tdef", "typedef", "type", "alias"]),
    ("Union", &["union"]),
    ("Value", &["value"]),
    ("Variable", &["var", "variable", "instance variable"]),
];

fn find_by_code(code: &str) -> Option<&'static str> {
    KINDS
        .iter()
        .find(|(canonical, codes)| {
            canonical.eq_ignore_ascii_case(code) || codes.iter().any(|c| c.eq_ignore_ascii_case(code))
        })
        .map(|(canonical, _)| *canonical)
}

fn find_by_name(name: &str) -> Option<&'static (&'static str, &'static [&'static str])> {
    KINDS.iter().find(|(canonical, _)| canonical.eq_ignore_ascii_case(name))
}

/// Maps a raw or canonical type code to its canonical name.
///
/// Lookup is case-insensitive; unknown codes are returned unchanged
/// (case preserved).
///
/// ```
/// use docset_model::kind::normalize;
/// assert_eq!(normalize("func"), "Function");
/// assert_eq!(normalize("CLM"), "Method");
/// assert_eq!(normalize("Class"), "Class");
/// assert_eq!(normalize("Wibble"), "Wibble");
/// ```
pub fn normalize(code: impl AsRef<str>) -> String {
    let code = code.as_ref().trim();
    find_by_code(code).map_or_else(|| code.to_string(), str::to_string)
}

/// Every raw code that maps to `name`, canonical form first.
///
/// Unknown names yield a single-element list holding the input.
///
/// ```
/// use docset_model::kind::denormalize_all;
/// assert_eq!(denormalize_all("Function"), ["Function", "func", "ffunc", "fn"]);
/// assert_eq!(denormalize_all("Wibble"), ["Wibble"]);
/// ```
pub fn denormalize_all(name: impl AsRef<str>) -> Vec<String> {
    let name = name.as_ref().trim();
    match find_by_name(name) {
        Some((canonical, codes)) => std::iter::once(*canonical).chain(codes.iter().copied()).map(str::to_string).collect(),
        None => vec![name.to_string()],
    }
}

/// A single representative raw code for `name`.
///
/// Deliberately the *second* entry of [`denormalize_all`]: the first is the
/// canonical name itself, the second the legacy form most source databases
/// actually store. Falls back to the canonical name when no legacy code exists.
pub fn denormalize_one(name: impl AsRef<str>) -> String {
    let mut all = denormalize_all(name);
    if all.len() > 1 { all.swap_remove(1) } else { all.swap_remove(0) }
}

/// Every canonical name known to the normalizer.
pub fn canonical_names() -> impl Iterator<Item = &'static str> {
    KINDS.iter().map(|(canonical, _)| *canonical)
}
