/// Characters that are not allowed in an output path segment.
const FORBIDDEN: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
/// Maximum length of a sanitized segment, in characters.
pub const MAX_SEGMENT_LENGTH: usize = 100;
/// Substituted when nothing survives sanitization.
pub const FALLBACK_NAME: &str = "unnamed";

/// Produces a filesystem-safe, lower-cased path segment from an entry name.
///
/// Method signatures are reduced to their argument labels, so
/// `perform(_:with:afterDelay:)` becomes `perform_with_afterdelay`. The output
/// is never empty, never longer than [`MAX_SEGMENT_LENGTH`] characters, free
/// of `< > : " / \ | ? *`, and sanitizing it again is a no-op.
///
/// Distinct names can reduce to the same segment (`a<b` and `a>b`); callers
/// writing files accept that the last writer wins.
///
/// ```
/// use docset_model::sanitize;
/// assert_eq!(sanitize("init(frame:)"), "init_frame");
/// assert_eq!(sanitize("perform(_:with:afterDelay:)"), "perform_with_afterdelay");
/// assert_eq!(sanitize("array<int|string>"), "array_int_string");
/// assert_eq!(sanitize("???"), "unnamed");
/// ```
pub fn sanitize(name: impl AsRef<str>) -> String {
    let name = strip_signature(name.as_ref());
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.chars() {
        // Forbidden characters, whitespace runs and underscore runs all
        // collapse into a single separator.
        if FORBIDDEN.contains(&c) || c.is_whitespace() || c.is_control() || c == '_' {
            pending_separator = true;
            continue;
        }
        if pending_separator && !out.is_empty() {
            out.push('_');
        }
        pending_separator = false;
        out.extend(c.to_lowercase());
    }
    // Truncation can expose a separator at the end; trim it again so that a
    // second pass leaves the segment untouched.
    let truncated: String = out.chars().take(MAX_SEGMENT_LENGTH).collect();
    let trimmed = truncated.trim_end_matches('_');
    match trimmed.is_empty() {
        true => FALLBACK_NAME.to_string(),
        false => trimmed.to_string(),
    }
}

/// Reduces `head(label: Type, _ other: Type)` to `head_label_other`.
///
/// Each `:`-separated piece of the parameter list contributes its last
/// whitespace-delimited token; empty and `_` placeholder labels are dropped.
fn strip_signature(name: &str) -> std::borrow::Cow<'_, str> {
    let Some((head, params)) = name.split_once('(') else {
        return name.into();
    };
    let params: String = params.chars().filter(|c| !matches!(c, '(' | ')')).collect();
    let labels: Vec<&str> = params
        .split(':')
        .filter_map(|piece| piece.split_whitespace().last())
        .filter(|label| !label.is_empty() && *label != "_")
        .collect();
    match labels.is_empty() {
        true => head.into(),
        false => format!("{head}_{}", labels.join("_")).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("init(frame:)", "init_frame")]
    #[case("perform(_:with:afterDelay:)", "perform_with_afterdelay")]
    #[case("array<int|string>", "array_int_string")]
    #[case("array_map", "array_map")]
    #[case("DateTime", "datetime")]
    #[case("viewDidLoad()", "viewdidload")]
    #[case("init(_:)", "init")]
    #[case(
        "tableView(_ tableView: UITableView, numberOfRowsInSection section: Int)",
        "tableview_tableview_section_int"
    )]
    #[case("Foo::Bar::baz", "foo_bar_baz")]
    #[case("  leading and trailing  ", "leading_and_trailing")]
    #[case("__private__name__", "private_name")]
    #[case("a/b\\c", "a_b_c")]
    #[case("", "unnamed")]
    #[case("   ", "unnamed")]
    #[case("<>:\"/\\|?*", "unnamed")]
    #[case("(_:)", "unnamed")]
    #[case("ÜBER straße", "über_straße")]
    fn test_sanitize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_truncates_to_max_length() {
        let long = "a".repeat(250);
        let out = sanitize(&long);
        assert_eq!(out.chars().count(), MAX_SEGMENT_LENGTH);
    }

    #[test]
    fn test_truncation_never_leaves_trailing_separator() {
        // The 100th character lands on a separator.
        let name = format!("{} tail", "a".repeat(MAX_SEGMENT_LENGTH - 1));
        let out = sanitize(&name);
        assert!(!out.ends_with('_'));
        assert_eq!(sanitize(&out), out);
    }

    #[rstest]
    #[case("init(frame:)")]
    #[case("perform(_:with:afterDelay:)")]
    #[case("a)b(c:d)")]
    #[case("Name With Spaces <T>")]
    #[case("İstanbul")]
    #[case("___")]
    fn test_idempotent(#[case] input: &str) {
        let once = sanitize(input);
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_invariants_over_ascii_corpus() {
        let alphabet: Vec<char> = (0x20u8..0x7f).map(char::from).collect();
        // Deterministic pseudo-random names built from printable ASCII.
        let mut state: u32 = 0x1234_5678;
        for _ in 0..2_000 {
            let len = (state % 140) as usize;
            let name: String = (0..len)
                .map(|_| {
                    state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                    alphabet[(state >> 16) as usize % alphabet.len()]
                })
                .collect();
            state = state.wrapping_add(7);
            let out = sanitize(&name);
            assert!(!out.is_empty());
            assert!(out.chars().count() <= MAX_SEGMENT_LENGTH);
            assert!(!out.contains(&FORBIDDEN[..]), "{name:?} -> {out:?}");
            assert_eq!(sanitize(&out), out, "not idempotent for {name:?}");
        }
    }
}
