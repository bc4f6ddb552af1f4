//! Line-level INI grammar: comment stripping, trimming and classification.

use crate::domain::numeric::is_c_space;

/// One line of an INI file after comment stripping and trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IniLine<'a> {
    Blank,
    /// A well-formed `[name]` header.  The name is trimmed and may be empty.
    Section(&'a str),
    /// A line starting with `[` that is not closed by `]`, or `[]`.
    InvalidSection,
    Pair { key: &'a str, value: &'a str },
    /// A pair whose key is empty, such as `= value`.
    MissingKey,
}

/// Cuts the line at the first `#` or `;`.
///
/// A backslash directly before the comment character is cut as well; it does
/// not escape the comment character into the value.
pub(crate) fn strip_comment(line: &str) -> &str {
    let Some(i) = line.find(['#', ';']) else {
        return line;
    };
    if line[..i].ends_with('\\') {
        &line[..i - 1]
    } else {
        &line[..i]
    }
}

pub(crate) fn trim(text: &str) -> &str {
    text.trim_matches(is_c_space)
}

/// Classifies a line that has already been stripped and trimmed.
pub(crate) fn classify(line: &str) -> IniLine<'_> {
    if line.is_empty() {
        return IniLine::Blank;
    }
    if line.starts_with('[') {
        return if line.len() > 2 && line.ends_with(']') {
            IniLine::Section(trim(&line[1..line.len() - 1]))
        } else {
            IniLine::InvalidSection
        };
    }

    let (left, right) = line.split_once('=').unwrap_or((line, ""));
    let key = left.trim_end_matches(is_c_space);
    if key.is_empty() {
        return IniLine::MissingKey;
    }
    IniLine::Pair {
        key,
        value: right.trim_start_matches(is_c_space),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> IniLine<'_> {
        classify(trim(strip_comment(raw)))
    }

    // ── Comments ──────────────────────────────────────────────────────────────

    #[test]
    fn test_strip_comment_hash_and_semicolon() {
        assert_eq!(strip_comment("k=v # note"), "k=v ");
        assert_eq!(strip_comment("k=v ; note"), "k=v ");
        assert_eq!(strip_comment("# whole line"), "");
        assert_eq!(strip_comment("k=v"), "k=v");
    }

    #[test]
    fn test_strip_comment_uses_first_comment_character() {
        assert_eq!(strip_comment("a;b#c"), "a");
    }

    #[test]
    fn test_escaped_comment_drops_backslash_too() {
        assert_eq!(strip_comment("k=a\\#b"), "k=a");
        assert_eq!(strip_comment("k=a\\;b"), "k=a");
        assert_eq!(strip_comment("\\#x"), "");
    }

    // ── Trimming ──────────────────────────────────────────────────────────────

    #[test]
    fn test_trim_removes_c_whitespace() {
        assert_eq!(trim(" \t\x0B\x0C k=v \r"), "k=v");
    }

    // ── Classification ────────────────────────────────────────────────────────

    #[test]
    fn test_blank_and_comment_only_lines() {
        assert_eq!(parse(""), IniLine::Blank);
        assert_eq!(parse("   "), IniLine::Blank);
        assert_eq!(parse("; comment"), IniLine::Blank);
    }

    #[test]
    fn test_section_header_is_trimmed() {
        assert_eq!(parse("[network]"), IniLine::Section("network"));
        assert_eq!(parse("  [ network ]  # main"), IniLine::Section("network"));
    }

    #[test]
    fn test_blank_section_name_is_an_empty_section() {
        assert_eq!(parse("[ ]"), IniLine::Section(""));
    }

    #[test]
    fn test_unclosed_or_empty_header_is_invalid() {
        assert_eq!(parse("[network"), IniLine::InvalidSection);
        assert_eq!(parse("[]"), IniLine::InvalidSection);
        assert_eq!(parse("["), IniLine::InvalidSection);
    }

    #[test]
    fn test_pair_with_surrounding_whitespace_and_comment() {
        assert_eq!(parse("  k = v  # comment"), IniLine::Pair { key: "k", value: "v" });
    }

    #[test]
    fn test_pair_splits_at_first_equals() {
        assert_eq!(parse("url=a=b"), IniLine::Pair { key: "url", value: "a=b" });
    }

    #[test]
    fn test_key_only_lines_have_empty_value() {
        assert_eq!(parse("flag"), IniLine::Pair { key: "flag", value: "" });
        assert_eq!(parse("flag ="), IniLine::Pair { key: "flag", value: "" });
    }

    #[test]
    fn test_empty_key_is_missing_key() {
        assert_eq!(parse("= value"), IniLine::MissingKey);
    }

    #[test]
    fn test_inner_whitespace_is_kept() {
        assert_eq!(
            parse("greeting = hello  world"),
            IniLine::Pair { key: "greeting", value: "hello  world" }
        );
    }
}
