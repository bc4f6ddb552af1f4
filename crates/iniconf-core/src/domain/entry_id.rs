//! Composite entry identifiers.
//!
//! The store is a flat map, so a `(section, key)` pair is folded into a single
//! string by joining both parts with [`ENTRY_SEPARATOR`].  The separator is
//! not escaped: a section or key that itself contains `#/#` will split at the
//! wrong place when the entry is rendered.  In practice the INI reader can
//! never produce such a key, because `#` starts a comment.

/// Reserved sequence joining the section and key parts of an identifier.
pub const ENTRY_SEPARATOR: &str = "#/#";

/// Builds the store identifier for `section` / `key`.
///
/// # Examples
///
/// ```rust
/// use iniconf_core::entry_id;
///
/// assert_eq!(entry_id("network", "port"), "network#/#port");
/// ```
pub fn entry_id(section: &str, key: &str) -> String {
    let mut id = String::with_capacity(section.len() + ENTRY_SEPARATOR.len() + key.len());
    id.push_str(section);
    id.push_str(ENTRY_SEPARATOR);
    id.push_str(key);
    id
}

/// Splits an identifier back into `(section, key)` at the first separator.
///
/// Returns `None` when the identifier does not contain the separator.
pub fn split_entry_id(id: &str) -> Option<(&str, &str)> {
    id.split_once(ENTRY_SEPARATOR)
}
