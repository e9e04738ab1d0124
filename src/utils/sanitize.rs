//! Filesystem-safe name sanitization.
//!
//! The same rule is used for collection directory names, generated file
//! names and filter-mask keys, so a mask written against display names still
//! lines up with the directories the engine creates.

/// Characters rejected by at least one common filesystem.
pub const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replacement for names that sanitize down to nothing.
pub const EMPTY_NAME: &str = "Untitled";

const RESERVED_DEVICE_NAMES: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Map an arbitrary name to a filesystem-safe one.
///
/// Illegal and control characters become `_`, leading whitespace and trailing
/// whitespace or dots are trimmed, and Windows device names get `_`
/// appended to their stem. The result never contains any of [`ILLEGAL_CHARS`] and
/// `sanitize(&sanitize(x)) == sanitize(x)` for every input.
pub fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) || c.is_control() { '_' } else { c })
        .collect();

    let trimmed =
        replaced.trim_start().trim_end_matches(|c: char| c.is_whitespace() || c == '.');
    if trimmed.is_empty() {
        return EMPTY_NAME.to_string();
    }

    let (stem, rest) = match trimmed.find('.') {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };
    if RESERVED_DEVICE_NAMES.contains(&stem.to_ascii_lowercase().as_str()) {
        return format!("{stem}_{rest}");
    }

    trimmed.to_string()
}

/// Truncate to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &value[..byte_idx],
        None => value,
    }
}
