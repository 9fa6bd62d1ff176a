//! Cleanup of characters the bulk loader cannot digest
//!
//! Control characters (newlines, carriage returns, and friends) corrupt the
//! CSV import, so they are substituted with a fixed placeholder glyph. The
//! loader also treats whitespace embedded in identifiers unpredictably, so
//! identifier cleanup removes spaces and tabs outright.

/// Substitute for characters that cannot appear in output cells
pub const PLACEHOLDER: char = '\u{b7}'; // '·'

/// Clean a free-text cell: control characters become [`PLACEHOLDER`],
/// except tab which becomes a single space.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c == '\t' {
                ' '
            } else if c.is_ascii_control() {
                PLACEHOLDER
            } else {
                c
            }
        })
        .collect()
}

/// Clean an identifier cell: spaces and tabs are removed entirely, other
/// control characters become [`PLACEHOLDER`].
pub fn clean_id(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            ' ' | '\t' => None,
            c if c.is_ascii_control() => Some(PLACEHOLDER),
            c => Some(c),
        })
        .collect()
}
