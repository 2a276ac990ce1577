//! Text normalization for join and group keys.
//!
//! The same normalization is applied to incident neighborhood names and to
//! boundary names, so the join between the two datasets ignores accents,
//! case, and whitespace differences.

use unicode_normalization::UnicodeNormalization;

/// Normalizes free text into a join key.
///
/// The pipeline:
/// 1. Compatibility decomposition (NFKD), splitting accents off letters
/// 2. Drop every non-ASCII code point
/// 3. Uppercase
/// 4. Collapse whitespace runs to one space and trim
#[must_use]
pub fn normalize_text(value: &str) -> String {
    let ascii: String = value.nfkd().filter(char::is_ascii).collect();
    let upper = ascii.to_ascii_uppercase();
    upper.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes a JSON attribute value.
///
/// Only strings carry a name; numbers, booleans, null, arrays, and objects
/// all normalize to the empty string.
#[must_use]
pub fn normalize_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => normalize_text(s),
        _ => String::new(),
    }
}
