//! text.rs - The sanitation contract for engine-returned values.
//!
//! Every string that leaves the engine (names from metadata catalogs, rows from
//! the reference table, ledger rows) is passed through here before it reaches
//! any other component. ASCII control characters (U+0000..U+001F and U+007F)
//! are removed. Byte sequences that do not decode to a Unicode scalar value,
//! which includes surrogate code points encoded as CESU-8/WTF-8, are dropped.
//! Everything else, multi-byte text included, passes through unchanged.
//!
//! License: MIT OR APACHE 2.0

use rusqlite::types::ValueRef;
use rusqlite::Row;

fn is_stripped(c: char) -> bool {
    let code = c as u32;
    code < 0x20 || code == 0x7F
}

fn push_sanitized(out: &mut String, valid: &str) {
    out.extend(valid.chars().filter(|c| !is_stripped(*c)));
}

/// Strips control characters from an already-decoded string.
///
/// ```
/// use sensiscan_core::sanitizers::text::sanitize_str;
///
/// assert_eq!(sanitize_str("abc\x00\x1Fdef"), "abcdef");
/// assert_eq!(sanitize_str("Straße\u{7F}"), "Straße");
/// ```
pub fn sanitize_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    push_sanitized(&mut out, value);
    out
}

/// Decodes raw bytes, dropping every sequence that is not a valid scalar value,
/// then strips control characters.
pub fn sanitize_bytes(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                push_sanitized(&mut out, valid);
                break;
            }
            Err(err) => {
                let (valid, rest) = bytes.split_at(err.valid_up_to());
                push_sanitized(&mut out, std::str::from_utf8(valid).unwrap_or_default());
                match err.error_len() {
                    Some(skip) => bytes = &rest[skip..],
                    // Truncated sequence at the end of input.
                    None => break,
                }
            }
        }
    }
    out
}

/// Converts any SQLite value to sanitized text. `NULL` maps to `None`.
pub fn sanitize_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Some(sanitize_bytes(bytes)),
    }
}

/// Reads column `idx` of `row` through the sanitation contract.
pub fn sanitized_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    row.get_ref(idx).map(sanitize_value)
}
