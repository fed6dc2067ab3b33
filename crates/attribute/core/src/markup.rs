//! Display markup removal for lore lines.
//!
//! Lore arrives with inline formatting codes: a section sign followed by one
//! code character (`§c`, `§l`, `§x` …). Templates are written against the
//! visible text, so codes are stripped before extraction.

use once_cell::sync::Lazy;
use regex::Regex;

static FORMAT_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)§[0-9a-fk-orx]").expect("format code regex is valid"));

/// Removes every formatting code from `line`.
pub fn strip_markup(line: &str) -> String {
    FORMAT_CODE.replace_all(line, "").into_owned()
}
