//! Record normalization
//!
//! Total functions turning raw cell values into clean keys, escaped literals,
//! integers and split lists. Malformed input degrades to an empty string, an
//! empty list or zero; nothing here returns an error.
//!
//! The `clean_*` functions produce the values stored in statements. The
//! `sanitize_*` functions add quote escaping on top and are only needed when a
//! statement is rendered with inline literals.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Cell value the source sheets use for "no value".
pub const MISSING_SENTINEL: &str = "无";

/// Delimiters of multi-valued cells: full/half-width semicolon and comma, and
/// the ideographic enumeration comma.
pub const LIST_DELIMITERS: [char; 5] = ['；', ';', '，', ',', '、'];

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit-run pattern is valid"));

/// Trimmed value, or empty for a missing or sentinel cell.
pub fn clean_scalar(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        None => String::new(),
        Some(MISSING_SENTINEL) => String::new(),
        Some(s) => s.to_string(),
    }
}

/// `clean_scalar` with embedded single quotes doubled.
pub fn sanitize_scalar(raw: Option<&str>) -> String {
    escape_single_quotes(&clean_scalar(raw))
}

/// NFKC-normalize and drop C0/C1 control characters (tab, LF and CR survive).
pub fn clean_text(s: &str) -> String {
    s.nfkc().filter(|c| !is_stripped_control(*c)).collect()
}

/// Free-text variant of [`sanitize_scalar`]: sanitize, NFKC-normalize,
/// backslash-escape quotes and strip control characters.
pub fn sanitize_text(raw: Option<&str>) -> String {
    escape_backslash_quotes(&clean_text(&sanitize_scalar(raw)))
}

pub fn escape_single_quotes(s: &str) -> String {
    s.replace('\'', "''")
}

pub fn escape_backslash_quotes(s: &str) -> String {
    s.replace('\'', "\\'").replace('"', "\\\"")
}

fn is_stripped_control(c: char) -> bool {
    matches!(
        c,
        '\u{0000}'..='\u{0008}'
            | '\u{000B}'..='\u{000C}'
            | '\u{000E}'..='\u{001F}'
            | '\u{007F}'..='\u{009F}'
    )
}

/// First maximal digit run after NFKC folding, or 0. Full-width digits count.
/// Runs too long for `i64` saturate.
pub fn extract_number(raw: Option<&str>) -> i64 {
    raw.map(|s| s.nfkc().collect::<String>())
        .and_then(|folded| {
            DIGIT_RUN
                .find(&folded)
                .map(|m| m.as_str().parse::<i64>().unwrap_or(i64::MAX))
        })
        .unwrap_or(0)
}

/// Integer cell: exact parse, then truncated float parse, then the first digit
/// run. The cell is NFKC-folded first and thousands separators are ignored.
pub fn coerce_int(raw: Option<&str>) -> i64 {
    let cleaned = clean_scalar(raw).nfkc().filter(|c| *c != ',').collect::<String>();
    if cleaned.is_empty() {
        return 0;
    }
    if let Ok(value) = cleaned.parse::<i64>() {
        return value;
    }
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value.trunc() as i64,
        _ => extract_number(Some(&cleaned)),
    }
}

/// Split a multi-valued cell on [`LIST_DELIMITERS`], trimming pieces and
/// dropping empty ones.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    let cleaned = clean_scalar(raw);
    if cleaned.is_empty() {
        return Vec::new();
    }
    cleaned
        .split(|c: char| LIST_DELIMITERS.contains(&c))
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Related-paper cell of the entity sheet: a list literal such as
/// `["Title A", "Title B"]`. Brackets and quotes are removed and only the
/// ASCII comma separates titles.
pub fn split_related_titles(raw: Option<&str>) -> Vec<String> {
    let cleaned: String = clean_scalar(raw)
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '"' | '\''))
        .collect();
    cleaned
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode bytes as UTF-8, silently dropping invalid sequences.
pub fn decode_utf8_ignore(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
