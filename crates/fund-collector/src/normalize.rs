//! Pure normalization helpers shared by every source adapter.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

struct DatePatterns {
    iso: Regex,
    compact_day: Regex,
    compact_month: Regex,
}

fn date_patterns() -> &'static DatePatterns {
    static PATTERNS: OnceLock<DatePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| DatePatterns {
        iso: Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("iso date regex is valid"),
        compact_day: Regex::new(r"^[0-9]{8}$").expect("yyyymmdd regex is valid"),
        compact_month: Regex::new(r"^[0-9]{6}$").expect("yyyymm regex is valid"),
    })
}

/// Map a raw date to `YYYY-MM-DD`, or `""` when the shape is not recognized.
///
/// Accepted shapes, checked in order: `YYYY-MM-DD` (returned as is),
/// `YYYYMMDD`, and `YYYYMM` (day defaults to `01`). No calendar validation.
pub fn normalize_date(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return String::new();
    }
    let patterns = date_patterns();
    if patterns.iso.is_match(s) {
        return s.to_string();
    }
    if patterns.compact_day.is_match(s) {
        return format!("{}-{}-{}", &s[0..4], &s[4..6], &s[6..8]);
    }
    if patterns.compact_month.is_match(s) {
        return format!("{}-{}-01", &s[0..4], &s[4..6]);
    }
    String::new()
}

/// Collapse whitespace runs to a single space and trim both ends.
pub fn clean_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parts of a multi-line fund-name cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FundName {
    /// Investment field (first line when there are two or more).
    pub field: String,
    /// Cleaned fund name.
    pub name: String,
    /// Every non-empty line joined with `" / "`.
    pub raw: String,
}

/// Split a cell that combines investment field and fund name on newlines.
pub fn split_fund_name(cell: &str) -> FundName {
    let parts: Vec<&str> = cell
        .split('\n')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [] => FundName::default(),
        [only] => FundName {
            field: String::new(),
            name: only.to_string(),
            raw: only.to_string(),
        },
        [first, second, ..] => FundName {
            field: first.to_string(),
            name: second.to_string(),
            raw: parts.join(" / "),
        },
    }
}

/// Year encoded in the first four characters of a normalized date.
pub fn registration_year(reg_dd: &str) -> Option<i32> {
    reg_dd.get(0..4)?.parse().ok()
}

/// Render a JSON scalar as text; null and containers become `""`.
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
