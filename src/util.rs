// Utility helpers for parsing and number formatting.
//
// Spreadsheet exports carry thousands separators, percent signs and
// accounting-style negatives; this module turns those into plain `f64`
// values and back into readable strings.
use num_format::{Locale, ToFormattedString};

/// Parse a spreadsheet number while being forgiving about formatting.
///
/// - Trims whitespace and strips thousands separators.
/// - Accepts a trailing `%` (the number is kept as written, not divided).
/// - Reads `(1,234.5)` as `-1234.5`.
/// - Rejects anything with letters, which covers `#DIV/0!` and `nan`.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.trim_end_matches('%').trim();
    let (negative, body) = match s.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };
    let v = body.replace(',', "").trim().parse::<f64>().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(if negative { -v } else { v })
}

/// Trimmed, non-empty text.
pub fn clean_text(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Sum of the present values; missing values are skipped.
pub fn sum_present<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().sum()
}

/// Percentage change of `actual` against `reference`. Undefined for a zero
/// reference.
pub fn variance_pct(actual: f64, reference: f64) -> Option<f64> {
    if reference.abs() < f64::EPSILON {
        return None;
    }
    let v = (actual - reference) * 100.0 / reference.abs();
    v.is_finite().then_some(v)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

pub fn display_usd(v: &f64) -> String {
    format_number(*v, 2)
}

pub fn display_opt_usd(v: &Option<f64>) -> String {
    match v {
        Some(v) => display_usd(v),
        None => "n/a".to_string(),
    }
}

pub fn display_pct(v: &f64) -> String {
    format!("{}%", format_number(*v, 2))
}

pub fn display_opt_pct(v: &Option<f64>) -> String {
    match v {
        Some(v) => display_pct(v),
        None => "n/a".to_string(),
    }
}
