// Formatting helpers shared by the analysis modules.
//
// All derived records store pre-formatted display strings (gap deltas,
// KPI baselines/targets), so the exact rendering rules live here in one
// place rather than being repeated per module.
use num_format::{Locale, ToFormattedString};

/// Format a floating-point value with:
/// - a fixed number of decimal places, and
/// - locale-aware thousands separators (e.g., `1,234,567.89`).
pub fn format_number(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // counts in console messages and report tables.
    n.to_formatted_string(&Locale::en)
}

/// Format a delta with an explicit sign: `+1,234.5` / `-1,234.5`.
/// Zero renders as `+0` so gap rows always carry a direction marker.
pub fn format_signed(n: f64, decimals: usize) -> String {
    if n < 0.0 {
        format_number(n, decimals)
    } else {
        format!("+{}", format_number(n, decimals))
    }
}

/// Dollar amount with thousands separators and no decimals: `$45,000`.
pub fn format_money(n: f64) -> String {
    format!("${}", format_number(n, 0))
}

/// Signed dollar delta: `+$5,000` / `-$5,000`.
pub fn format_money_signed(n: f64) -> String {
    if n < 0.0 {
        format!("-${}", format_number(n.abs(), 0))
    } else {
        format!("+${}", format_number(n, 0))
    }
}

/// Millions shorthand used in narrative text: `$50 million`, `$7.5 million`.
pub fn format_millions(n: f64) -> String {
    let m = n / 1_000_000.0;
    if (m - m.round()).abs() < 1e-9 {
        format!("${:.0} million", m)
    } else {
        format!("${:.1} million", m)
    }
}

/// Split free text into trimmed sentences on `.`, `!` and `?`.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
