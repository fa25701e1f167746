//! Humanized formatting of amounts, sizes, ages and dates.

use chrono::{DateTime, Utc};

use crate::constants::ATOMS_PER_DCR;
use crate::domain::BlockTime;

// ============================================================================
// Amounts
// ============================================================================

/// Convert an on-chain amount in atoms to DCR.
#[must_use]
pub fn atoms_to_dcr(atoms: f64) -> f64 {
    atoms / ATOMS_PER_DCR
}

/// Group the integer digits of a plain decimal string with commas.
fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a number the way an en-US locale string does.
///
/// The value is rounded to `max_decimals` places, trailing zeros are trimmed
/// down to `min_decimals`, and the integer part is grouped with commas.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_to_local_string(1234567.891, 2, 2), "1,234,567.89");
/// assert_eq!(format_to_local_string(12.5, 0, 3), "12.5");
/// ```
#[must_use]
pub fn format_to_local_string(value: f64, min_decimals: usize, max_decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let max_decimals = max_decimals.max(min_decimals);
    let formatted = format!("{:.*}", max_decimals, value.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), ""));

    let mut frac = frac_part.to_string();
    while frac.len() > min_decimals && frac.ends_with('0') {
        frac.pop();
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut result = String::new();
    if negative {
        result.push('-');
    }
    result.push_str(&group_thousands(int_part));
    if !frac.is_empty() {
        result.push('.');
        result.push_str(&frac);
    }
    result
}

/// Format a USD amount as `$1,234.50`.
#[must_use]
pub fn usd(value: f64) -> String {
    format!("${}", format_to_local_string(value, 2, 2))
}

/// Format a value to three significant figures with a k/M/B suffix.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(three_sig_figs(12345.0), "12.3k");
/// assert_eq!(three_sig_figs(0.012345), "0.0123");
/// assert_eq!(three_sig_figs(999.6), "1k");
/// ```
#[must_use]
pub fn three_sig_figs(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let step = 10f64.powi(magnitude - 2);
    let value = (value / step).round() * step;
    let (scaled, suffix) = match value.abs() {
        v if v >= 1e9 => (value / 1e9, "B"),
        v if v >= 1e6 => (value / 1e6, "M"),
        v if v >= 1e3 => (value / 1e3, "k"),
        _ => (value, ""),
    };
    let magnitude = scaled.abs().log10().floor() as i32;
    let decimals = (2 - magnitude).max(0) as usize;
    let mut text = format!("{scaled:.decimals$}");
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    format!("{text}{suffix}")
}

// ============================================================================
// Sizes
// ============================================================================

/// Format a byte count with decimal units, e.g. `1.2 kB`.
#[must_use]
pub fn bytes(size: u64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];
    if size < 1000 {
        return format!("{size} B");
    }
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

// ============================================================================
// Time
// ============================================================================

/// Format the time elapsed since a Unix timestamp.
///
/// Shows the two most significant units, e.g. `4m 12s` or `2d 3h`.
/// Timestamps in the future read as `0s`.
#[must_use]
pub fn time_since(unix_stamp: i64, now: DateTime<Utc>) -> String {
    let secs = now.timestamp().saturating_sub(unix_stamp).max(0);
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const YEAR: i64 = 365 * DAY;

    match secs {
        s if s < MINUTE => format!("{s}s"),
        s if s < HOUR => format!("{}m {}s", s / MINUTE, s % MINUTE),
        s if s < DAY => format!("{}h {}m", s / HOUR, (s % HOUR) / MINUTE),
        s if s < YEAR => format!("{}d {}h", s / DAY, (s % DAY) / HOUR),
        s => format!("{}y {}d", s / YEAR, (s % YEAR) / DAY),
    }
}

/// Format a Unix timestamp as `YYYY-MM-DD HH:MM:SS` in UTC.
///
/// Returns an empty string for a zero or out-of-range timestamp.
#[must_use]
pub fn date(unix_stamp: i64) -> String {
    if unix_stamp == 0 {
        return String::new();
    }
    DateTime::from_timestamp(unix_stamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Format a block time, which may arrive as seconds or as text.
#[must_use]
pub fn block_date(time: &BlockTime) -> String {
    match time {
        BlockTime::Unix(secs) => date(*secs),
        BlockTime::Text(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| date(dt.timestamp()))
            .unwrap_or_else(|_| text.clone()),
    }
}

// ============================================================================
// Text
// ============================================================================

/// Upper-case the first character, e.g. `marketing` becomes `Marketing`.
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================
