//! Pure formatting and time arithmetic used by the ticker display.

use chrono::{Local, Offset, TimeZone};
use std::fmt::Display;

/// Rendered in place of any value that is unknown or cannot be formatted.
pub const PLACEHOLDER: &str = "—";

/// Funding payments settle every 8 hours, aligned to the Unix epoch.
pub const FUNDING_INTERVAL_MS: i64 = 8 * 60 * 60 * 1000;

/// Epoch values below this are interpreted as seconds.
const SECONDS_CUTOFF: f64 = 1e12;

/// Largest representable date offset, in ms either side of the epoch.
const MAX_EPOCH_MS: f64 = 8.64e15;

/// Recognised quote suffixes, checked in order. USDT must precede USD.
pub const QUOTE_SUFFIXES: [&str; 4] = ["USDT", "BUSD", "USDC", "USD"];

/// Quotes pegged to the dollar get a `$` prefix on prices.
const USD_QUOTES: [&str; 4] = ["USD", "USDT", "USDC", "BUSD"];

/// Normalize an epoch that may be expressed in seconds or milliseconds.
pub fn to_ms(raw: f64) -> Option<i64> {
    if !raw.is_finite() {
        return None;
    }
    let ms = if raw < SECONDS_CUTOFF { raw * 1000.0 } else { raw };
    if ms.abs() > MAX_EPOCH_MS {
        return None;
    }
    Some(ms as i64)
}

/// Least multiple of [`FUNDING_INTERVAL_MS`] that is `>= now_ms`.
pub fn next_funding_boundary(now_ms: i64) -> i64 {
    let periods = now_ms.div_euclid(FUNDING_INTERVAL_MS);
    let carry = i64::from(now_ms.rem_euclid(FUNDING_INTERVAL_MS) != 0);
    (periods + carry) * FUNDING_INTERVAL_MS
}

pub fn pad2(n: i64) -> String {
    format!("{n:02}")
}

/// Split a concatenated ticker such as `BTCUSDT` into `BTC/USDT`.
///
/// Returns the display text and the recognised quote currency. Unrecognised
/// input is returned unchanged with no quote; empty input renders as the
/// placeholder.
pub fn split_symbol(symbol: &str) -> (String, Option<&'static str>) {
    if symbol.is_empty() {
        return (PLACEHOLDER.to_string(), None);
    }
    for quote in QUOTE_SUFFIXES {
        if let Some(base) = symbol.strip_suffix(quote) {
            return (format!("{base}/{quote}"), Some(quote));
        }
    }
    (symbol.to_string(), None)
}

/// Two decimals with comma grouping, `$`-prefixed for dollar quotes.
pub fn format_price(value: Option<f64>, quote: Option<&str>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return PLACEHOLDER.to_string();
    };
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 { "-" } else { "" };
    let currency = match quote {
        Some(q) if USD_QUOTES.contains(&q) => "$",
        _ => "",
    };
    format!("{currency}{sign}{}.{frac_part}", group_thousands(int_part))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Short zone label: initials of a verbose zone name, or a `GMT+HHMM` token.
pub fn zone_abbreviation(long_name: Option<&str>, offset_secs: i32) -> String {
    if let Some(name) = long_name {
        let initials: String = name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect();
        if !initials.is_empty() {
            return initials;
        }
    }
    let sign = if offset_secs < 0 { '-' } else { '+' };
    let abs = offset_secs.unsigned_abs();
    format!("GMT{sign}{:02}{:02}", abs / 3600, (abs % 3600) / 60)
}

/// Render an epoch in `tz` as `YYYY-MM-DD HH:MM:SS ZONE`.
pub fn format_time_in<Tz>(ms: Option<i64>, tz: &Tz, long_name: Option<&str>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(ms) = ms.filter(|ms| *ms != 0) else {
        return PLACEHOLDER.to_string();
    };
    let Some(dt) = tz.timestamp_millis_opt(ms).single() else {
        return PLACEHOLDER.to_string();
    };
    let zone = zone_abbreviation(long_name, dt.offset().fix().local_minus_utc());
    format!("{} {zone}", dt.format("%Y-%m-%d %H:%M:%S"))
}

/// The host's local time zone, optionally labelled with a verbose name.
#[derive(Debug, Clone, Default)]
pub struct LocalZone {
    long_name: Option<String>,
}

impl LocalZone {
    pub fn new(long_name: Option<String>) -> Self {
        Self { long_name }
    }

    pub fn format(&self, ms: Option<i64>) -> String {
        format_time_in(ms, &Local, self.long_name.as_deref())
    }
}
