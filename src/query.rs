//! Page query-string arguments.
//!
//! The dashboard reads its arguments the way a browser page reads
//! `location.search`: split on `&`, compare the raw key, percent-decode the
//! value. When a key repeats, the last occurrence wins.

use reqwest::Url;

/// Display window used when `lasthours` is absent or unusable.
pub const DEFAULT_LAST_HOURS: i64 = 72;

/// Look up `name` in a raw query string (with or without the leading `?`).
///
/// A key given without `=` yields an empty value. Values that fail to
/// percent-decode are treated as absent.
#[must_use]
pub fn query_argument(search: &str, name: &str) -> Option<String> {
    let search = search.strip_prefix('?').unwrap_or(search);

    let mut result = None;
    for item in search.split('&') {
        let mut parts = item.split('=');
        if parts.next() != Some(name) {
            continue;
        }
        let raw = parts.next().unwrap_or_default();
        result = urlencoding::decode(raw).ok().map(|value| value.into_owned());
    }
    result
}

/// Parse the `lasthours` argument from a raw query string.
#[must_use]
pub fn last_hours(search: &str) -> i64 {
    query_argument(search, "lasthours")
        .and_then(|value| parse_leading_int(&value))
        .filter(|hours| *hours != 0)
        .unwrap_or(DEFAULT_LAST_HOURS)
}

/// Parse the `lasthours` argument carried by a page URL.
#[must_use]
pub fn last_hours_from_url(url: &Url) -> i64 {
    last_hours(url.query().unwrap_or_default())
}

/// Leading-integer parse: optional whitespace and sign, then as many digits
/// as are present (`"48h"` is 48). `None` if no digit follows.
fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end]
        .bytes()
        .fold(0_i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    Some(if negative { -magnitude } else { magnitude })
}
