//! Price normalization.
//!
//! Handles formats like `$1800`, `$1,800`, `$1.8k`, `$450/week`, `$65/night`
//! and always returns monthly rent in whole USD, or `None` if unparseable.

use std::sync::LazyLock;

use regex::Regex;

static K_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)\s*k").expect("valid regex"));
static PLAIN_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)").expect("valid regex"));

// Price-shaped substrings in priority order: $-prefixed with a period
// suffix, bare number with a period suffix, then any $-prefixed number.
static TEXT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\$[\d,]+\.?\d*\s*[kK]?\s*(?:/\s*(?:mo|month|week|wk|night|nite))?",
        r"[\d,]+\.?\d*\s*[kK]?\s*(?:/\s*(?:mo|month|week|wk|night|nite))",
        r"\$[\d,]+\.?\d*\s*[kK]?",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

const NIGHTLY_CUES: [&str; 5] = ["/night", "per night", "/nite", "nightly", "/n"];
const WEEKLY_CUES: [&str; 5] = ["/week", "per week", "/wk", "weekly", "/w"];
const YEARLY_CUES: [&str; 4] = ["/year", "per year", "/yr", "annually"];

/// Parses a raw price string into monthly rent (integer USD).
pub fn parse_price(raw: &str) -> Option<i64> {
    if raw.trim().is_empty() {
        return None;
    }

    let text = raw.to_lowercase().trim().replace(',', "").replace('$', "");
    let text = text.trim();

    // "X.Xk" shorthand, e.g. "1.8k" = 1800
    if let Some(caps) = K_AMOUNT.captures(text) {
        let amount: f64 = caps[1].parse().ok()?;
        return Some(to_monthly(amount * 1000.0, text));
    }

    let caps = PLAIN_AMOUNT.captures(text)?;
    let amount: f64 = caps[1].parse().ok()?;
    Some(to_monthly(amount, text))
}

/// Converts an amount to monthly based on period cues in the text.
fn to_monthly(amount: f64, text: &str) -> i64 {
    if NIGHTLY_CUES.iter().any(|cue| text.contains(cue)) {
        return (amount * 30.0) as i64;
    }
    if WEEKLY_CUES.iter().any(|cue| text.contains(cue)) {
        return (amount * 4.33) as i64;
    }
    if YEARLY_CUES.iter().any(|cue| text.contains(cue)) {
        return (amount / 12.0) as i64;
    }

    // No period cue: assume monthly, but suspiciously low amounts are
    // overwhelmingly mis-stated nightly or weekly rates in source text.
    let monthly = amount as i64;
    if monthly < 200 {
        return monthly * 30;
    }
    if monthly < 600 {
        return (monthly as f64 * 4.33) as i64;
    }
    monthly
}

/// Scans a longer text block for a price-shaped substring and parses the
/// first one whose monthly value lands in a sane range.
pub fn extract_price_from_text(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }

    for pattern in TEXT_PATTERNS.iter() {
        if let Some(m) = pattern.find(text) {
            if let Some(price) = parse_price(m.as_str()) {
                if (100..=15000).contains(&price) {
                    return Some(price);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_dollar() {
        assert_eq!(parse_price("$1800"), Some(1800));
    }

    #[test]
    fn with_comma() {
        assert_eq!(parse_price("$1,800"), Some(1800));
    }

    #[test]
    fn k_shorthand() {
        assert_eq!(parse_price("$1.8k"), Some(1800));
    }

    #[test]
    fn per_week() {
        let result = parse_price("$450/week").expect("parses");
        assert!((1900..=2000).contains(&result)); // 450 * 4.33
    }

    #[test]
    fn per_night() {
        assert_eq!(parse_price("$65/night"), Some(1950));
    }

    #[test]
    fn yearly_divides() {
        assert_eq!(parse_price("$24000/year"), Some(2000));
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("   "), None);
    }

    #[test]
    fn no_number() {
        assert_eq!(parse_price("call for price"), None);
    }

    #[test]
    fn low_bare_number_reinterpreted_as_nightly() {
        assert_eq!(parse_price("150"), Some(4500));
    }

    #[test]
    fn low_bare_number_reinterpreted_as_weekly() {
        // 550 * 4.33 = 2381, truncated
        assert_eq!(parse_price("550"), Some(2381));
    }

    #[test]
    fn extract_from_text() {
        assert_eq!(
            extract_price_from_text("Beautiful studio for $1800/mo in Midtown"),
            Some(1800)
        );
    }

    #[test]
    fn extract_from_text_no_price() {
        assert_eq!(extract_price_from_text("Beautiful studio in Midtown"), None);
    }

    #[test]
    fn extract_rejects_out_of_range() {
        assert_eq!(extract_price_from_text("zip code $99999"), None);
    }
}
