//! Availability date parsing.
//!
//! Turns strings like "July 1st", "7/1", "2026-07-01" and ranges like
//! "July 1 - August 31" into `NaiveDate`s. Invalid calendar dates yield
//! `None` instead of an error.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

const MONTHS: &[(&str, u32)] = &[
    ("jan", 1),
    ("january", 1),
    ("feb", 2),
    ("february", 2),
    ("mar", 3),
    ("march", 3),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("jun", 6),
    ("june", 6),
    ("jul", 7),
    ("july", 7),
    ("aug", 8),
    ("august", 8),
    ("sep", 9),
    ("sept", 9),
    ("september", 9),
    ("oct", 10),
    ("october", 10),
    ("nov", 11),
    ("november", 11),
    ("dec", 12),
    ("december", 12),
];

static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(st|nd|rd|th)").expect("valid regex"));
static ISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})").expect("valid regex"));
static US: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?").expect("valid regex"));
static NAME_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+)\s+(\d{1,2})").expect("valid regex"));
static DAY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\s+(?:of\s+)?([a-z]+)").expect("valid regex"));

static DATE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([a-z]+\s+\d{1,2}|\d{1,2}/\d{1,2}(?:/\d{2,4})?)\s*(?:-|–|to|through|thru|until|til)\s*([a-z]+\s+\d{1,2}|\d{1,2}/\d{1,2}(?:/\d{2,4})?)",
    )
    .expect("valid regex")
});
static MONTH_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-z]+)\s*(?:-|–|to|through|thru)\s*([a-z]+)").expect("valid regex")
});

fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, number)| *number)
}

/// Parses a single date string, filling in `default_year` for formats that
/// omit the year. Two-digit years are normalized to 20xx.
pub fn parse_date(raw: &str, default_year: i32) -> Option<NaiveDate> {
    if raw.trim().is_empty() {
        return None;
    }

    let text = raw.trim().to_lowercase();
    let text = ORDINAL.replace_all(&text, "$1");

    // ISO: 2026-07-01
    if let Some(caps) = ISO.captures(&text) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    // US: MM/DD or MM/DD/YYYY
    if let Some(caps) = US.captures(&text) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year = match caps.get(3) {
            Some(y) => {
                let y: i32 = y.as_str().parse().ok()?;
                if y < 100 { y + 2000 } else { y }
            }
            None => default_year,
        };
        if (1..=12).contains(&month) && (1..=31).contains(&day) {
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }

    // "July 1" / "Jul 1"
    if let Some(caps) = NAME_DAY.captures(&text) {
        if let Some(month) = month_number(&caps[1]) {
            let day: u32 = caps[2].parse().ok()?;
            if (1..=31).contains(&day) {
                return NaiveDate::from_ymd_opt(default_year, month, day);
            }
        }
    }

    // "1 July" / "1st of July"
    if let Some(caps) = DAY_NAME.captures(&text) {
        if let Some(month) = month_number(&caps[2]) {
            let day: u32 = caps[1].parse().ok()?;
            if (1..=31).contains(&day) {
                return NaiveDate::from_ymd_opt(default_year, month, day);
            }
        }
    }

    None
}

/// Searches text for an availability range like "July 1 - August 31" or
/// "7/1 through 8/31". Falls back to a coarser "July - September" pattern,
/// assuming the 1st of the start month and the last day of the end month.
pub fn extract_date_range(text: &str, default_year: i32) -> (Option<NaiveDate>, Option<NaiveDate>) {
    if text.is_empty() {
        return (None, None);
    }

    let clean = text.to_lowercase();
    let clean = ORDINAL.replace_all(clean.trim(), "$1");

    if let Some(caps) = DATE_RANGE.captures(&clean) {
        let start = parse_date(&caps[1], default_year);
        let end = parse_date(&caps[2], default_year);
        return (start, end);
    }

    if let Some(caps) = MONTH_RANGE.captures(&clean) {
        if let (Some(start_month), Some(end_month)) =
            (month_number(&caps[1]), month_number(&caps[2]))
        {
            let start = NaiveDate::from_ymd_opt(default_year, start_month, 1);
            let end = last_day_of_month(default_year, end_month);
            return (start, end);
        }
    }

    (None, None)
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next.and_then(|d| d.pred_opt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    #[test]
    fn month_day() {
        assert_eq!(parse_date("July 1", 2026), Some(d(2026, 7, 1)));
    }

    #[test]
    fn month_day_ordinal() {
        assert_eq!(parse_date("July 1st", 2026), Some(d(2026, 7, 1)));
        assert_eq!(parse_date("August 15th", 2026), Some(d(2026, 8, 15)));
    }

    #[test]
    fn day_month() {
        assert_eq!(parse_date("1st of July", 2026), Some(d(2026, 7, 1)));
    }

    #[test]
    fn us_format() {
        assert_eq!(parse_date("7/1", 2026), Some(d(2026, 7, 1)));
    }

    #[test]
    fn us_format_with_year() {
        assert_eq!(parse_date("7/1/2026", 2026), Some(d(2026, 7, 1)));
        assert_eq!(parse_date("7/1/26", 2025), Some(d(2026, 7, 1)));
    }

    #[test]
    fn iso_format() {
        assert_eq!(parse_date("2026-07-01", 2026), Some(d(2026, 7, 1)));
    }

    #[test]
    fn abbreviated_month() {
        assert_eq!(parse_date("Jul 1", 2026), Some(d(2026, 7, 1)));
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse_date("", 2026), None);
    }

    #[test]
    fn invalid_calendar_date() {
        assert_eq!(parse_date("Feb 30", 2026), None);
        assert_eq!(parse_date("2026-02-30", 2026), None);
    }

    #[test]
    fn date_range_dash() {
        let (start, end) = extract_date_range("July 1 - August 31", 2026);
        assert_eq!(start, Some(d(2026, 7, 1)));
        assert_eq!(end, Some(d(2026, 8, 31)));
    }

    #[test]
    fn date_range_to() {
        let (start, end) = extract_date_range("available July 1 to September 30", 2026);
        assert_eq!(start, Some(d(2026, 7, 1)));
        assert_eq!(end, Some(d(2026, 9, 30)));
    }

    #[test]
    fn date_range_slash() {
        let (start, end) = extract_date_range("available 7/1 through 8/31", 2026);
        assert_eq!(start, Some(d(2026, 7, 1)));
        assert_eq!(end, Some(d(2026, 8, 31)));
    }

    #[test]
    fn month_only_range() {
        let (start, end) = extract_date_range("July - September", 2026);
        assert_eq!(start, Some(d(2026, 7, 1)));
        assert_eq!(end, Some(d(2026, 9, 30)));
    }

    #[test]
    fn month_range_respects_february() {
        let (_, end) = extract_date_range("January to February", 2026);
        assert_eq!(end, Some(d(2026, 2, 28)));
    }

    #[test]
    fn no_range() {
        assert_eq!(extract_date_range("no dates here", 2026), (None, None));
    }
}
