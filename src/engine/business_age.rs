use crate::coerce::{is_placeholder, parse_number_str};
use chrono::{Duration, Local, NaiveDate};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const DAYS_PER_YEAR: f64 = 365.2425;
const MAX_PLAIN_YEARS: f64 = 200.0;
/// Plausible spreadsheet serial range (1954..2119).
const SERIAL_RANGE: (f64, f64) = (20_000.0, 80_000.0);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BusinessAge {
    pub years: Option<f64>,
    pub start_date: Option<NaiveDate>,
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Years in business for a raw record value, relative to `evaluation_date`
/// (today when `None`).
///
/// Tried in order: a calendar date, a plain year count in `(0, 200]`,
/// Korean `N년 M개월` text, then any leading number in `(0, 200]`.
pub fn compute_years(raw: &Value, evaluation_date: Option<NaiveDate>) -> BusinessAge {
    let evaluation_date = evaluation_date.unwrap_or_else(today);

    if let Some(start) = parse_date(raw) {
        let days = (evaluation_date - start).num_days() as f64;
        let years = round4((days / DAYS_PER_YEAR).max(0.0));
        return BusinessAge {
            years: Some(years),
            start_date: Some(start),
        };
    }

    let years = match raw {
        Value::Number(number) => number.as_f64().filter(|n| in_year_range(*n)),
        Value::String(text) if !is_placeholder(text) => parse_year_text(text).or_else(|| {
            parse_number_str(text).filter(|n| in_year_range(*n))
        }),
        _ => None,
    };

    BusinessAge {
        years: years.map(round4),
        start_date: None,
    }
}

fn in_year_range(years: f64) -> bool {
    years.is_finite() && years > 0.0 && years <= MAX_PLAIN_YEARS
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn date_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^\s*(\d{4})\s*[.\-/년 ]\s*(\d{1,2})\s*[.\-/월 ]\s*(\d{1,2})\s*일?").ok()
        })
        .as_ref()
}

fn year_text_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?:(\d+(?:\.\d+)?)\s*년)?\s*(?:(\d+)\s*개월)?").ok())
        .as_ref()
}

/// Calendar date from `YYYY.MM.DD`-style text, `YYYYMMDD`, or a
/// spreadsheet serial (days since 1899-12-30).
pub fn parse_date(raw: &Value) -> Option<NaiveDate> {
    match raw {
        Value::Number(number) => number.as_f64().and_then(from_serial),
        Value::String(text) => parse_date_str(text),
        _ => None,
    }
}

fn parse_date_str(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();

    if let Some(captures) = date_pattern().and_then(|pattern| pattern.captures(trimmed)) {
        let year = captures.get(1)?.as_str().parse().ok()?;
        let month = captures.get(2)?.as_str().parse().ok()?;
        let day = captures.get(3)?.as_str().parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if trimmed.len() == 8 && trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return NaiveDate::parse_from_str(trimmed, "%Y%m%d").ok();
    }

    if trimmed.chars().all(|ch| ch.is_ascii_digit() || ch == '.') {
        return trimmed.parse::<f64>().ok().and_then(from_serial);
    }

    None
}

fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !(SERIAL_RANGE.0..=SERIAL_RANGE.1).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn parse_year_text(text: &str) -> Option<f64> {
    if !text.contains('년') && !text.contains("개월") {
        return None;
    }
    let captures = year_text_pattern()?
        .captures_iter(text)
        .find(|captures| captures.get(1).is_some() || captures.get(2).is_some())?;

    let years = captures
        .get(1)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0);
    let months = captures
        .get(2)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0);
    let total = years + months / 12.0;
    (total > 0.0).then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn parses_separated_dates() {
        assert_eq!(parse_date(&json!("2015.03.01")), Some(date(2015, 3, 1)));
        assert_eq!(parse_date(&json!("2015-3-1")), Some(date(2015, 3, 1)));
        assert_eq!(parse_date(&json!("2015/03/01")), Some(date(2015, 3, 1)));
        assert_eq!(parse_date(&json!("2015년 3월 1일")), Some(date(2015, 3, 1)));
        assert_eq!(parse_date(&json!("20150301")), Some(date(2015, 3, 1)));
    }

    #[test]
    fn parses_spreadsheet_serials() {
        assert_eq!(parse_date(&json!(45292)), Some(date(2024, 1, 1)));
        assert_eq!(parse_date(&json!("45292")), Some(date(2024, 1, 1)));
        assert_eq!(parse_date(&json!(12)), None);
    }

    #[test]
    fn rejects_impossible_dates() {
        assert_eq!(parse_date(&json!("2015.13.40")), None);
        assert_eq!(parse_date(&json!("20151340")), None);
    }

    #[test]
    fn years_from_start_date() {
        let age = compute_years(&json!("2020-01-01"), Some(date(2025, 1, 1)));
        assert_eq!(age.start_date, Some(date(2020, 1, 1)));
        let years = age.years.expect("years resolved");
        assert!((years - 5.0022).abs() < 1e-9, "got {years}");
    }

    #[test]
    fn future_start_date_floors_at_zero() {
        let age = compute_years(&json!("2030-01-01"), Some(date(2025, 1, 1)));
        assert_eq!(age.years, Some(0.0));
    }

    #[test]
    fn plain_numbers_are_years() {
        assert_eq!(compute_years(&json!(7), None).years, Some(7.0));
        assert_eq!(compute_years(&json!(0), None).years, None);
        assert_eq!(compute_years(&json!(250), None).years, None);
    }

    #[test]
    fn korean_year_month_text() {
        assert_eq!(compute_years(&json!("3년 6개월"), None).years, Some(3.5));
        assert_eq!(compute_years(&json!("18개월"), None).years, Some(1.5));
        assert_eq!(compute_years(&json!("10년"), None).years, Some(10.0));
    }

    #[test]
    fn generic_numeric_text_and_failures() {
        assert_eq!(compute_years(&json!("12.5 years"), None).years, Some(12.5));
        assert_eq!(compute_years(&json!("unknown"), None).years, None);
        assert_eq!(compute_years(&json!("N/A"), None).years, None);
        assert_eq!(compute_years(&Value::Null, None).years, None);
    }
}
