//! Lenient numeric coercion for spreadsheet-sourced values.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

const PLACEHOLDERS: [&str; 7] = ["", "-", "n/a", "na", "none", "null", "없음"];

pub fn is_placeholder(text: &str) -> bool {
    let trimmed = text.trim();
    PLACEHOLDERS
        .iter()
        .any(|placeholder| trimmed.eq_ignore_ascii_case(placeholder))
}

/// Parses a number out of a JSON value, tolerating thousands separators,
/// exponent notation and trailing units (`"1,234,000원"`, `"1.5E+10"`, `"85점"`).
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|n| n.is_finite()),
        Value::String(text) => parse_number_str(text),
        _ => None,
    }
}

pub fn parse_number_str(text: &str) -> Option<f64> {
    if is_placeholder(text) {
        return None;
    }

    let cleaned: String = text
        .trim()
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();

    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (index, ch) in cleaned.char_indices() {
        match ch {
            '+' | '-' if index == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            'e' | 'E' if seen_digit => {
                // only an exponent when digits follow, otherwise a unit
                let rest = &cleaned[index + 1..];
                let sign = usize::from(rest.starts_with(|c: char| c == '+' || c == '-'));
                let digits = rest[sign..]
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .count();
                if digits > 0 {
                    end = index + 1 + sign + digits;
                }
                break;
            }
            _ => break,
        }
        end = index + ch.len_utf8();
    }

    if !seen_digit {
        return None;
    }
    cleaned[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Serde helper for optional numeric fields that may arrive as strings.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_number))
}

pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !is_placeholder(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
