use crate::types::formula::GradeEntry;
use regex::Regex;
use std::sync::OnceLock;

/// Corporate credit grades, best first. Index is the rank.
pub const GRADE_ORDER: [&str; 22] = [
    "AAA", "AA+", "AA", "AA-", "A+", "A", "A-", "BBB+", "BBB", "BBB-", "BB+", "BB", "BB-", "B+",
    "B", "B-", "CCC+", "CCC", "CCC-", "CC", "C", "D",
];

fn grade_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)(?:^|[^A-Z])([A-Z]{1,3}[0-9+\-]?)(?:[^A-Z0-9]|$)").ok())
        .as_ref()
}

/// Pulls a grade token such as `BBB+` out of free text, upper-cased.
/// Falls back to the first delimiter-separated token.
pub fn extract_grade(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(token) = grade_pattern()
        .and_then(|pattern| pattern.captures(trimmed))
        .and_then(|captures| captures.get(1))
    {
        return token.as_str().to_uppercase();
    }

    trimmed
        .split(|ch: char| ch.is_whitespace() || matches!(ch, ',' | '/' | '(' | ')' | '|' | ';'))
        .find(|part| !part.is_empty())
        .unwrap_or_default()
        .to_uppercase()
}

/// `A0`, `BBB0` are written for the unsigned middle notch.
fn canonical(token: &str) -> String {
    let upper = token.trim().to_uppercase();
    match upper.strip_suffix('0') {
        Some(stem) if !stem.is_empty() && stem.chars().all(|ch| ch.is_ascii_alphabetic()) => {
            stem.to_string()
        }
        _ => upper,
    }
}

/// Ordinal of a grade token; `None` for unknown grades, which rank worst.
pub fn rank(token: &str) -> Option<usize> {
    let canonical = canonical(token);
    GRADE_ORDER.iter().position(|grade| *grade == canonical)
}

/// True when `grade` ranks at or above `minimum`. Unknown grades never pass.
pub fn meets_minimum(grade: &str, minimum: &str) -> bool {
    match (rank(&extract_grade(grade)), rank(&extract_grade(minimum))) {
        (Some(grade_rank), Some(minimum_rank)) => grade_rank <= minimum_rank,
        _ => false,
    }
}

/// Exact lookup of a grade in a configured table.
pub fn grade_score(raw: &str, table: &[GradeEntry]) -> Option<(String, f64)> {
    let token = extract_grade(raw);
    let keys = [canonical(raw), canonical(&token)];

    table
        .iter()
        .find(|entry| keys.contains(&canonical(&entry.grade)))
        .map(|entry| (token.clone(), entry.score))
}
