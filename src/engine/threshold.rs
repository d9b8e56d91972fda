use crate::types::formula::Threshold;

/// Resolves a score from banded thresholds.
///
/// Bands are tried in document order and the first match wins, so a wide
/// band listed early shadows narrower bands after it. When nothing matches
/// the last entry's score is used as the open tail band.
pub fn evaluate(value: f64, thresholds: &[Threshold]) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let last = thresholds.last()?;

    thresholds
        .iter()
        .find(|threshold| matches(value, threshold))
        .or(Some(last))
        .map(|threshold| threshold.score)
}

fn matches(value: f64, threshold: &Threshold) -> bool {
    match (threshold.gte, threshold.lt) {
        (Some(gte), Some(lt)) => gte <= value && value < lt,
        (None, Some(lt)) => value < lt,
        (Some(gte), None) => value >= gte,
        (None, None) => false,
    }
}

/// Highest score across entries, regardless of order. Zero for an empty table.
pub fn max_score(thresholds: &[Threshold]) -> f64 {
    thresholds
        .iter()
        .map(|threshold| threshold.score)
        .filter(|score| score.is_finite())
        .fold(None, |acc: Option<f64>, score| {
            Some(acc.map_or(score, |best| best.max(score)))
        })
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(gte: Option<f64>, lt: Option<f64>, score: f64) -> Threshold {
        Threshold { lt, gte, score }
    }

    fn debt_table() -> Vec<Threshold> {
        vec![
            band(None, Some(0.5), 8.0),
            band(Some(0.5), Some(1.0), 6.0),
            band(Some(1.0), None, 4.0),
        ]
    }

    #[test]
    fn matches_each_band_shape() {
        let table = debt_table();
        assert_eq!(evaluate(0.2, &table), Some(8.0));
        assert_eq!(evaluate(0.5, &table), Some(6.0));
        assert_eq!(evaluate(0.99, &table), Some(6.0));
        assert_eq!(evaluate(1.0, &table), Some(4.0));
        assert_eq!(evaluate(7.0, &table), Some(4.0));
    }

    #[test]
    fn unmatched_value_uses_last_entry() {
        let table = vec![band(Some(1.0), Some(2.0), 5.0), band(Some(2.0), Some(3.0), 9.0)];
        assert_eq!(evaluate(0.1, &table), Some(9.0));
        assert_eq!(evaluate(10.0, &table), Some(9.0));
    }

    #[test]
    fn empty_table_and_non_finite_value_yield_none() {
        assert_eq!(evaluate(1.0, &[]), None);
        assert_eq!(evaluate(f64::NAN, &debt_table()), None);
        assert_eq!(evaluate(f64::INFINITY, &debt_table()), None);
    }

    #[test]
    fn document_order_decides_overlapping_bands() {
        let table = vec![band(Some(0.0), Some(10.0), 1.0), band(Some(5.0), Some(10.0), 3.0)];
        assert_eq!(evaluate(7.0, &table), Some(1.0));
    }

    #[test]
    fn max_score_ignores_order() {
        let table = vec![band(None, Some(1.0), 2.0), band(Some(1.0), None, 11.0), band(None, None, 7.0)];
        assert_eq!(max_score(&table), 11.0);
        assert_eq!(max_score(&[]), 0.0);
    }
}
