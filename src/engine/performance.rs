use super::expr;
use crate::types::formula::{
    apply_rounding, PerformanceMode, PerformanceRules, PerformanceVariant, RatioBand,
};
use crate::types::result::PerformanceResult;
use tracing::{debug, warn};

/// Cap used by the `ratio * cap` fallback when the rules name none.
pub const DEFAULT_FORMULA_CAP: f64 = 13.0;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PerformanceInputs {
    pub perf5y: Option<f64>,
    pub base_amount: Option<f64>,
    pub estimated_amount: Option<f64>,
    pub file_type: Option<String>,
}

fn variant_matches(variant: &PerformanceVariant, inputs: &PerformanceInputs) -> bool {
    let when = &variant.when;

    if !when.file_types.is_empty() {
        let Some(file_type) = inputs.file_type.as_deref() else {
            return false;
        };
        let file_type = file_type.trim().to_lowercase();
        if !when
            .file_types
            .iter()
            .any(|candidate| candidate.trim().to_lowercase() == file_type)
        {
            return false;
        }
    }

    if when.estimated_amount_lt.is_some() || when.estimated_amount_gte.is_some() {
        let Some(amount) = inputs.estimated_amount.filter(|a| a.is_finite()) else {
            return false;
        };
        if when.estimated_amount_lt.is_some_and(|lt| amount >= lt) {
            return false;
        }
        if when.estimated_amount_gte.is_some_and(|gte| amount < gte) {
            return false;
        }
    }

    true
}

/// Base rules with the first matching variant's fields laid over them.
pub fn resolve_variant(rules: &PerformanceRules, inputs: &PerformanceInputs) -> PerformanceRules {
    let mut resolved = rules.clone();
    resolved.variants.clear();

    if let Some((index, variant)) = rules
        .variants
        .iter()
        .enumerate()
        .find(|(_, variant)| variant_matches(variant, inputs))
    {
        debug!(variant = index, "performance variant applied");
        if let Some(mode) = variant.mode {
            resolved.mode = mode;
        }
        if let Some(formula) = &variant.formula {
            resolved.formula = Some(formula.clone());
        }
        if let Some(thresholds) = &variant.thresholds {
            resolved.thresholds = Some(thresholds.clone());
        }
        if let Some(max_score) = variant.max_score {
            resolved.max_score = Some(max_score);
        }
        if let Some(rounding) = variant.rounding {
            resolved.rounding = Some(rounding);
        }
    }

    resolved
}

pub fn evaluate(inputs: &PerformanceInputs, rules: &PerformanceRules) -> PerformanceResult {
    let rules = resolve_variant(rules, inputs);
    let perf5y = inputs.perf5y.unwrap_or(0.0);
    let base_amount = inputs.base_amount.unwrap_or(0.0);
    let ratio = if base_amount > 0.0 {
        perf5y / base_amount
    } else {
        0.0
    };

    let (raw, max_score) = match rules.mode {
        PerformanceMode::RatioBands => ratio_bands(ratio, &rules),
        PerformanceMode::Formula => formula(ratio, perf5y, base_amount, inputs, &rules),
    };

    let capped = raw.min(max_score).max(0.0);
    let score = apply_rounding(rules.rounding.as_ref(), capped);

    PerformanceResult {
        score,
        raw,
        capped,
        mode: rules.mode,
        ratio,
        max_score,
    }
}

fn ratio_bands(ratio: f64, rules: &PerformanceRules) -> (f64, f64) {
    let mut bands: Vec<RatioBand> = rules.thresholds.clone().unwrap_or_default();
    bands.sort_by(|a, b| a.min_ratio.total_cmp(&b.min_ratio));

    let raw = bands
        .iter()
        .filter(|band| band.min_ratio <= ratio)
        .last()
        .map_or(0.0, |band| band.score);

    // a configured cap never shrinks what the bands themselves award
    let band_max = bands.iter().map(|band| band.score).fold(0.0, f64::max);
    let max_score = rules.max_score.unwrap_or(0.0).max(band_max);

    (raw, max_score)
}

fn formula(
    ratio: f64,
    perf5y: f64,
    base_amount: f64,
    inputs: &PerformanceInputs,
    rules: &PerformanceRules,
) -> (f64, f64) {
    let max_score = rules
        .max_score
        .filter(|cap| cap.is_finite() && *cap > 0.0)
        .unwrap_or(DEFAULT_FORMULA_CAP);

    let evaluated = rules
        .formula
        .as_deref()
        .filter(|source| !source.trim().is_empty())
        .and_then(|source| {
            let vars = [
                ("perf5y", perf5y),
                ("baseAmount", base_amount),
                ("estimatedAmount", inputs.estimated_amount.unwrap_or(0.0)),
                ("ratio", ratio),
                ("maxScore", max_score),
            ];
            match expr::evaluate(source, &vars) {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!(formula = source, error = %err, "formula failed; using ratio * cap");
                    None
                }
            }
        });

    (evaluated.unwrap_or(ratio * max_score), max_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::formula::{Rounding, RoundingMethod, VariantCondition};

    fn bands() -> Vec<RatioBand> {
        vec![
            RatioBand {
                min_ratio: 1.0,
                score: 13.0,
            },
            RatioBand {
                min_ratio: 0.0,
                score: 1.0,
            },
            RatioBand {
                min_ratio: 0.5,
                score: 8.0,
            },
        ]
    }

    fn band_rules() -> PerformanceRules {
        PerformanceRules {
            mode: PerformanceMode::RatioBands,
            thresholds: Some(bands()),
            ..Default::default()
        }
    }

    fn inputs(perf5y: f64, base_amount: f64) -> PerformanceInputs {
        PerformanceInputs {
            perf5y: Some(perf5y),
            base_amount: Some(base_amount),
            ..Default::default()
        }
    }

    #[test]
    fn ratio_bands_use_at_least_semantics() {
        let result = evaluate(&inputs(6e9, 10e9), &band_rules());
        assert!((result.ratio - 0.6).abs() < 1e-12);
        assert_eq!(result.score, 8.0);
        assert_eq!(result.mode, PerformanceMode::RatioBands);
        assert_eq!(result.max_score, 13.0);

        assert_eq!(evaluate(&inputs(10e9, 10e9), &band_rules()).score, 13.0);
        assert_eq!(evaluate(&inputs(1.0, 10e9), &band_rules()).score, 1.0);
    }

    #[test]
    fn zero_base_amount_means_zero_ratio() {
        let result = evaluate(&inputs(6e9, 0.0), &band_rules());
        assert_eq!(result.ratio, 0.0);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn manual_cap_never_shrinks_band_scores() {
        let mut rules = band_rules();
        rules.max_score = Some(5.0);
        let result = evaluate(&inputs(20e9, 10e9), &rules);
        assert_eq!(result.max_score, 13.0);
        assert_eq!(result.score, 13.0);
    }

    #[test]
    fn formula_mode_evaluates_expression_and_caps() {
        let rules = PerformanceRules {
            mode: PerformanceMode::Formula,
            formula: Some("perf5y / baseAmount * 15".to_string()),
            max_score: Some(15.0),
            rounding: Some(Rounding {
                method: RoundingMethod::Floor,
                digits: 2,
            }),
            ..Default::default()
        };
        let result = evaluate(&inputs(3e9, 7e9), &rules);
        assert!((result.raw - 6.428571428571429).abs() < 1e-9);
        assert_eq!(result.score, 6.42);

        let over = evaluate(&inputs(30e9, 7e9), &rules);
        assert!(over.raw > 15.0);
        assert_eq!(over.capped, 15.0);
        assert_eq!(over.score, 15.0);
    }

    #[test]
    fn broken_formula_falls_back_to_ratio_times_cap() {
        let rules = PerformanceRules {
            mode: PerformanceMode::Formula,
            formula: Some("perf5y * Math.min(1, 2)".to_string()),
            ..Default::default()
        };
        let result = evaluate(&inputs(5e9, 10e9), &rules);
        assert_eq!(result.max_score, DEFAULT_FORMULA_CAP);
        assert!((result.score - 6.5).abs() < 1e-9);
    }

    #[test]
    fn missing_formula_uses_fallback() {
        let result = evaluate(&inputs(5e9, 10e9), &PerformanceRules::default());
        assert!((result.raw - 6.5).abs() < 1e-9);
    }

    #[test]
    fn variant_overrides_by_file_type_and_amount() {
        let mut rules = PerformanceRules {
            mode: PerformanceMode::Formula,
            max_score: Some(13.0),
            ..Default::default()
        };
        rules.variants.push(PerformanceVariant {
            when: VariantCondition {
                file_types: vec!["Civil".to_string()],
                estimated_amount_lt: Some(5e9),
                estimated_amount_gte: None,
            },
            mode: Some(PerformanceMode::RatioBands),
            formula: None,
            thresholds: Some(bands()),
            max_score: None,
            rounding: None,
        });

        let mut matching = inputs(6e9, 10e9);
        matching.file_type = Some("civil".to_string());
        matching.estimated_amount = Some(4e9);
        assert_eq!(evaluate(&matching, &rules).mode, PerformanceMode::RatioBands);

        let mut too_large = matching.clone();
        too_large.estimated_amount = Some(5e9);
        assert_eq!(evaluate(&too_large, &rules).mode, PerformanceMode::Formula);

        let mut other_type = matching.clone();
        other_type.file_type = Some("electric".to_string());
        assert_eq!(evaluate(&other_type, &rules).mode, PerformanceMode::Formula);

        let mut no_amount = matching;
        no_amount.estimated_amount = None;
        assert_eq!(evaluate(&no_amount, &rules).mode, PerformanceMode::Formula);
    }
}
