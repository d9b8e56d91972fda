use super::{credit, threshold};
use crate::industry::IndustryAverage;
use crate::types::formula::{
    apply_rounding, CompositeMethod, CreditMethod, ManagementRules, MethodSelection, Threshold,
};
use crate::types::result::{
    ChosenMethod, CompositeBreakdown, CreditBreakdown, ManagementMeta, ManagementResult,
};

/// Quality evaluation assumed when a record has none.
pub const DEFAULT_QUALITY_EVAL: f64 = 85.0;
const PERFECT_EPSILON: f64 = 1e-6;

/// Resolved financial observations for one company.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ManagementInputs {
    pub debt_ratio: Option<f64>,
    pub current_ratio: Option<f64>,
    pub biz_years: Option<f64>,
    pub quality_eval: Option<f64>,
    pub credit_grade: Option<String>,
}

pub fn evaluate(
    inputs: &ManagementInputs,
    rules: &ManagementRules,
    industry_avg: Option<&IndustryAverage>,
) -> ManagementResult {
    let composite = rules
        .composite()
        .map(|method| composite_score(inputs, method, rules, industry_avg));
    let credit = rules.credit().map(|method| credit_score(inputs, method));

    let (score, chosen) = match (&composite, &credit, rules.method_selection) {
        (Some(c), Some(k), MethodSelection::Max) if k.score > c.score => {
            (k.score, ChosenMethod::Credit)
        }
        (Some(c), _, _) => (c.score, ChosenMethod::Composite),
        (None, Some(k), _) => (k.score, ChosenMethod::Credit),
        (None, None, _) => (0.0, ChosenMethod::None),
    };

    let max_score = composite
        .as_ref()
        .map_or(0.0, |c| c.max_score)
        .max(credit.as_ref().map_or(0.0, |k| k.max_score));
    let is_perfect = max_score > 0.0 && (score - max_score).abs() <= PERFECT_EPSILON;

    ManagementResult {
        score,
        chosen,
        composite,
        credit,
        meta: ManagementMeta {
            max_score,
            is_perfect,
        },
    }
}

fn normalize(value: f64, average: Option<f64>) -> f64 {
    match average {
        Some(avg) if avg.is_finite() && avg > 0.0 => value / avg,
        _ => value,
    }
}

fn composite_score(
    inputs: &ManagementInputs,
    method: &CompositeMethod,
    rules: &ManagementRules,
    industry_avg: Option<&IndustryAverage>,
) -> CompositeBreakdown {
    let components = &method.components;
    let include_quality = rules.include_quality_in_composite;

    let debt_norm = inputs
        .debt_ratio
        .map(|debt| normalize(debt, industry_avg.and_then(|avg| avg.debt_ratio)));
    let current_norm = inputs
        .current_ratio
        .map(|current| normalize(current, industry_avg.and_then(|avg| avg.current_ratio)));

    let lookup = |value: Option<f64>, table: &[Threshold]| {
        value
            .and_then(|v| threshold::evaluate(v, table))
            .unwrap_or(0.0)
    };

    let debt_score = lookup(debt_norm, &components.debt_ratio);
    let current_score = lookup(current_norm, &components.current_ratio);
    let biz_years_score = lookup(Some(inputs.biz_years.unwrap_or(0.0)), &components.biz_years);
    let quality_score = include_quality.then(|| {
        lookup(
            Some(inputs.quality_eval.unwrap_or(DEFAULT_QUALITY_EVAL)),
            &components.quality_eval,
        )
    });

    let raw = debt_score + current_score + biz_years_score + quality_score.unwrap_or(0.0);
    let score = apply_rounding(rules.rounding.as_ref(), raw);

    let max_score = method.max_score.unwrap_or_else(|| {
        let quality_max = if include_quality {
            threshold::max_score(&components.quality_eval)
        } else {
            0.0
        };
        threshold::max_score(&components.debt_ratio)
            + threshold::max_score(&components.current_ratio)
            + threshold::max_score(&components.biz_years)
            + quality_max
    });

    CompositeBreakdown {
        score,
        debt_score,
        current_score,
        biz_years_score,
        quality_score,
        debt_norm,
        current_norm,
        max_score,
    }
}

fn credit_score(inputs: &ManagementInputs, method: &CreditMethod) -> CreditBreakdown {
    let matched = inputs
        .credit_grade
        .as_deref()
        .and_then(|grade| credit::grade_score(grade, &method.grade_table));

    let max_score = method.max_score.unwrap_or_else(|| {
        method
            .grade_table
            .iter()
            .map(|entry| entry.score)
            .fold(0.0, f64::max)
    });

    CreditBreakdown {
        grade: matched
            .as_ref()
            .map(|(token, _)| token.clone())
            .or_else(|| inputs.credit_grade.as_deref().map(credit::extract_grade)),
        score: matched.map_or(0.0, |(_, score)| score),
        max_score,
    }
}
