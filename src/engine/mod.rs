pub mod business_age;
pub mod credit;
pub mod expr;
pub mod management;
pub mod performance;
pub mod threshold;
pub mod tier;

use crate::types::formula::{FormulaDocument, RuleSet};
use crate::types::request::{EvaluateRequest, EvaluationInputs};
use crate::types::result::{
    AgencySummary, EvaluationError, EvaluationMeta, EvaluationResult, TierSummary,
};
use business_age::BusinessAge;
use chrono::NaiveDate;
use management::ManagementInputs;
use performance::PerformanceInputs;
use tracing::debug;

/// Scores one set of inputs against the agency tier selected by the bid
/// amount. Configuration problems come back as `ok: false` with an error
/// code; this never fails.
pub fn evaluate_scores(doc: &FormulaDocument, request: &EvaluateRequest) -> EvaluationResult {
    let Some(agency) = doc.find_agency(&request.agency_id) else {
        debug!(agency = %request.agency_id, "agency not found in formula document");
        return EvaluationResult::failure(
            EvaluationError::NoAgency,
            EvaluationMeta {
                effective_amount: request.amount,
                ..Default::default()
            },
        );
    };

    let selection = tier::select_tier(agency, request.amount);
    let Some(tier) = selection.tier else {
        return EvaluationResult::failure(
            EvaluationError::NoTier,
            EvaluationMeta {
                effective_amount: selection.effective_amount,
                ..Default::default()
            },
        );
    };

    let age = resolve_business_age(&request.inputs, request.evaluation_date);
    let mut result = score_with_rules(
        &tier.rules,
        &request.inputs,
        age,
        request.industry_avg.as_ref(),
    );
    result.agency = Some(AgencySummary {
        id: agency.id.clone(),
        name: agency.name.clone(),
    });
    result.tier = Some(TierSummary {
        min_amount: tier.min_amount,
        max_amount: tier.max_amount,
    });
    result.meta.effective_amount = selection.effective_amount;
    result
}

pub fn resolve_business_age(
    inputs: &EvaluationInputs,
    evaluation_date: Option<NaiveDate>,
) -> BusinessAge {
    inputs
        .biz_years
        .as_ref()
        .map(|raw| business_age::compute_years(raw, evaluation_date))
        .unwrap_or_default()
}

/// Runs both scorers for an already selected rule set.
pub fn score_with_rules(
    rules: &RuleSet,
    inputs: &EvaluationInputs,
    age: BusinessAge,
    industry_avg: Option<&crate::industry::IndustryAverage>,
) -> EvaluationResult {
    let management_inputs = ManagementInputs {
        debt_ratio: inputs.debt_ratio,
        current_ratio: inputs.current_ratio,
        biz_years: age.years,
        quality_eval: inputs.quality_eval,
        credit_grade: inputs.credit_grade.clone(),
    };
    let performance_inputs = PerformanceInputs {
        perf5y: inputs.perf5y,
        base_amount: inputs.base_amount,
        estimated_amount: inputs.estimated_amount,
        file_type: inputs.file_type.clone(),
    };

    EvaluationResult {
        ok: true,
        error: None,
        agency: None,
        tier: None,
        management: Some(management::evaluate(
            &management_inputs,
            &rules.management,
            industry_avg,
        )),
        performance: Some(performance::evaluate(
            &performance_inputs,
            &rules.performance,
        )),
        meta: EvaluationMeta {
            effective_amount: None,
            biz_years: age.years,
            biz_start_date: age.start_date,
            formula_fingerprint: None,
        },
    }
}
