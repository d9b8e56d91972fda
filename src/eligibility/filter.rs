use super::verdict::{determine, EligibilityContext, EligibilityVerdict};
use crate::engine::{self, credit};
use crate::industry::IndustryAverage;
use crate::types::candidate::{normalize_registration, Candidate, CandidateProfile};
use crate::types::config::FilterConfig;
use crate::types::formula::{EligibilityRules, RuleSet};
use crate::types::request::EvaluationInputs;
use crate::types::result::EvaluationResult;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

/// Scores a candidate for ranking and for the perfect-management check.
pub trait CandidateScorer {
    fn score(&self, profile: &CandidateProfile) -> EvaluationResult;
}

/// Scores candidates with one tier's rules, as selected for the bid amount.
#[derive(Debug, Clone)]
pub struct TierScorer<'a> {
    pub rules: &'a RuleSet,
    pub industry_avg: Option<IndustryAverage>,
    pub base_amount: Option<f64>,
    /// Bid attributes that select performance variants.
    pub estimated_amount: Option<f64>,
    pub file_type: Option<String>,
    pub evaluation_date: Option<NaiveDate>,
}

impl CandidateScorer for TierScorer<'_> {
    fn score(&self, profile: &CandidateProfile) -> EvaluationResult {
        let mut inputs = EvaluationInputs::from_profile(profile, self.base_amount);
        inputs.estimated_amount = self.estimated_amount;
        inputs.file_type = self.file_type.clone();
        let age = engine::resolve_business_age(&inputs, self.evaluation_date);
        engine::score_with_rules(self.rules, &inputs, age, self.industry_avg.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    /// Registration numbers or company names dropped before anything else.
    pub always_exclude: Vec<String>,
    /// Drop companies that could bid alone from the partner listing.
    pub exclude_single_bid_eligible: bool,
    pub min_credit_grade: Option<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            always_exclude: Vec::new(),
            exclude_single_bid_eligible: true,
            min_credit_grade: None,
        }
    }
}

impl From<&FilterConfig> for FilterOptions {
    fn from(config: &FilterConfig) -> Self {
        Self {
            always_exclude: config.always_exclude.clone(),
            exclude_single_bid_eligible: config.exclude_single_bid_eligible,
            min_credit_grade: config.min_credit_grade.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExclusionReason {
    AlwaysExcluded,
    CreditBelowMinimum,
    SingleBidEligible,
}

impl ExclusionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlwaysExcluded => "always-excluded",
            Self::CreditBelowMinimum => "credit-below-minimum",
            Self::SingleBidEligible => "single-bid-eligible",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeptCandidate {
    pub profile: CandidateProfile,
    pub verdict: EligibilityVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationResult>,
}

impl KeptCandidate {
    pub fn management_score(&self) -> Option<f64> {
        self.evaluation
            .as_ref()
            .and_then(|result| result.management.as_ref())
            .map(|management| management.score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedCandidate {
    pub profile: CandidateProfile,
    pub reason: ExclusionReason,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOutcome {
    pub kept: Vec<KeptCandidate>,
    pub excluded: Vec<ExcludedCandidate>,
}

fn compact(text: &str) -> String {
    text.chars().filter(|ch| !ch.is_whitespace()).collect()
}

fn is_always_excluded(profile: &CandidateProfile, always_exclude: &[String]) -> bool {
    let registration = profile.normalized_registration();
    let name = profile.name.as_deref().map(compact);

    always_exclude.iter().any(|entry| {
        let by_registration = normalize_registration(entry);
        let registration_hit = !by_registration.is_empty()
            && registration.as_deref() == Some(by_registration.as_str());
        let name_hit = name.as_deref().is_some_and(|name| {
            let entry = compact(entry);
            !entry.is_empty() && name == entry
        });
        registration_hit || name_hit
    })
}

fn credit_shortfall(profile: &CandidateProfile, minimum: &str) -> Option<String> {
    match profile.credit_grade.as_deref() {
        Some(grade) if credit::meets_minimum(grade, minimum) => None,
        Some(grade) => Some(format!(
            "credit grade {} is below the minimum {minimum}",
            credit::extract_grade(grade)
        )),
        None => Some(format!("no credit grade; minimum is {minimum}")),
    }
}

fn rank_order(a: &KeptCandidate, b: &KeptCandidate) -> Ordering {
    let score = |candidate: &KeptCandidate| candidate.management_score().unwrap_or(f64::MIN);
    let rating = |candidate: &KeptCandidate| candidate.profile.capacity_rating.unwrap_or(f64::MIN);
    score(b)
        .total_cmp(&score(a))
        .then_with(|| rating(b).total_cmp(&rating(a)))
}

/// Bulk filtering for partner listings.
///
/// Candidates on the exclusion list go first, then those below the minimum
/// credit grade, then (optionally) those eligible to bid alone. The rest are
/// ranked by management score, then capacity rating, both descending.
pub fn filter_candidates(
    candidates: &[Candidate],
    ctx: &EligibilityContext,
    rules: EligibilityRules,
    options: &FilterOptions,
    scorer: Option<&dyn CandidateScorer>,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    let minimum = options
        .min_credit_grade
        .as_deref()
        .map(str::trim)
        .filter(|grade| !grade.is_empty());

    for candidate in candidates {
        let profile = candidate.profile();

        if is_always_excluded(&profile, &options.always_exclude) {
            debug!(candidate = %profile.display_name(), "on exclusion list");
            outcome.excluded.push(ExcludedCandidate {
                profile,
                reason: ExclusionReason::AlwaysExcluded,
                detail: "listed in always_exclude".to_string(),
            });
            continue;
        }

        if let Some(detail) = minimum.and_then(|minimum| credit_shortfall(&profile, minimum)) {
            debug!(candidate = %profile.display_name(), %detail, "credit below minimum");
            outcome.excluded.push(ExcludedCandidate {
                profile,
                reason: ExclusionReason::CreditBelowMinimum,
                detail,
            });
            continue;
        }

        let evaluation = scorer.map(|scorer| scorer.score(&profile));
        let verdict = determine(
            &profile,
            ctx,
            rules,
            evaluation.as_ref().and_then(|result| result.management.as_ref()),
        );

        if verdict.ok && options.exclude_single_bid_eligible {
            debug!(candidate = %profile.display_name(), "eligible to bid alone");
            outcome.excluded.push(ExcludedCandidate {
                profile,
                reason: ExclusionReason::SingleBidEligible,
                detail: "meets every single-bid condition".to_string(),
            });
            continue;
        }

        outcome.kept.push(KeptCandidate {
            profile,
            verdict,
            evaluation,
        });
    }

    outcome.kept.sort_by(rank_order);
    info!(
        kept = outcome.kept.len(),
        excluded = outcome.excluded.len(),
        "candidate filtering finished"
    );
    outcome
}
