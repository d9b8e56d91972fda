use super::{CandidateCheck, FormulaListing};
use crate::eligibility::verdict::format_amount;
use crate::eligibility::{EligibilityVerdict, FilterOutcome};
use crate::types::result::{ChosenMethod, EvaluationResult};

fn amount(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), format_amount)
}

fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "pass",
        Some(false) => "fail",
        None => "n/a",
    }
}

fn chosen(method: ChosenMethod) -> &'static str {
    match method {
        ChosenMethod::Composite => "composite",
        ChosenMethod::Credit => "credit",
        ChosenMethod::None => "none",
    }
}

fn push_scores(output: &mut String, result: &EvaluationResult) {
    if let Some(error) = result.error {
        output.push_str(&format!("Error: {}\n\n", error.as_str()));
        return;
    }

    if let Some(agency) = &result.agency {
        output.push_str(&format!("Agency: {} ({})\n", agency.name, agency.id));
    }
    if let Some(tier) = &result.tier {
        output.push_str(&format!(
            "Tier: {} .. {}\n",
            format_amount(tier.min_amount),
            tier.max_amount
                .filter(|max| *max > 0.0)
                .map_or_else(|| "open".to_string(), format_amount)
        ));
    }
    output.push_str(&format!(
        "Effective amount: {}\n\n",
        amount(result.meta.effective_amount)
    ));

    if let Some(management) = &result.management {
        output.push_str("## Management\n\n");
        output.push_str(&format!(
            "- score: {} / {} ({}{})\n",
            management.score,
            management.meta.max_score,
            chosen(management.chosen),
            if management.meta.is_perfect {
                ", perfect"
            } else {
                ""
            }
        ));
        if let Some(composite) = &management.composite {
            output.push_str(&format!(
                "- composite {}: debt {} + current {} + age {}",
                composite.score,
                composite.debt_score,
                composite.current_score,
                composite.biz_years_score
            ));
            match composite.quality_score {
                Some(quality) => output.push_str(&format!(" + quality {quality}\n")),
                None => output.push_str(" (quality excluded)\n"),
            }
        }
        if let Some(credit) = &management.credit {
            output.push_str(&format!(
                "- credit {}: grade {}\n",
                credit.score,
                credit.grade.as_deref().unwrap_or("-")
            ));
        }
        output.push('\n');
    }

    if let Some(performance) = &result.performance {
        output.push_str("## Performance\n\n");
        output.push_str(&format!(
            "- score: {} / {} ({:?}, ratio {:.4})\n\n",
            performance.score, performance.max_score, performance.mode, performance.ratio
        ));
    }

    if let Some(years) = result.meta.biz_years {
        output.push_str(&format!("Business years: {years}\n"));
    }
    output.push_str(&format!("Total: {}\n", result.total_score()));
}

pub fn evaluation(result: &EvaluationResult) -> String {
    let mut output = String::new();
    output.push_str("# Evaluation\n\n");
    push_scores(&mut output, result);
    output
}

fn push_verdict(output: &mut String, verdict: &EligibilityVerdict) {
    output.push_str(&format!(
        "- single bid: {}\n- capacity: {} (rating {}, entry {})\n- performance: {} (5y {}, bar {})\n- region: {}\n",
        if verdict.ok { "eligible" } else { "not eligible" },
        flag(verdict.money_ok),
        amount(verdict.facts.sipyung),
        amount(verdict.facts.entry),
        flag(verdict.perf_ok),
        amount(verdict.facts.perf5y),
        amount(verdict.facts.base),
        if verdict.region_ok { "pass" } else { "fail" },
    ));
    if verdict.management_ok.is_some() {
        output.push_str(&format!("- management: {}\n", flag(verdict.management_ok)));
    }
    for reason in &verdict.reasons {
        output.push_str(&format!("  - {reason}\n"));
    }
}

pub fn candidate_check(check: &CandidateCheck) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", check.profile.display_name()));
    push_scores(&mut output, &check.evaluation);
    if let Some(verdict) = &check.verdict {
        output.push_str("\n## Eligibility\n\n");
        push_verdict(&mut output, verdict);
    }
    output
}

pub fn filter_outcome(outcome: &FilterOutcome) -> String {
    let mut output = String::new();
    output.push_str("# Candidates\n\n");

    output.push_str("## Ranked\n\n");
    if outcome.kept.is_empty() {
        output.push_str("- none\n\n");
    } else {
        for (index, kept) in outcome.kept.iter().enumerate() {
            let score = kept
                .management_score()
                .map_or_else(|| "-".to_string(), |score| score.to_string());
            output.push_str(&format!(
                "{}. {} (management {}, rating {})\n",
                index + 1,
                kept.profile.display_name(),
                score,
                amount(kept.profile.capacity_rating)
            ));
            for reason in &kept.verdict.reasons {
                output.push_str(&format!("   - {reason}\n"));
            }
        }
        output.push('\n');
    }

    output.push_str("## Excluded\n\n");
    if outcome.excluded.is_empty() {
        output.push_str("- none\n");
    } else {
        for excluded in &outcome.excluded {
            output.push_str(&format!(
                "- {} [{}]: {}\n",
                excluded.profile.display_name(),
                excluded.reason.as_str(),
                excluded.detail
            ));
        }
    }

    output
}

pub fn formula_listing(listing: &FormulaListing) -> String {
    let mut output = String::new();
    output.push_str("# Formulas\n\n");
    output.push_str(&format!(
        "Version: {}\nFingerprint: {}\nOverrides: {}\n\n",
        listing.version,
        listing.fingerprint,
        if listing.overrides_applied { "applied" } else { "none" }
    ));

    for agency in &listing.agencies {
        output.push_str(&format!("## {} ({})\n\n", agency.name, agency.id));
        if agency.require_perfect_management {
            output.push_str("- requires a perfect management score\n");
        }
        if agency.use_caller_performance_target {
            output.push_str("- uses the caller's performance target\n");
        }
        for tier in &agency.tiers {
            output.push_str(&format!(
                "- {} .. {}: {} [{:?}]{}, performance {:?}",
                format_amount(tier.min_amount),
                tier.max_amount
                    .filter(|max| *max > 0.0)
                    .map_or_else(|| "open".to_string(), format_amount),
                tier.methods.join("+"),
                tier.method_selection,
                if tier.include_quality { "" } else { " no quality" },
                tier.performance_mode
            ));
            if tier.performance_variants > 0 {
                output.push_str(&format!(" ({} variants)", tier.performance_variants));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::{EligibilityFacts, ExcludedCandidate, ExclusionReason, KeptCandidate};
    use crate::types::candidate::CandidateProfile;
    use crate::types::result::{EvaluationError, EvaluationMeta};

    fn verdict(ok: bool) -> EligibilityVerdict {
        EligibilityVerdict {
            ok,
            money_ok: Some(ok),
            perf_ok: None,
            region_ok: true,
            management_ok: None,
            reasons: if ok {
                vec![]
            } else {
                vec!["capacity rating 1 is below the entry amount 2".to_string()]
            },
            facts: EligibilityFacts::default(),
        }
    }

    fn profile(name: &str) -> CandidateProfile {
        CandidateProfile {
            name: Some(name.to_string()),
            capacity_rating: Some(1_500_000.0),
            ..Default::default()
        }
    }

    #[test]
    fn failed_evaluation_shows_error_code() {
        let result = EvaluationResult::failure(EvaluationError::NoAgency, EvaluationMeta::default());
        let rendered = evaluation(&result);
        assert!(rendered.contains("# Evaluation"));
        assert!(rendered.contains("Error: NO_AGENCY"));
    }

    #[test]
    fn filter_outcome_lists_ranked_and_excluded() {
        let outcome = FilterOutcome {
            kept: vec![KeptCandidate {
                profile: profile("가나건설"),
                verdict: verdict(false),
                evaluation: None,
            }],
            excluded: vec![ExcludedCandidate {
                profile: profile("다라건설"),
                reason: ExclusionReason::SingleBidEligible,
                detail: "meets every single-bid condition".to_string(),
            }],
        };
        let rendered = filter_outcome(&outcome);
        assert!(rendered.contains("## Ranked"));
        assert!(rendered.contains("1. 가나건설 (management -, rating 1,500,000)"));
        assert!(rendered.contains("below the entry amount"));
        assert!(rendered.contains("- 다라건설 [single-bid-eligible]"));
    }
}
