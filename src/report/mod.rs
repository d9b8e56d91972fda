pub mod json;
pub mod md;

use crate::eligibility::{EligibilityVerdict, FilterOutcome};
use crate::error::Result;
use crate::formula::ResolvedDocument;
use crate::types::candidate::CandidateProfile;
use crate::types::formula::{ManagementMethod, MethodSelection, PerformanceMode};
use crate::types::result::EvaluationResult;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
}

/// Anything the CLI prints: serializable for JSON, with a markdown view.
pub trait Render: Serialize {
    fn to_markdown(&self) -> String;
}

pub fn render<T: Render>(report: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(json::to_json(report)?),
        OutputFormat::Md => Ok(report.to_markdown()),
    }
}

impl Render for EvaluationResult {
    fn to_markdown(&self) -> String {
        md::evaluation(self)
    }
}

impl Render for FilterOutcome {
    fn to_markdown(&self) -> String {
        md::filter_outcome(self)
    }
}

/// Scores and single-bid verdict for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateCheck {
    pub profile: CandidateProfile,
    pub evaluation: EvaluationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<EligibilityVerdict>,
}

impl Render for CandidateCheck {
    fn to_markdown(&self) -> String {
        md::candidate_check(self)
    }
}

impl Render for Vec<CandidateCheck> {
    fn to_markdown(&self) -> String {
        if self.is_empty() {
            return "# Candidates\n\n- none\n".to_string();
        }
        self.iter()
            .map(md::candidate_check)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaListing {
    pub version: serde_json::Value,
    pub fingerprint: String,
    pub overrides_applied: bool,
    pub agencies: Vec<AgencyListing>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyListing {
    pub id: String,
    pub name: String,
    pub require_perfect_management: bool,
    pub use_caller_performance_target: bool,
    pub tiers: Vec<TierListing>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierListing {
    pub min_amount: f64,
    pub max_amount: Option<f64>,
    pub methods: Vec<&'static str>,
    pub method_selection: MethodSelection,
    pub include_quality: bool,
    pub performance_mode: PerformanceMode,
    pub performance_variants: usize,
}

impl FormulaListing {
    pub fn new(resolved: &ResolvedDocument, overrides_applied: bool) -> Self {
        let agencies = resolved
            .document
            .agencies
            .iter()
            .map(|agency| AgencyListing {
                id: agency.id.clone(),
                name: agency.name.clone(),
                require_perfect_management: agency.eligibility.require_perfect_management,
                use_caller_performance_target: agency.eligibility.use_caller_performance_target,
                tiers: agency
                    .sorted_tiers()
                    .into_iter()
                    .map(|tier| TierListing {
                        min_amount: tier.min_amount,
                        max_amount: tier.max_amount,
                        methods: tier
                            .rules
                            .management
                            .methods
                            .iter()
                            .map(|method| match method {
                                ManagementMethod::Composite(_) => "composite",
                                ManagementMethod::Credit(_) => "credit",
                            })
                            .collect(),
                        method_selection: tier.rules.management.method_selection,
                        include_quality: tier.rules.management.include_quality_in_composite,
                        performance_mode: tier.rules.performance.mode,
                        performance_variants: tier.rules.performance.variants.len(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            version: resolved.document.version.clone(),
            fingerprint: resolved.fingerprint.clone(),
            overrides_applied,
            agencies,
        }
    }
}

impl Render for FormulaListing {
    fn to_markdown(&self) -> String {
        md::formula_listing(self)
    }
}
