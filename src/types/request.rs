use crate::coerce::lenient_number;
use crate::industry::IndustryAverage;
use crate::types::candidate::CandidateProfile;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Observations fed to the scorers. Every field is optional; absent values
/// default to zero or drop the component that needs them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationInputs {
    #[serde(default, deserialize_with = "lenient_number")]
    pub debt_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub current_ratio: Option<f64>,
    /// Years, a start date, or free text such as `"3년 6개월"`.
    #[serde(default)]
    pub biz_years: Option<Value>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub quality_eval: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub perf5y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub base_amount: Option<f64>,
    #[serde(default)]
    pub credit_grade: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub estimated_amount: Option<f64>,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl EvaluationInputs {
    pub fn from_profile(profile: &CandidateProfile, base_amount: Option<f64>) -> Self {
        Self {
            debt_ratio: profile.debt_ratio,
            current_ratio: profile.current_ratio,
            biz_years: profile.business_period.clone(),
            quality_eval: profile.quality_eval,
            perf5y: profile.perf5y,
            base_amount,
            credit_grade: profile.credit_grade.clone(),
            estimated_amount: None,
            file_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    pub agency_id: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub inputs: EvaluationInputs,
    #[serde(default)]
    pub industry_avg: Option<IndustryAverage>,
    #[serde(default)]
    pub use_defaults_only: bool,
    /// Anchor for business-age computation; today when absent.
    #[serde(default)]
    pub evaluation_date: Option<NaiveDate>,
}
