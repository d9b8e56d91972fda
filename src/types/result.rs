use crate::types::formula::PerformanceMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationError {
    NoAgency,
    NoTier,
}

impl EvaluationError {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoAgency => "NO_AGENCY",
            Self::NoTier => "NO_TIER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EvaluationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency: Option<AgencySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<TierSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management: Option<ManagementResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceResult>,
    pub meta: EvaluationMeta,
}

impl EvaluationResult {
    pub fn failure(error: EvaluationError, meta: EvaluationMeta) -> Self {
        Self {
            ok: false,
            error: Some(error),
            agency: None,
            tier: None,
            management: None,
            performance: None,
            meta,
        }
    }

    /// Management plus performance, the figure candidates are ranked by.
    pub fn total_score(&self) -> f64 {
        self.management.as_ref().map_or(0.0, |m| m.score)
            + self.performance.as_ref().map_or(0.0, |p| p.score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencySummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSummary {
    pub min_amount: f64,
    pub max_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMeta {
    pub effective_amount: Option<f64>,
    pub biz_years: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biz_start_date: Option<chrono::NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula_fingerprint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChosenMethod {
    Composite,
    Credit,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementResult {
    pub score: f64,
    pub chosen: ChosenMethod,
    pub composite: Option<CompositeBreakdown>,
    pub credit: Option<CreditBreakdown>,
    pub meta: ManagementMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeBreakdown {
    pub score: f64,
    pub debt_score: f64,
    pub current_score: f64,
    pub biz_years_score: f64,
    pub quality_score: Option<f64>,
    pub debt_norm: Option<f64>,
    pub current_norm: Option<f64>,
    pub max_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBreakdown {
    pub grade: Option<String>,
    pub score: f64,
    pub max_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementMeta {
    pub max_score: f64,
    pub is_perfect: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResult {
    pub score: f64,
    pub raw: f64,
    pub capped: f64,
    pub mode: PerformanceMode,
    pub ratio: f64,
    pub max_score: f64,
}
