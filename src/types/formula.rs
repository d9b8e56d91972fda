use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A versioned rule document: the shipped defaults or a user override.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormulaDocument {
    #[serde(default)]
    pub version: Value,
    #[serde(default)]
    pub agencies: Vec<Agency>,
}

impl FormulaDocument {
    pub fn find_agency(&self, id: &str) -> Option<&Agency> {
        self.agencies.iter().find(|agency| agency.matches_id(id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agency {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tiers: Vec<Tier>,
    /// Tier used when a bid arrives without an amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_tier_index: Option<usize>,
    #[serde(default)]
    pub eligibility: EligibilityRules,
}

impl Agency {
    pub fn matches_id(&self, id: &str) -> bool {
        self.id.trim().to_lowercase() == id.trim().to_lowercase()
    }

    /// Tiers ordered by `min_amount` ascending.
    pub fn sorted_tiers(&self) -> Vec<&Tier> {
        let mut tiers: Vec<&Tier> = self.tiers.iter().collect();
        tiers.sort_by(|a, b| a.min_amount.total_cmp(&b.min_amount));
        tiers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityRules {
    #[serde(default)]
    pub require_perfect_management: bool,
    #[serde(default)]
    pub use_caller_performance_target: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    #[serde(default)]
    pub min_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
    #[serde(default)]
    pub rules: RuleSet,
}

impl Tier {
    /// Half-open `[min, max)`; a missing or non-positive max is unbounded.
    pub fn contains(&self, amount: f64) -> bool {
        let below_max = match self.max_amount {
            Some(max) if max > 0.0 => amount < max,
            _ => true,
        };
        self.min_amount <= amount && below_max
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    #[serde(default)]
    pub management: ManagementRules,
    #[serde(default)]
    pub performance: PerformanceRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementRules {
    #[serde(default)]
    pub methods: Vec<ManagementMethod>,
    #[serde(default)]
    pub method_selection: MethodSelection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounding: Option<Rounding>,
    #[serde(default = "default_true")]
    pub include_quality_in_composite: bool,
}

impl Default for ManagementRules {
    fn default() -> Self {
        Self {
            methods: Vec::new(),
            method_selection: MethodSelection::default(),
            rounding: None,
            include_quality_in_composite: true,
        }
    }
}

impl ManagementRules {
    pub fn composite(&self) -> Option<&CompositeMethod> {
        self.methods.iter().find_map(|method| match method {
            ManagementMethod::Composite(composite) => Some(composite),
            ManagementMethod::Credit(_) => None,
        })
    }

    pub fn credit(&self) -> Option<&CreditMethod> {
        self.methods.iter().find_map(|method| match method {
            ManagementMethod::Credit(credit) => Some(credit),
            ManagementMethod::Composite(_) => None,
        })
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodSelection {
    Max,
    #[default]
    Composite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ManagementMethod {
    Composite(CompositeMethod),
    Credit(CreditMethod),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeMethod {
    #[serde(default)]
    pub components: CompositeComponents,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeComponents {
    #[serde(default)]
    pub debt_ratio: Vec<Threshold>,
    #[serde(default)]
    pub current_ratio: Vec<Threshold>,
    #[serde(default)]
    pub biz_years: Vec<Threshold>,
    #[serde(default)]
    pub quality_eval: Vec<Threshold>,
}

/// One band of a threshold table. Age tables spell the bounds
/// `gteYears`/`ltYears`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    #[serde(default, alias = "ltYears", skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    #[serde(default, alias = "gteYears", skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditMethod {
    #[serde(default)]
    pub grade_table: Vec<GradeEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
}

impl CreditMethod {
    /// The entry flagged `base`, i.e. the minimum acceptable grade.
    pub fn baseline_grade(&self) -> Option<&str> {
        self.grade_table
            .iter()
            .find(|entry| entry.base)
            .map(|entry| entry.grade.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub grade: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub base: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMethod {
    #[default]
    Round,
    Truncate,
    Floor,
    Ceil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rounding {
    #[serde(default)]
    pub method: RoundingMethod,
    #[serde(default)]
    pub digits: u32,
}

impl Rounding {
    pub fn apply(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let factor = 10f64.powi(self.digits.min(12) as i32);
        let scaled = value * factor;
        let rounded = match self.method {
            RoundingMethod::Round => scaled.round(),
            RoundingMethod::Truncate => scaled.trunc(),
            RoundingMethod::Floor => scaled.floor(),
            RoundingMethod::Ceil => scaled.ceil(),
        };
        rounded / factor
    }
}

pub fn apply_rounding(rounding: Option<&Rounding>, value: f64) -> f64 {
    rounding.map_or(value, |rounding| rounding.apply(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceMode {
    #[default]
    Formula,
    RatioBands,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRules {
    #[serde(default)]
    pub mode: PerformanceMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Vec<RatioBand>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<PerformanceVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounding: Option<Rounding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioBand {
    pub min_ratio: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceVariant {
    #[serde(default)]
    pub when: VariantCondition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<PerformanceMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Vec<RatioBand>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounding: Option<Rounding>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantCondition {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_amount_lt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_amount_gte: Option<f64>,
}
