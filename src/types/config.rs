use crate::engine::credit;
use crate::error::BidError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidConfig {
    #[serde(default)]
    pub formulas: FormulasConfig,
    #[serde(default)]
    pub industry: IndustryConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormulasConfig {
    /// Replaces the built-in defaults document.
    pub defaults: Option<PathBuf>,
    pub overrides: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndustryConfig {
    pub averages: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluationConfig {
    pub default_agency: Option<String>,
    pub default_trade: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub always_exclude: Vec<String>,
    #[serde(default = "default_exclude_single_bid")]
    pub exclude_single_bid_eligible: bool,
    pub min_credit_grade: Option<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            always_exclude: Vec::new(),
            exclude_single_bid_eligible: default_exclude_single_bid(),
            min_credit_grade: None,
        }
    }
}

fn default_exclude_single_bid() -> bool {
    true
}

impl BidConfig {
    pub fn validate(&self) -> Result<(), BidError> {
        if let Some(agency) = &self.evaluation.default_agency {
            if agency.trim().is_empty() {
                return Err(BidError::ConfigParse(
                    "evaluation.default_agency must not be empty".to_string(),
                ));
            }
        }

        let mut seen = HashSet::new();
        for entry in &self.filter.always_exclude {
            let normalized = entry.trim();
            if normalized.is_empty() {
                return Err(BidError::ConfigParse(
                    "filter.always_exclude entries must be non-empty names or registration numbers"
                        .to_string(),
                ));
            }
            if !seen.insert(normalized.to_string()) {
                warn!(entry = normalized, "duplicate filter.always_exclude entry");
            }
        }

        if let Some(grade) = &self.filter.min_credit_grade {
            let token = credit::extract_grade(grade);
            if credit::rank(&token).is_none() {
                return Err(BidError::ConfigParse(format!(
                    "filter.min_credit_grade is not a known credit grade: {grade}"
                )));
            }
        }

        Ok(())
    }
}
