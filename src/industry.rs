//! Per-trade industry averages used as ratio denominators.

use crate::coerce::lenient_number;
use crate::error::{BidError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const BUILTIN_AVERAGES: &str = include_str!("../data/industry_averages.json");

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryAverage {
    #[serde(default, deserialize_with = "lenient_number")]
    pub debt_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub current_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct IndustryAverages {
    by_trade: BTreeMap<String, IndustryAverage>,
}

impl IndustryAverages {
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_AVERAGES)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BidError::PathNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn get(&self, trade: &str) -> Option<IndustryAverage> {
        let key = trade.trim().to_lowercase();
        self.by_trade
            .iter()
            .find(|(code, _)| code.to_lowercase() == key)
            .map(|(_, average)| *average)
    }

    pub fn trades(&self) -> impl Iterator<Item = &str> {
        self.by_trade.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_parses_and_has_known_trades() {
        let averages = IndustryAverages::builtin().expect("builtin table should parse");
        let building = averages.get("BUILDING").expect("building trade exists");
        assert!(building.debt_ratio.unwrap_or_default() > 0.0);
        assert!(building.current_ratio.unwrap_or_default() > 0.0);
        assert!(averages.trades().count() >= 3);
    }

    #[test]
    fn unknown_trade_is_none() {
        let averages = IndustryAverages::from_json(r#"{"civil": {"debtRatio": 100}}"#)
            .expect("table should parse");
        assert!(averages.get("electric").is_none());
        assert_eq!(
            averages.get("civil").and_then(|avg| avg.current_ratio),
            None
        );
    }
}
