pub mod candidates;
pub mod coerce;
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod formula;
pub mod industry;
pub mod report;
pub mod telemetry;
pub mod types;

pub use engine::evaluate_scores;
pub use error::{BidError, Result};
pub use formula::FormulaStore;
