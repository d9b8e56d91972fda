//! Rule documents: bundled defaults, user overrides and their merge.

pub mod merge;
pub mod store;

pub use merge::{merge_agencies, merge_tiers};
pub use store::{FormulaStore, ResolvedDocument};
