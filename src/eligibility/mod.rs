pub mod filter;
pub mod verdict;

pub use filter::{
    filter_candidates, CandidateScorer, ExcludedCandidate, ExclusionReason, FilterOptions,
    FilterOutcome, KeptCandidate, TierScorer,
};
pub use verdict::{determine, EligibilityContext, EligibilityFacts, EligibilityVerdict};
