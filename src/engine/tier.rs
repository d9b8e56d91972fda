use crate::types::formula::{Agency, Tier};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierSelection<'a> {
    pub tier: Option<&'a Tier>,
    pub effective_amount: Option<f64>,
}

/// Picks the tier whose `[min, max)` range holds `amount`.
///
/// Without a usable amount the agency's `default_tier_index` applies and its
/// `min_amount` becomes the effective amount; otherwise, and whenever no
/// range matches, the highest tier is used.
pub fn select_tier(agency: &Agency, amount: Option<f64>) -> TierSelection<'_> {
    let tiers = agency.sorted_tiers();
    let Some(highest) = tiers.last().copied() else {
        return TierSelection {
            tier: None,
            effective_amount: amount,
        };
    };

    let usable_amount = amount.filter(|value| value.is_finite() && *value > 0.0);

    if let Some(value) = usable_amount {
        if let Some(tier) = tiers.iter().copied().find(|tier| tier.contains(value)) {
            return TierSelection {
                tier: Some(tier),
                effective_amount: amount,
            };
        }
        debug!(agency = %agency.id, amount = value, "no tier range matched; using highest tier");
    } else if let Some(index) = agency.default_tier_index {
        let tier = tiers.get(index).copied().unwrap_or(highest);
        debug!(agency = %agency.id, index, "no bid amount; using default tier");
        return TierSelection {
            tier: Some(tier),
            effective_amount: Some(tier.min_amount),
        };
    }

    TierSelection {
        tier: Some(highest),
        effective_amount: amount,
    }
}
