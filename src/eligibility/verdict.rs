use crate::types::candidate::CandidateProfile;
use crate::types::formula::EligibilityRules;
use crate::types::result::ManagementResult;
use serde::Serialize;

/// Bid-level thresholds a single company is measured against.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EligibilityContext {
    /// Minimum capacity rating; `<= 0` or absent means not applicable.
    pub entry_amount: Option<f64>,
    /// Minimum five-year performance; `<= 0` or absent means not applicable.
    pub base_amount: Option<f64>,
    /// Regions allowed for the bid; empty allows any region.
    pub duty_regions: Vec<String>,
    /// Caller-supplied performance bar for agencies that use one instead of
    /// the base amount.
    pub performance_target: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityFacts {
    pub sipyung: Option<f64>,
    pub perf5y: Option<f64>,
    pub entry: Option<f64>,
    pub base: Option<f64>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityVerdict {
    pub ok: bool,
    pub money_ok: Option<bool>,
    pub perf_ok: Option<bool>,
    pub region_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_ok: Option<bool>,
    pub reasons: Vec<String>,
    pub facts: EligibilityFacts,
}

fn applicable(amount: Option<f64>) -> Option<f64> {
    amount.filter(|value| value.is_finite() && *value > 0.0)
}

/// Short province names and the official spellings that mean the same place.
const PROVINCES: [(&str, &[&str]); 17] = [
    ("서울", &["서울특별시", "서울시"]),
    ("부산", &["부산광역시", "부산시"]),
    ("대구", &["대구광역시", "대구시"]),
    ("인천", &["인천광역시", "인천시"]),
    ("광주", &["광주광역시"]),
    ("대전", &["대전광역시", "대전시"]),
    ("울산", &["울산광역시", "울산시"]),
    ("세종", &["세종특별자치시", "세종시"]),
    ("경기", &["경기도"]),
    ("강원", &["강원도", "강원특별자치도"]),
    ("충북", &["충청북도"]),
    ("충남", &["충청남도"]),
    ("전북", &["전라북도", "전북특별자치도"]),
    ("전남", &["전라남도"]),
    ("경북", &["경상북도"]),
    ("경남", &["경상남도"]),
    ("제주", &["제주도", "제주특별자치도"]),
];

fn province(token: &str) -> Option<&'static str> {
    PROVINCES
        .iter()
        .find(|(short, aliases)| *short == token || aliases.contains(&token))
        .map(|(short, _)| *short)
}

/// `수원시` and `수원` name the same district.
fn district(token: &str) -> String {
    match token.strip_suffix(|ch: char| matches!(ch, '시' | '군' | '구')) {
        Some(stem) if stem.chars().count() > 1 => stem.to_string(),
        _ => token.to_string(),
    }
}

/// Region name split into canonical parts, province first.
fn region_parts(text: &str) -> Vec<String> {
    text.split_whitespace()
        .enumerate()
        .map(|(index, token)| {
            let token = token.to_lowercase();
            match (index, province(&token)) {
                (0, Some(short)) => short.to_string(),
                _ => district(&token),
            }
        })
        .collect()
}

/// A duty region matches when its parts lead the candidate's region part by
/// part, so `경기` covers `경기도 수원시` but `광주` does not.
pub fn region_matches(region: &str, duty_regions: &[String]) -> bool {
    let region = region_parts(region);
    if region.is_empty() {
        return false;
    }
    duty_regions
        .iter()
        .map(|duty| region_parts(duty))
        .filter(|duty| !duty.is_empty())
        .any(|duty| region.starts_with(&duty))
}

pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Single-bid eligibility of one candidate.
///
/// A condition that does not apply (`None`) never makes the candidate
/// ineligible. `management` is only consulted when the agency requires a
/// perfect management score.
pub fn determine(
    profile: &CandidateProfile,
    ctx: &EligibilityContext,
    rules: EligibilityRules,
    management: Option<&ManagementResult>,
) -> EligibilityVerdict {
    let entry = applicable(ctx.entry_amount);
    let base = if rules.use_caller_performance_target {
        applicable(ctx.performance_target).or_else(|| applicable(ctx.base_amount))
    } else {
        applicable(ctx.base_amount)
    };

    let sipyung = profile.capacity_rating;
    let perf5y = profile.perf5y;
    let mut reasons = Vec::new();

    let money_ok = entry.map(|entry| {
        let ok = sipyung.unwrap_or(0.0) >= entry;
        if !ok {
            reasons.push(format!(
                "capacity rating {} is below the entry amount {}",
                sipyung.map_or_else(|| "(missing)".to_string(), format_amount),
                format_amount(entry)
            ));
        }
        ok
    });

    let perf_ok = base.map(|base| {
        let ok = perf5y.unwrap_or(0.0) >= base;
        if !ok {
            let bar = if rules.use_caller_performance_target {
                "performance target"
            } else {
                "base amount"
            };
            reasons.push(format!(
                "5-year performance {} is below the {bar} {}",
                perf5y.map_or_else(|| "(missing)".to_string(), format_amount),
                format_amount(base)
            ));
        }
        ok
    });

    let duty_regions: Vec<String> = ctx
        .duty_regions
        .iter()
        .map(|region| region.trim().to_string())
        .filter(|region| !region.is_empty())
        .collect();
    let region_ok = duty_regions.is_empty()
        || profile
            .region
            .as_deref()
            .is_some_and(|region| region_matches(region, &duty_regions));
    if !region_ok {
        reasons.push(format!(
            "region {} is outside the duty regions ({})",
            profile.region.as_deref().unwrap_or("(missing)"),
            duty_regions.join(", ")
        ));
    }

    let management_ok = rules.require_perfect_management.then(|| {
        let ok = management.is_some_and(|result| result.meta.is_perfect);
        if !ok {
            match management {
                Some(result) => reasons.push(format!(
                    "management score {} is short of the maximum {}",
                    result.score, result.meta.max_score
                )),
                None => reasons.push("management score was not evaluated".to_string()),
            }
        }
        ok
    });

    let ok = money_ok != Some(false)
        && perf_ok != Some(false)
        && region_ok
        && management_ok != Some(false);

    EligibilityVerdict {
        ok,
        money_ok,
        perf_ok,
        region_ok,
        management_ok,
        reasons,
        facts: EligibilityFacts {
            sipyung,
            perf5y,
            entry,
            base,
            region: profile.region.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::result::{ChosenMethod, ManagementMeta};

    fn profile() -> CandidateProfile {
        CandidateProfile {
            name: Some("한빛건설".to_string()),
            region: Some("경기도 수원시".to_string()),
            capacity_rating: Some(12e9),
            perf5y: Some(8e9),
            ..Default::default()
        }
    }

    fn management(score: f64, max_score: f64) -> ManagementResult {
        ManagementResult {
            score,
            chosen: ChosenMethod::Composite,
            composite: None,
            credit: None,
            meta: ManagementMeta {
                max_score,
                is_perfect: (score - max_score).abs() <= 1e-6,
            },
        }
    }

    #[test]
    fn missing_entry_amount_is_not_applicable() {
        let ctx = EligibilityContext {
            entry_amount: Some(0.0),
            ..Default::default()
        };
        let verdict = determine(&profile(), &ctx, EligibilityRules::default(), None);
        assert_eq!(verdict.money_ok, None);
        assert_eq!(verdict.perf_ok, None);
        assert!(verdict.region_ok);
        assert!(verdict.ok);
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn failing_conditions_produce_reasons() {
        let ctx = EligibilityContext {
            entry_amount: Some(15e9),
            base_amount: Some(10e9),
            duty_regions: vec!["서울".to_string()],
            performance_target: None,
        };
        let verdict = determine(&profile(), &ctx, EligibilityRules::default(), None);
        assert!(!verdict.ok);
        assert_eq!(verdict.money_ok, Some(false));
        assert_eq!(verdict.perf_ok, Some(false));
        assert!(!verdict.region_ok);
        assert_eq!(verdict.reasons.len(), 3);
        assert!(verdict.reasons[0].contains("15,000,000,000"));
        assert_eq!(verdict.facts.entry, Some(15e9));
    }

    #[test]
    fn region_matches_whole_names_only() {
        let duty = |names: &[&str]| {
            names
                .iter()
                .map(|name| name.to_string())
                .collect::<Vec<_>>()
        };

        assert!(region_matches("서울특별시", &duty(&["서울"])));
        assert!(region_matches("서울", &duty(&["서울특별시"])));
        assert!(region_matches("경기도 광주시", &duty(&["경기 광주"])));
        assert!(region_matches("경기도  수원시", &duty(&["경기도"])));

        assert!(!region_matches("경기도 광주시", &duty(&["광주"])));
        assert!(!region_matches("광주광역시", &duty(&["경기도 광주시"])));
        assert!(!region_matches("경", &duty(&["경기", "경북"])));
        assert!(!region_matches(" ", &duty(&["서울"])));
    }

    #[test]
    fn duty_region_gwangju_rejects_gyeonggi_gwangju() {
        let mut candidate = profile();
        candidate.region = Some("경기도 광주시".to_string());
        let ctx = EligibilityContext {
            duty_regions: vec!["광주".to_string()],
            ..Default::default()
        };
        let verdict = determine(&candidate, &ctx, EligibilityRules::default(), None);
        assert!(!verdict.region_ok);
        assert!(!verdict.ok);
        assert!(verdict.reasons[0].contains("경기도 광주시"));
    }

    #[test]
    fn missing_capacity_rating_fails_entry_amount() {
        let mut candidate = profile();
        candidate.capacity_rating = None;
        let ctx = EligibilityContext {
            entry_amount: Some(1e9),
            ..Default::default()
        };
        let verdict = determine(&candidate, &ctx, EligibilityRules::default(), None);
        assert_eq!(verdict.money_ok, Some(false));
        assert!(!verdict.ok);
        assert_eq!(verdict.facts.sipyung, None);
        assert_eq!(
            verdict.reasons,
            vec!["capacity rating (missing) is below the entry amount 1,000,000,000"]
        );
    }

    #[test]
    fn province_prefix_covers_districts() {
        let ctx = EligibilityContext {
            entry_amount: Some(10e9),
            base_amount: Some(5e9),
            duty_regions: vec!["경기".to_string(), " ".to_string()],
            ..Default::default()
        };
        let verdict = determine(&profile(), &ctx, EligibilityRules::default(), None);
        assert!(verdict.ok);
        assert_eq!(verdict.money_ok, Some(true));
        assert_eq!(verdict.perf_ok, Some(true));
    }

    #[test]
    fn caller_target_replaces_base_amount() {
        let ctx = EligibilityContext {
            base_amount: Some(5e9),
            performance_target: Some(9e9),
            ..Default::default()
        };
        let rules = EligibilityRules {
            use_caller_performance_target: true,
            ..Default::default()
        };
        let verdict = determine(&profile(), &ctx, rules, None);
        assert_eq!(verdict.perf_ok, Some(false));
        assert_eq!(verdict.facts.base, Some(9e9));
        assert!(verdict.reasons[0].contains("performance target"));

        let default_rules = determine(&profile(), &ctx, EligibilityRules::default(), None);
        assert_eq!(default_rules.perf_ok, Some(true));
    }

    #[test]
    fn perfect_management_requirement() {
        let rules = EligibilityRules {
            require_perfect_management: true,
            ..Default::default()
        };
        let ctx = EligibilityContext::default();

        let perfect = determine(&profile(), &ctx, rules, Some(&management(15.0, 15.0)));
        assert!(perfect.ok);
        assert_eq!(perfect.management_ok, Some(true));

        let short = determine(&profile(), &ctx, rules, Some(&management(14.5, 15.0)));
        assert!(!short.ok);
        assert_eq!(short.reasons.len(), 1);

        let unscored = determine(&profile(), &ctx, rules, None);
        assert_eq!(unscored.management_ok, Some(false));
    }

    #[test]
    fn amounts_format_with_separators() {
        assert_eq!(format_amount(3_000_000_000.0), "3,000,000,000");
        assert_eq!(format_amount(999.4), "999");
        assert_eq!(format_amount(-1234.0), "-1,234");
    }
}
