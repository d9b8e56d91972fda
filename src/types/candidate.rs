use crate::coerce::{parse_number, text_of};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Logical fields the engine reads from a candidate record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateField {
    Name,
    RegistrationNumber,
    Region,
    CapacityRating,
    Performance5y,
    DebtRatio,
    CurrentRatio,
    BusinessPeriod,
    CreditGrade,
    QualityEval,
}

/// Key spellings in priority order. Keys are compared with whitespace removed.
const FIELD_ALIASES: [(CandidateField, &[&str]); 10] = [
    (
        CandidateField::Name,
        &["업체명", "회사명", "상호", "name", "companyName"],
    ),
    (
        CandidateField::RegistrationNumber,
        &["사업자번호", "사업자등록번호", "bizNo", "registrationNumber"],
    ),
    (
        CandidateField::Region,
        &["대표지역", "지역", "소재지", "region"],
    ),
    (
        CandidateField::CapacityRating,
        &["시평", "시평액", "시공능력평가액", "시공능력", "sipyung", "capacity"],
    ),
    (
        CandidateField::Performance5y,
        &["5년실적", "5년간실적", "최근5년실적", "perf5y", "performance5y"],
    ),
    (CandidateField::DebtRatio, &["부채비율", "debtRatio"]),
    (CandidateField::CurrentRatio, &["유동비율", "currentRatio"]),
    (
        CandidateField::BusinessPeriod,
        &["영업기간", "업력", "설립일", "개업일", "bizYears"],
    ),
    (
        CandidateField::CreditGrade,
        &["신용평가", "신용등급", "creditGrade"],
    ),
    (CandidateField::QualityEval, &["품질평가", "qualityEval"]),
];

impl CandidateField {
    pub fn aliases(self) -> &'static [&'static str] {
        FIELD_ALIASES
            .iter()
            .find(|(field, _)| *field == self)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[])
    }
}

fn normalize_key(key: &str) -> String {
    key.chars().filter(|ch| !ch.is_whitespace()).collect()
}

/// An opaque candidate record as produced by spreadsheet ingestion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate {
    pub fields: Map<String, Value>,
}

impl Candidate {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// First non-placeholder value among the field's aliases.
    pub fn get(&self, field: CandidateField) -> Option<&Value> {
        field.aliases().iter().find_map(|alias| {
            self.fields
                .iter()
                .find(|(key, _)| normalize_key(key) == *alias)
                .map(|(_, value)| value)
                .filter(|value| text_of(value).is_some())
        })
    }

    /// Resolves every logical field once.
    pub fn profile(&self) -> CandidateProfile {
        let text = |field| self.get(field).and_then(text_of);
        let number = |field| self.get(field).and_then(parse_number);

        CandidateProfile {
            name: text(CandidateField::Name),
            registration_number: text(CandidateField::RegistrationNumber),
            region: text(CandidateField::Region),
            capacity_rating: number(CandidateField::CapacityRating),
            perf5y: number(CandidateField::Performance5y),
            debt_ratio: number(CandidateField::DebtRatio),
            current_ratio: number(CandidateField::CurrentRatio),
            business_period: self.get(CandidateField::BusinessPeriod).cloned(),
            credit_grade: text(CandidateField::CreditGrade),
            quality_eval: number(CandidateField::QualityEval),
        }
    }
}

/// Typed view of a candidate after alias resolution.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub name: Option<String>,
    pub registration_number: Option<String>,
    pub region: Option<String>,
    pub capacity_rating: Option<f64>,
    pub perf5y: Option<f64>,
    pub debt_ratio: Option<f64>,
    pub current_ratio: Option<f64>,
    pub business_period: Option<Value>,
    pub credit_grade: Option<String>,
    pub quality_eval: Option<f64>,
}

impl CandidateProfile {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.registration_number.clone())
            .unwrap_or_else(|| "(unnamed)".to_string())
    }

    /// Registration number with separators removed.
    pub fn normalized_registration(&self) -> Option<String> {
        self.registration_number
            .as_deref()
            .map(normalize_registration)
            .filter(|value| !value.is_empty())
    }
}

pub fn normalize_registration(value: &str) -> String {
    value.chars().filter(|ch| ch.is_ascii_alphanumeric()).collect()
}
