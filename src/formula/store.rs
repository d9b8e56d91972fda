use super::merge::merge_documents;
use crate::engine;
use crate::error::{BidError, Result};
use crate::types::formula::FormulaDocument;
use crate::types::request::EvaluateRequest;
use crate::types::result::EvaluationResult;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const BUILTIN_DEFAULTS: &str = include_str!("../../data/formulas.defaults.json");

/// A parsed document together with the digest of its canonical JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDocument {
    pub document: FormulaDocument,
    pub fingerprint: String,
}

/// Owns the defaults and override documents and caches the merged result.
///
/// The cache holds one merged document and one defaults-only document. It is
/// rebuilt lazily after [`FormulaStore::invalidate`] or
/// [`FormulaStore::replace_overrides`]. Callers sharing a store across
/// threads wrap it in their own lock.
#[derive(Debug, Clone)]
pub struct FormulaStore {
    defaults: Value,
    overrides: Option<Value>,
    merged_cache: Option<ResolvedDocument>,
    defaults_cache: Option<ResolvedDocument>,
}

impl FormulaStore {
    pub fn new(defaults: Value, overrides: Option<Value>) -> Self {
        Self {
            defaults,
            overrides,
            merged_cache: None,
            defaults_cache: None,
        }
    }

    /// The defaults bundled with the binary, no overrides.
    pub fn builtin() -> Result<Self> {
        let defaults: Value = serde_json::from_str(BUILTIN_DEFAULTS)?;
        Ok(Self::new(defaults, None))
    }

    /// Loads defaults from `defaults_path` (or the bundled copy) and the
    /// optional override file. A missing override file means no overrides.
    pub fn load(defaults_path: Option<&Path>, overrides_path: Option<&Path>) -> Result<Self> {
        let mut store = match defaults_path {
            Some(path) => Self::new(read_document(path)?, None),
            None => Self::builtin()?,
        };

        if let Some(path) = overrides_path {
            if path.exists() {
                store.overrides = Some(read_document(path)?);
                info!(path = %path.display(), "formula overrides loaded");
            } else {
                debug!(path = %path.display(), "no formula overrides file");
            }
        }

        Ok(store)
    }

    pub fn has_overrides(&self) -> bool {
        self.overrides.is_some()
    }

    /// Drops both cached documents.
    pub fn invalidate(&mut self) {
        if self.merged_cache.is_some() || self.defaults_cache.is_some() {
            debug!("formula cache invalidated");
        }
        self.merged_cache = None;
        self.defaults_cache = None;
    }

    pub fn replace_overrides(&mut self, overrides: Option<Value>) {
        self.overrides = overrides;
        self.invalidate();
    }

    /// Defaults merged with overrides.
    pub fn merged(&mut self) -> Result<&ResolvedDocument> {
        if self.merged_cache.is_none() {
            let merged = merge_documents(&self.defaults, self.overrides.as_ref());
            let resolved = resolve(merged)?;
            debug!(fingerprint = %resolved.fingerprint, "merged formula document rebuilt");
            self.merged_cache = Some(resolved);
        }
        self.merged_cache
            .as_ref()
            .ok_or_else(|| BidError::FormulaDocument("merged cache empty after rebuild".into()))
    }

    /// Defaults alone, ignoring any overrides.
    pub fn defaults(&mut self) -> Result<&ResolvedDocument> {
        if self.defaults_cache.is_none() {
            let resolved = resolve(merge_documents(&self.defaults, None))?;
            debug!(fingerprint = %resolved.fingerprint, "defaults formula document rebuilt");
            self.defaults_cache = Some(resolved);
        }
        self.defaults_cache
            .as_ref()
            .ok_or_else(|| BidError::FormulaDocument("defaults cache empty after rebuild".into()))
    }

    /// Picks the document per `use_defaults_only` and scores the request.
    pub fn evaluate(&mut self, request: &EvaluateRequest) -> Result<EvaluationResult> {
        let resolved = if request.use_defaults_only {
            self.defaults()?
        } else {
            self.merged()?
        };
        let mut result = engine::evaluate_scores(&resolved.document, request);
        result.meta.formula_fingerprint = Some(resolved.fingerprint.clone());
        Ok(result)
    }
}

fn read_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(BidError::PathNotFound(path.display().to_string()));
    }
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text)
        .map_err(|err| BidError::FormulaDocument(format!("{}: {err}", path.display())))
}

fn resolve(merged: Value) -> Result<ResolvedDocument> {
    let canonical = serde_json::to_vec(&merged)?;
    let document: FormulaDocument = serde_json::from_value(merged)
        .map_err(|err| BidError::FormulaDocument(err.to_string()))?;
    validate_document(&document)?;
    Ok(ResolvedDocument {
        document,
        fingerprint: sha256_hex(&canonical),
    })
}

fn validate_document(document: &FormulaDocument) -> Result<()> {
    for agency in &document.agencies {
        if agency.id.trim().is_empty() {
            return Err(BidError::FormulaDocument(
                "agency id must not be empty".to_string(),
            ));
        }
        if agency.tiers.iter().any(|tier| !tier.min_amount.is_finite()) {
            return Err(BidError::FormulaDocument(format!(
                "agency '{}' has a tier with a non-finite minAmount",
                agency.id
            )));
        }
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}
