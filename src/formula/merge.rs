use serde_json::{Map, Value};
use tracing::warn;

fn agency_key(agency: &Value) -> Option<String> {
    agency
        .get("id")
        .and_then(Value::as_str)
        .map(|id| id.trim().to_lowercase())
        .filter(|id| !id.is_empty())
}

fn amount(tier: &Value, key: &str) -> Option<f64> {
    tier.get(key).and_then(Value::as_f64)
}

fn tier_key(tier: &Value) -> (Option<f64>, Option<f64>) {
    (amount(tier, "minAmount"), amount(tier, "maxAmount"))
}

/// Merges override agencies into a copy of the base agencies.
///
/// Agencies match on case-insensitive `id`. A matched agency takes the
/// override's top-level fields as-is, except `tiers`, which merge through
/// [`merge_tiers`]. Override-only agencies are appended.
pub fn merge_agencies(base: &[Value], overrides: &[Value]) -> Vec<Value> {
    let mut merged: Vec<Value> = base.to_vec();

    for overlay in overrides {
        let Some(key) = agency_key(overlay) else {
            warn!("override agency without an id ignored");
            continue;
        };

        match merged
            .iter_mut()
            .find(|agency| agency_key(agency).as_deref() == Some(key.as_str()))
        {
            Some(existing) => merge_agency(existing, overlay),
            None => merged.push(overlay.clone()),
        }
    }

    merged
}

fn merge_agency(existing: &mut Value, overlay: &Value) {
    let (Value::Object(target), Value::Object(source)) = (existing, overlay) else {
        return;
    };

    for (field, value) in source {
        match field.as_str() {
            "id" => {}
            "tiers" => {
                let base_tiers = target
                    .get("tiers")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                let override_tiers = value.as_array().cloned().unwrap_or_default();
                target.insert(
                    "tiers".to_string(),
                    Value::Array(merge_tiers(&base_tiers, &override_tiers)),
                );
            }
            _ => {
                target.insert(field.clone(), value.clone());
            }
        }
    }
}

/// Tiers match on the exact `(minAmount, maxAmount)` pair. A matched tier's
/// `rules` object is deep-merged with the override winning; unmatched
/// override tiers are appended.
pub fn merge_tiers(base: &[Value], overrides: &[Value]) -> Vec<Value> {
    let mut merged: Vec<Value> = base.to_vec();

    for overlay in overrides {
        let key = tier_key(overlay);
        match merged.iter_mut().find(|tier| tier_key(tier) == key) {
            Some(existing) => merge_json(existing, overlay.clone()),
            None => merged.push(overlay.clone()),
        }
    }

    merged
}

/// Recursive object merge; any non-object overlay value replaces the slot.
pub fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}

/// Merges two `{version, agencies}` documents. The override's version wins
/// when present.
pub fn merge_documents(base: &Value, overrides: Option<&Value>) -> Value {
    let agencies_of = |doc: &Value| {
        doc.get("agencies")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    };

    let base_agencies = agencies_of(base);
    let override_agencies = overrides.map(agencies_of).unwrap_or_default();

    let version = overrides
        .and_then(|doc| doc.get("version"))
        .filter(|version| !version.is_null())
        .or_else(|| base.get("version"))
        .cloned()
        .unwrap_or(Value::Null);

    let mut document = Map::new();
    document.insert("version".to_string(), version);
    document.insert(
        "agencies".to_string(),
        Value::Array(merge_agencies(&base_agencies, &override_agencies)),
    );
    Value::Object(document)
}
