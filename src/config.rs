use crate::error::{BidError, Result};
use crate::types::config::BidConfig;
use std::path::{Path, PathBuf};
use toml::map::Map;
use toml::Value;

pub const DEFAULT_CONFIG_FILE: &str = "bidscore.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".bidscore/local.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/bidscore/config.toml";

/// Loads the layered configuration for a workspace. Returns `None` when the
/// workspace has no `bidscore.toml`.
pub fn load_config(root: &Path) -> Result<Option<BidConfig>> {
    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_config_with_global(root, global.as_deref())
}

pub(crate) fn load_config_with_global(
    root: &Path,
    global_path: Option<&Path>,
) -> Result<Option<BidConfig>> {
    let workspace_path = root.join(DEFAULT_CONFIG_FILE);
    if !workspace_path.exists() {
        return Ok(None);
    }

    let mut merged = Value::Table(Map::new());
    if let Some(path) = global_path {
        merge_file_if_exists(&mut merged, path)?;
    }
    merge_file_if_exists(&mut merged, &workspace_path)?;
    merge_file_if_exists(&mut merged, &root.join(DEFAULT_LOCAL_FILE))?;

    let mut cfg: BidConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| BidError::ConfigParse(e.to_string()))?;
    cfg.validate()?;
    resolve_paths(&mut cfg, root);
    Ok(Some(cfg))
}

/// Relative document paths are anchored at the workspace root.
fn resolve_paths(cfg: &mut BidConfig, root: &Path) {
    for slot in [
        &mut cfg.formulas.defaults,
        &mut cfg.formulas.overrides,
        &mut cfg.industry.averages,
    ] {
        if let Some(path) = slot.as_mut() {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }
}

fn merge_file_if_exists(merged: &mut Value, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let value = read_toml_value(path)?;
    merge_toml(merged, value);
    Ok(())
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| BidError::ConfigParse(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}
