//! Reads candidate records produced by spreadsheet ingestion.

use crate::error::{BidError, Result};
use crate::types::candidate::Candidate;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Loads a JSON file (an array of records or a single record), or every
/// `*.json` file under a directory in path order.
pub fn load(path: &Path) -> Result<Vec<Candidate>> {
    if !path.exists() {
        return Err(BidError::PathNotFound(path.display().to_string()));
    }

    if path.is_file() {
        return load_file(path);
    }

    let mut candidates = Vec::new();
    for file in list_json_files(path) {
        candidates.extend(load_file(&file)?);
    }
    debug!(
        dir = %path.display(),
        count = candidates.len(),
        "candidates loaded from directory"
    );
    Ok(candidates)
}

fn list_json_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    files.sort();
    files
}

fn load_file(path: &Path) -> Result<Vec<Candidate>> {
    let text = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|err| BidError::CandidateFile(format!("{}: {err}", path.display())))?;
    from_value(value)
        .map_err(|detail| BidError::CandidateFile(format!("{}: {detail}", path.display())))
}

fn from_value(value: Value) -> std::result::Result<Vec<Candidate>, String> {
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                Value::Object(fields) => Some(Candidate::new(fields)),
                _ => {
                    warn!(index, "skipping non-object candidate record");
                    None
                }
            })
            .collect()),
        Value::Object(fields) => Ok(vec![Candidate::new(fields)]),
        _ => Err("expected an array of records or a single record".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_array_file() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("pool.json");
        fs::write(&file, r#"[{"업체명": "가"}, 3, {"업체명": "나"}]"#).expect("write pool");

        let candidates = load(&file).expect("pool should load");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].profile().display_name(), "나");
    }

    #[test]
    fn walks_directory_in_path_order() {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir_all(dir.path().join("nested")).expect("nested dir");
        fs::write(dir.path().join("b.json"), r#"{"업체명": "둘"}"#).expect("write b");
        fs::write(dir.path().join("a.json"), r#"[{"업체명": "하나"}]"#).expect("write a");
        fs::write(dir.path().join("nested/c.JSON"), r#"[{"업체명": "셋"}]"#).expect("write c");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write notes");

        let names: Vec<String> = load(dir.path())
            .expect("directory should load")
            .iter()
            .map(|candidate| candidate.profile().display_name())
            .collect();
        assert_eq!(names, vec!["하나", "둘", "셋"]);
    }

    #[test]
    fn rejects_scalars_and_missing_paths() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("bad.json");
        fs::write(&file, "42").expect("write bad");
        assert!(matches!(load(&file), Err(BidError::CandidateFile(_))));
        assert!(matches!(
            load(&dir.path().join("missing.json")),
            Err(BidError::PathNotFound(_))
        ));
    }
}
