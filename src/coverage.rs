// src/coverage.rs
//! Line coverage from a coverage.py JSON report (`coverage json`).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{MothError, Result};
use crate::utils::normalize_rel;

#[derive(Debug, Deserialize)]
struct Report {
    #[serde(default)]
    files: HashMap<String, FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    #[serde(default)]
    summary: Summary,
}

#[derive(Debug, Default, Deserialize)]
struct Summary {
    percent_covered: Option<f64>,
    covered_lines: Option<u64>,
    num_statements: Option<u64>,
}

impl Summary {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn percent(&self) -> Option<u8> {
        let pct = match (self.percent_covered, self.covered_lines, self.num_statements) {
            (Some(p), _, _) => p,
            (None, Some(covered), Some(total)) if total > 0 => {
                covered as f64 * 100.0 / total as f64
            }
            _ => return None,
        };
        Some(pct.round().clamp(0.0, 100.0) as u8)
    }
}

/// Integer coverage percent per repository-relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageMap {
    percents: HashMap<String, u8>,
}

impl CoverageMap {
    /// Reads the report at `path`. Absolute file paths inside it are made relative
    /// to `root`.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not coverage JSON.
    pub fn load(path: &Path, root: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| MothError::io(e, path))?;
        Self::parse(&text, root)
    }

    /// # Errors
    /// Returns error if `text` is not coverage JSON.
    pub fn parse(text: &str, root: &Path) -> Result<Self> {
        let report: Report = serde_json::from_str(text)?;
        let root_str = normalize_rel(&root.to_string_lossy());
        let percents = report
            .files
            .into_iter()
            .filter_map(|(file, entry)| {
                let rel = relativize(&normalize_rel(&file), &root_str);
                entry.summary.percent().map(|p| (rel, p))
            })
            .collect();
        Ok(Self { percents })
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<u8> {
        self.percents.get(path).copied()
    }
}

fn relativize(file: &str, root: &str) -> String {
    if root.is_empty() {
        return file.to_string();
    }
    match file.strip_prefix(root).and_then(|rest| rest.strip_prefix('/')) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => file.to_string(),
    }
}
