// src/validate/mod.rs
//! Consistency checks and aggregate reports over a finished run.
//!
//! Nothing here fails the run: problems come back as `false` fields so that
//! consumers can tell degraded output from good output.

pub mod rankings;

pub use rankings::{rank, Ranked, Rankings};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ReportConfig;
use crate::error::Result;
use crate::index::Index;
use crate::manifest::{self, EntryMetrics};
use crate::utils::is_sha256_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCheck {
    pub path: String,
    /// The indexed content hash is a well-formed SHA-256.
    pub hash_ok: bool,
    /// Manifest metrics agree with the index and depth is at least 1.
    pub metrics_ok: bool,
    /// The path is still a file under the root.
    pub exists: bool,
}

impl FileCheck {
    #[must_use]
    pub fn ok(&self) -> bool {
        self.hash_ok && self.metrics_ok && self.exists
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_files: usize,
    pub total_lines: usize,
    pub total_complexity: usize,
    pub average_depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub digest_match: bool,
    pub checksum_match: bool,
    pub count_match: bool,
    pub summary: Summary,
    pub files: Vec<FileCheck>,
    pub rankings: Rankings,
}

impl ValidationReport {
    /// Every integrity flag and every file check passed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.digest_match && self.checksum_match && self.count_match && self.files.iter().all(FileCheck::ok)
    }

    /// Paths failing at least one check.
    #[must_use]
    pub fn failing(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter(|f| !f.ok())
            .map(|f| f.path.as_str())
            .collect()
    }

    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Cross-checks `manifest_text` against `index` and the files under `root`.
///
/// # Errors
/// Returns `ManifestParse` if `manifest_text` is not a manifest at all.
pub fn validate(
    manifest_text: &str,
    index: &Index,
    root: &Path,
    cfg: &ReportConfig,
) -> Result<ValidationReport> {
    let (manifest, verification) = manifest::verify(manifest_text)?;

    let files = manifest
        .entries
        .iter()
        .map(|entry| {
            let indexed = index.files.get(&entry.path);
            FileCheck {
                path: entry.path.clone(),
                hash_ok: indexed.is_some_and(|i| is_sha256_hex(&i.hash)),
                metrics_ok: entry.metrics.depth >= 1
                    && indexed.is_some_and(|i| EntryMetrics::from(&i.metrics) == entry.metrics),
                exists: root.join(&entry.path).is_file(),
            }
        })
        .collect();

    Ok(ValidationReport {
        digest_match: verification.digest_match,
        checksum_match: verification.checksum_match,
        count_match: verification.count_match,
        summary: summarize(&manifest.entries),
        files,
        rankings: rank(&index.files, cfg),
    })
}

#[allow(clippy::cast_precision_loss)]
fn summarize(entries: &[manifest::Entry]) -> Summary {
    let total_files = entries.len();
    let total_depth: usize = entries.iter().map(|e| e.metrics.depth).sum();
    Summary {
        total_files,
        total_lines: entries.iter().map(|e| e.metrics.loc).sum(),
        total_complexity: entries.iter().map(|e| e.metrics.complexity).sum(),
        average_depth: if total_files == 0 {
            0.0
        } else {
            total_depth as f64 / total_files as f64
        },
    }
}
