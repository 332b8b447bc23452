// src/analysis/mod.rs
//! Per-file analysis: metrics, imports, symbols and documentation for one snapshot.

pub mod complexity;
pub mod docs;
pub mod engine;
pub mod extract;
pub mod fallback;
pub mod syntax;
pub mod worker;

pub use engine::{analyze_all, AnalysisBatch};
pub use extract::{ExtractError, Extraction, ExtractorRegistry, SyntaxExtractor};
pub use worker::{analyze_file, FileOutcome};

use crate::lang::Lang;
use serde::{Deserialize, Serialize};

/// Everything measured about one file. Built once per run, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// `/`-separated, relative to the repository root.
    pub path: String,
    /// SHA-256 hex of the raw bytes; empty for degraded records.
    pub hash: String,
    pub size: u64,
    pub loc: usize,
    /// RFC 3339, UTC. Empty when the filesystem does not report it.
    pub modified: String,
    pub language: Option<Lang>,
    /// Sorted, de-duplicated raw specifiers.
    pub imports: Vec<String>,
    /// Sorted, de-duplicated exported names.
    pub symbols: Vec<String>,
    pub complexity: usize,
    pub doc: Option<String>,
    pub binary: bool,
    pub degraded: bool,
}

impl SourceFile {
    /// A record for a file that could not be read.
    #[must_use]
    pub fn degraded(path: &str) -> Self {
        Self {
            path: path.to_string(),
            hash: String::new(),
            size: 0,
            loc: 0,
            modified: String::new(),
            language: Lang::from_path(path),
            imports: Vec::new(),
            symbols: Vec::new(),
            complexity: 1,
            doc: None,
            binary: false,
            degraded: true,
        }
    }

    /// File name without directory or final extension.
    #[must_use]
    pub fn stem(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        }
    }
}
