// src/index.rs
//! Machine-readable companion to the manifest: `index.json`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::SourceFile;
use crate::error::Result;
use crate::graph::{EdgeMap, Metrics};
use crate::lang::Lang;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub metrics: Metrics,
    pub hash: String,
    pub size: u64,
    pub modified: String,
    pub language: Option<Lang>,
    pub deps: Vec<String>,
    pub symbols: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub binary: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub files: BTreeMap<String, IndexEntry>,
}

impl Index {
    #[must_use]
    pub fn build(files: &[SourceFile], metrics: &BTreeMap<String, Metrics>, edges: &EdgeMap) -> Self {
        let files = files
            .iter()
            .map(|f| {
                let entry = IndexEntry {
                    metrics: metrics.get(&f.path).cloned().unwrap_or_default(),
                    hash: f.hash.clone(),
                    size: f.size,
                    modified: f.modified.clone(),
                    language: f.language,
                    deps: edges
                        .get(&f.path)
                        .map(|ts| ts.iter().map(ToString::to_string).collect())
                        .unwrap_or_default(),
                    symbols: f.symbols.clone(),
                    binary: f.binary,
                    degraded: f.degraded,
                };
                (f.path.clone(), entry)
            })
            .collect();
        Self { files }
    }

    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    /// Returns error if `text` is not an index document.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
