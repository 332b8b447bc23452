//! Parallel driver over the per-file worker.

use std::path::Path;

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use super::extract::ExtractorRegistry;
use super::worker::{self, FileOutcome};
use super::SourceFile;
use crate::events::RunEvent;

/// Records for every path, in input order, plus the degradations encountered.
#[derive(Debug, Default)]
pub struct AnalysisBatch {
    pub files: Vec<SourceFile>,
    pub events: Vec<RunEvent>,
}

/// Analyzes `paths` on rayon's pool. Output order matches input order regardless
/// of scheduling.
#[must_use]
pub fn analyze_all(root: &Path, paths: &[String], registry: &ExtractorRegistry) -> AnalysisBatch {
    let outcomes: Vec<FileOutcome> = paths
        .par_iter()
        .map(|rel| worker::analyze_file(root, rel, registry))
        .collect();

    let mut batch = AnalysisBatch {
        files: Vec::with_capacity(outcomes.len()),
        events: Vec::new(),
    };
    for outcome in outcomes {
        batch.files.push(outcome.file);
        batch.events.extend(outcome.event);
    }
    batch
}
