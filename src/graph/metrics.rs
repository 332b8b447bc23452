// src/graph/metrics.rs
//! Fan-in, fan-out and cycle-safe depth over a resolved [`EdgeMap`].
//!
//! Fan-out counts every resolved target of a file, external and missing ones
//! included. Fan-in only counts internal edges pointing at a file. The asymmetry
//! is intentional: a file's outgoing surface is everything it imports, while its
//! incoming surface can only come from inside the repository.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::resolver::{EdgeMap, Target};
use crate::analysis::SourceFile;
use crate::churn::ChurnMap;
use crate::coverage::CoverageMap;

/// Per-file numbers written to the manifest and the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub fan_in: usize,
    pub fan_out: usize,
    pub depth: usize,
    pub churn: u32,
    pub loc: usize,
    pub complexity: usize,
    pub size: u64,
    pub coverage: Option<u8>,
}

#[must_use]
pub fn fan_out(edges: &EdgeMap, file: &str) -> usize {
    edges.get(file).map_or(0, Vec::len)
}

/// Fan-in by scanning every edge list.
#[must_use]
pub fn fan_in_scan(edges: &EdgeMap, file: &str) -> usize {
    edges
        .values()
        .filter(|targets| targets.iter().any(|t| t.as_internal() == Some(file)))
        .count()
}

/// Internal dependents per file, built once.
#[derive(Debug, Clone, Default)]
pub struct ReverseIndex {
    dependents: HashMap<String, BTreeSet<String>>,
}

impl ReverseIndex {
    #[must_use]
    pub fn build(edges: &EdgeMap) -> Self {
        let mut dependents: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (source, targets) in edges {
            for target in targets.iter().filter_map(Target::as_internal) {
                dependents
                    .entry(target.to_string())
                    .or_default()
                    .insert(source.clone());
            }
        }
        Self { dependents }
    }

    #[must_use]
    pub fn fan_in(&self, file: &str) -> usize {
        self.dependents.get(file).map_or(0, BTreeSet::len)
    }

    /// Files importing `file`, sorted.
    #[must_use]
    pub fn dependents(&self, file: &str) -> Vec<&str> {
        self.dependents
            .get(file)
            .map(|s| s.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Longest internal import chain starting at a file, counted in files.
///
/// Cycles are cut where an edge re-enters a file already on the current path:
/// such an edge adds nothing. Results that never touched the current path are
/// shared across roots; the rest are only reused within one root's traversal.
pub struct DepthSolver<'a> {
    adjacency: BTreeMap<&'a str, Vec<&'a str>>,
    settled: HashMap<&'a str, usize>,
}

struct Walk<'a> {
    on_path: HashMap<&'a str, usize>,
    scratch: HashMap<&'a str, usize>,
}

/// Sentinel for "touched no file on the current path".
const UNTOUCHED: usize = usize::MAX;

impl<'a> DepthSolver<'a> {
    #[must_use]
    pub fn new(edges: &'a EdgeMap) -> Self {
        let adjacency = edges
            .iter()
            .map(|(source, targets)| {
                let mut next: Vec<&str> = targets.iter().filter_map(Target::as_internal).collect();
                next.sort_unstable();
                next.dedup();
                (source.as_str(), next)
            })
            .collect();
        Self {
            adjacency,
            settled: HashMap::new(),
        }
    }

    /// Depth of `file`; at least 1, exactly 1 with no internal outgoing edges.
    pub fn depth(&mut self, file: &'a str) -> usize {
        if let Some(&d) = self.settled.get(file) {
            return d;
        }
        let mut walk = Walk {
            on_path: HashMap::new(),
            scratch: HashMap::new(),
        };
        self.visit(file, &mut walk).0
    }

    /// Returns the node's depth and the shallowest path index its subtree touched.
    fn visit(&mut self, node: &'a str, walk: &mut Walk<'a>) -> (usize, usize) {
        if let Some(&d) = self.settled.get(node) {
            return (d, UNTOUCHED);
        }
        if let Some(&d) = walk.scratch.get(node) {
            // Cached for this root only; it depended on the path, so treat it as
            // touching the root.
            return (d, 0);
        }

        let index = walk.on_path.len();
        walk.on_path.insert(node, index);

        let children = self.adjacency.get(node).cloned().unwrap_or_default();
        let mut best = 0;
        let mut touched = UNTOUCHED;
        for child in children {
            if let Some(&at) = walk.on_path.get(child) {
                touched = touched.min(at);
                continue;
            }
            let (d, t) = self.visit(child, walk);
            best = best.max(d);
            touched = touched.min(t);
        }

        walk.on_path.remove(node);
        let depth = 1 + best;
        if touched == UNTOUCHED {
            self.settled.insert(node, depth);
        } else {
            walk.scratch.insert(node, depth);
        }
        (depth, touched)
    }
}

/// Depth of every file in `edges`.
#[must_use]
pub fn depths(edges: &EdgeMap) -> BTreeMap<String, usize> {
    let mut solver = DepthSolver::new(edges);
    edges
        .keys()
        .map(|k| (k.clone(), solver.depth(k.as_str())))
        .collect()
}

/// Full metrics for every file.
#[must_use]
pub fn compute(
    files: &[SourceFile],
    edges: &EdgeMap,
    churn: &ChurnMap,
    coverage: &CoverageMap,
) -> BTreeMap<String, Metrics> {
    let reverse = ReverseIndex::build(edges);
    let mut solver = DepthSolver::new(edges);
    files
        .iter()
        .map(|f| {
            let depth = edges
                .get_key_value(&f.path)
                .map_or(1, |(key, _)| solver.depth(key.as_str()));
            let metrics = Metrics {
                fan_in: reverse.fan_in(&f.path),
                fan_out: fan_out(edges, &f.path),
                depth,
                churn: churn.get(&f.path),
                loc: f.loc,
                complexity: f.complexity,
                size: f.size,
                coverage: coverage.get(&f.path),
            };
            (f.path.clone(), metrics)
        })
        .collect()
}
