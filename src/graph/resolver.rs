// src/graph/resolver.rs
//! Turns raw import specifiers into graph targets.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use crate::analysis::SourceFile;
use crate::constants::{EXTERNAL_MARKER, MISSING_MARKER};

/// Suffixes tried after the exact path, in order.
const FILE_SUFFIXES: &[&str] = &[
    ".ts", ".tsx", ".d.ts", ".js", ".jsx", ".mjs", ".cjs", ".py", ".rs",
];

/// Directory entry points tried last, in order.
const INDEX_FILES: &[&str] = &[
    "index.ts",
    "index.tsx",
    "index.js",
    "index.jsx",
    "__init__.py",
    "mod.rs",
];

/// Where an import points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    /// A file in the snapshot.
    Internal(String),
    /// A package or module outside the repository; kept verbatim.
    External(String),
    /// A relative import that matched no file.
    Missing(String),
}

impl Target {
    #[must_use]
    pub fn as_internal(&self) -> Option<&str> {
        match self {
            Self::Internal(p) => Some(p),
            Self::External(_) | Self::Missing(_) => None,
        }
    }

    /// Inverse of `Display`.
    #[must_use]
    pub fn from_rendered(s: &str) -> Self {
        if let Some(spec) = s.strip_prefix(EXTERNAL_MARKER) {
            Self::External(spec.to_string())
        } else if let Some(path) = s.strip_prefix(MISSING_MARKER) {
            Self::Missing(path.to_string())
        } else {
            Self::Internal(s.to_string())
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal(p) => f.write_str(p),
            Self::External(s) => write!(f, "{EXTERNAL_MARKER}{s}"),
            Self::Missing(p) => write!(f, "{MISSING_MARKER}{p}"),
        }
    }
}

/// Resolved targets per source file, keyed and iterated by path.
pub type EdgeMap = BTreeMap<String, Vec<Target>>;

/// Whether `spec` is a path relative to the importing file.
#[must_use]
pub fn is_relative(spec: &str) -> bool {
    spec == "." || spec == ".." || spec.starts_with("./") || spec.starts_with("../")
}

/// Resolves one specifier imported by `from`. Never fails: unresolvable relative
/// imports become `Missing`.
#[must_use]
pub fn resolve<S: std::hash::BuildHasher>(
    from: &str,
    spec: &str,
    known: &HashSet<String, S>,
) -> Target {
    if !is_relative(spec) {
        return Target::External(spec.to_string());
    }

    let dir = from.rsplit_once('/').map_or("", |(d, _)| d);
    let joined = if dir.is_empty() {
        spec.to_string()
    } else {
        format!("{dir}/{spec}")
    };
    let base = normalize_lexically(&joined);

    candidates(&base)
        .into_iter()
        .find(|c| known.contains(c))
        .map_or(Target::Missing(base), Target::Internal)
}

fn candidates(base: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(1 + FILE_SUFFIXES.len() + INDEX_FILES.len());
    if !base.is_empty() {
        out.push(base.to_string());
        out.extend(FILE_SUFFIXES.iter().map(|s| format!("{base}{s}")));
    }
    out.extend(INDEX_FILES.iter().map(|i| {
        if base.is_empty() {
            (*i).to_string()
        } else {
            format!("{base}/{i}")
        }
    }));
    out
}

/// Collapses `.` and `..` segments without touching the filesystem. `..` segments
/// that climb above the root are kept.
#[must_use]
pub fn normalize_lexically(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Resolves every file's imports. Every file gets an entry; targets keep
/// first-occurrence order, without duplicates or self-edges.
#[must_use]
pub fn resolve_all(files: &[SourceFile]) -> EdgeMap {
    let known: HashSet<String> = files.iter().map(|f| f.path.clone()).collect();
    files
        .iter()
        .map(|file| {
            let mut seen = BTreeSet::new();
            let targets = file
                .imports
                .iter()
                .map(|spec| resolve(&file.path, spec, &known))
                .filter(|t| t.as_internal() != Some(file.path.as_str()))
                .filter(|t| seen.insert(t.clone()))
                .collect();
            (file.path.clone(), targets)
        })
        .collect()
}
