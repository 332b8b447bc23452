// src/discovery.rs
//! File enumeration: tracked files from git, or a pruned directory walk.

use crate::config::Config;
use crate::constants::{should_prune, SECRET_PATTERN};
use crate::error::{MothError, Result};
use crate::utils::normalize_rel;
use regex::Regex;
use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;
use walkdir::WalkDir;

static SECRET_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(SECRET_PATTERN).ok());

/// Where the file list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Git,
    Walk,
}

#[derive(Debug, Clone)]
pub struct Enumeration {
    /// Sorted, `/`-separated paths relative to the root.
    pub files: Vec<String>,
    pub source: Source,
}

/// Lists candidate files under `root`.
///
/// Prefers `git ls-files`; any failure there falls back to a directory walk.
///
/// # Errors
/// Returns `RootMissing` if `root` is not a readable directory.
pub fn discover(root: &Path, config: &Config) -> Result<Enumeration> {
    ensure_root(root)?;

    let (raw, source) = match config.analysis.use_git.then(|| git_tracked(root)).flatten() {
        Some(files) => (files, Source::Git),
        None => (walk_filesystem(root, config.verbose), Source::Walk),
    };

    let mut files: Vec<String> = raw
        .into_iter()
        .map(|p| normalize_rel(&p))
        .filter(|p| !is_pruned(p) && !is_secret(p))
        .filter(|p| !config.exclude_patterns.iter().any(|re| re.is_match(p)))
        .collect();
    files.sort();
    files.dedup();

    Ok(Enumeration { files, source })
}

/// Fails unless `root` exists, is a directory and can be listed.
///
/// # Errors
/// Returns `RootMissing` otherwise.
pub fn ensure_root(root: &Path) -> Result<()> {
    if !root.is_dir() || std::fs::read_dir(root).is_err() {
        return Err(MothError::RootMissing(root.to_path_buf()));
    }
    Ok(())
}

fn git_tracked(root: &Path) -> Option<Vec<String>> {
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(["ls-files", "-z", "--cached"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let files: Vec<String> = output
        .stdout
        .split(|b| *b == 0)
        .filter(|s| !s.is_empty())
        .map(|s| String::from_utf8_lossy(s).to_string())
        // Tracked but deleted in the working tree.
        .filter(|rel| root.join(rel).is_file())
        .collect();
    // A fresh repository, or an untracked root inside a parent repository.
    (!files.is_empty()).then_some(files)
}

fn walk_filesystem(root: &Path, verbose: bool) -> Vec<String> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !should_prune(&e.file_name().to_string_lossy()));

    let (paths, error_count) = accumulate_walker(root, walker);
    if error_count > 0 && verbose {
        eprintln!("WARN: Encountered {error_count} errors during file walk");
    }
    paths
}

fn accumulate_walker<I>(root: &Path, walker: I) -> (Vec<String>, usize)
where
    I: Iterator<Item = walkdir::Result<walkdir::DirEntry>>,
{
    let mut paths = Vec::new();
    let mut errors = 0;
    for item in walker {
        match item {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    let p = entry.path().strip_prefix(root).unwrap_or(entry.path());
                    paths.push(p.to_string_lossy().to_string());
                }
            }
            Err(_) => errors += 1,
        }
    }
    (paths, errors)
}

fn is_pruned(rel: &str) -> bool {
    let mut parts: Vec<&str> = rel.split('/').collect();
    parts.pop();
    parts.iter().any(|dir| should_prune(dir))
}

fn is_secret(rel: &str) -> bool {
    SECRET_RE.as_ref().is_some_and(|re| re.is_match(rel))
}
