// src/pipeline.rs
//! One full run: enumerate, analyze, resolve, measure, serialize, validate, write.

use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{analyze_all, AnalysisBatch, ExtractorRegistry};
use crate::churn::{self, ChurnMap};
use crate::config::Config;
use crate::coverage::CoverageMap;
use crate::discovery::{self, Source};
use crate::error::{MothError, Result};
use crate::events::{EventLogger, RunEvent};
use crate::graph;
use crate::index::Index;
use crate::manifest::{self, Manifest};
use crate::utils::is_sha256_hex;
use crate::validate::{self, ValidationReport};

pub const MANIFEST_FILE: &str = "manifest.moth";
pub const INDEX_FILE: &str = "index.json";
pub const VALIDATION_FILE: &str = "validation.json";

/// Paths of the three artifacts in an output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub manifest: PathBuf,
    pub index: PathBuf,
    pub validation: PathBuf,
}

impl Artifacts {
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            manifest: dir.join(MANIFEST_FILE),
            index: dir.join(INDEX_FILE),
            validation: dir.join(VALIDATION_FILE),
        }
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    pub artifacts: Artifacts,
    pub manifest: Manifest,
    pub validation: ValidationReport,
    pub events: Vec<RunEvent>,
    pub source: Source,
}

impl RunOutcome {
    #[must_use]
    pub fn warnings(&self) -> impl Iterator<Item = &RunEvent> {
        self.events.iter().filter(|e| e.is_warning())
    }
}

/// Runs the whole pipeline against `root`, stamping the manifest with `date`.
///
/// Only a missing root or a failed write is an error; every other problem is
/// recorded as a [`RunEvent`] and reflected in the validation report.
///
/// # Errors
/// Returns `RootMissing` before anything is written, or an I/O error if the
/// artifacts cannot be written. In the latter case no artifact is replaced.
pub fn run(root: &Path, config: &Config, date: &str) -> Result<RunOutcome> {
    run_with(root, config, date, Vec::new())
}

/// Like [`run`], with `carried` events from before the run (such as an ignored
/// config file) recorded right after `RunStarted`.
///
/// # Errors
/// Same as [`run`].
pub fn run_with(
    root: &Path,
    config: &Config,
    date: &str,
    carried: Vec<RunEvent>,
) -> Result<RunOutcome> {
    let enumeration = discovery::discover(root, config)?;
    let out_dir = config.output_dir(root);
    let files = without_output_dir(enumeration.files, root, &out_dir);

    let mut events = vec![RunEvent::RunStarted {
        root: root.display().to_string(),
        files: files.len(),
    }];
    events.extend(carried);

    let registry = ExtractorRegistry::with_tree_sitter(config.parse_timeout());
    let (batch, churn) = rayon::join(
        || analyze_all(root, &files, &registry),
        || history(root, config),
    );
    let AnalysisBatch {
        files: sources,
        events: file_events,
    } = batch;
    events.extend(file_events);
    let churn = churn.unwrap_or_else(|e| {
        events.push(e);
        ChurnMap::default()
    });
    let coverage = load_coverage(root, config, &mut events);

    let edges = graph::resolve_all(&sources);
    let metrics = graph::compute(&sources, &edges, &churn, &coverage);

    let artifacts = Artifacts::in_dir(&out_dir);
    let parent = previous_digest(&artifacts.manifest);
    let entries = manifest::build_entries(&sources, &metrics, &edges);
    let (text, manifest) = manifest::commit(
        &config.project_name(root),
        &config.project.version,
        date,
        parent,
        entries,
    );

    let index = Index::build(&sources, &metrics, &edges);
    let validation = validate::validate(&text, &index, root, &config.report)?;
    if !validation.digest_match {
        events.push(RunEvent::DigestMismatch);
    }

    write_all(
        &out_dir,
        &[
            (&artifacts.manifest, text),
            (&artifacts.index, index.to_json()?),
            (&artifacts.validation, validation.to_json()?),
        ],
    )?;

    events.push(RunEvent::ArtifactsWritten {
        dir: out_dir.display().to_string(),
        files: manifest.entries.len(),
    });
    if config.output.event_log {
        EventLogger::new(&out_dir).log_all(&events);
    }

    Ok(RunOutcome {
        artifacts,
        manifest,
        validation,
        events,
        source: enumeration.source,
    })
}

fn without_output_dir(files: Vec<String>, root: &Path, out_dir: &Path) -> Vec<String> {
    let Ok(rel) = out_dir.strip_prefix(root) else {
        return files;
    };
    let prefix = format!("{}/", rel.to_string_lossy().replace('\\', "/"));
    if prefix == "/" {
        return files;
    }
    files.into_iter().filter(|f| !f.starts_with(&prefix)).collect()
}

fn history(root: &Path, config: &Config) -> std::result::Result<ChurnMap, RunEvent> {
    if !config.analysis.use_git {
        return Ok(ChurnMap::default());
    }
    churn::extract_churn(root, config.git_timeout()).map_err(|e| RunEvent::ChurnUnavailable {
        reason: e.to_string(),
    })
}

fn load_coverage(root: &Path, config: &Config, events: &mut Vec<RunEvent>) -> CoverageMap {
    let Some(path) = config.coverage_path(root) else {
        return CoverageMap::default();
    };
    let base = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    CoverageMap::load(&path, &base).unwrap_or_else(|e| {
        events.push(RunEvent::CoverageUnavailable {
            reason: e.to_string(),
        });
        CoverageMap::default()
    })
}

/// Digest of the manifest currently at `path`, if it is a readable manifest.
fn previous_digest(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let previous = manifest::parse(&text).ok()?;
    is_sha256_hex(&previous.header.digest).then_some(previous.header.digest)
}

/// Writes every artifact to a temp file first and swaps them in only once all
/// of them are on disk. Either every target is replaced or none is.
fn write_all(out_dir: &Path, artifacts: &[(&PathBuf, String)]) -> Result<()> {
    fs::create_dir_all(out_dir).map_err(|e| MothError::io(e, out_dir))?;

    let mut staged: Vec<(PathBuf, &PathBuf)> = Vec::with_capacity(artifacts.len());
    for (target, content) in artifacts {
        let tmp = temp_path(target);
        if let Err(e) = fs::write(&tmp, content) {
            discard(&staged);
            let _ = fs::remove_file(&tmp);
            return Err(MothError::io(e, tmp));
        }
        staged.push((tmp, *target));
    }

    swap_in(&staged)
}

/// Moves existing targets aside, renames every temp file into place and drops
/// the backups. On any failure the previous targets are restored.
fn swap_in(staged: &[(PathBuf, &PathBuf)]) -> Result<()> {
    let mut backups: Vec<(PathBuf, &PathBuf)> = Vec::new();
    for (_, target) in staged {
        if target.exists() {
            let backup = backup_path(target);
            if let Err(e) = fs::rename(target, &backup) {
                restore(&[], &backups);
                discard(staged);
                return Err(MothError::io(e, *target));
            }
            backups.push((backup, *target));
        }
    }

    let mut placed: Vec<&PathBuf> = Vec::with_capacity(staged.len());
    for (tmp, target) in staged {
        if let Err(e) = fs::rename(tmp, target) {
            restore(&placed, &backups);
            discard(staged);
            return Err(MothError::io(e, *target));
        }
        placed.push(*target);
    }

    for (backup, _) in &backups {
        let _ = fs::remove_file(backup);
    }
    Ok(())
}

fn restore(placed: &[&PathBuf], backups: &[(PathBuf, &PathBuf)]) {
    for target in placed {
        let _ = fs::remove_file(target);
    }
    for (backup, target) in backups {
        let _ = fs::rename(backup, target);
    }
}

fn sibling(target: &Path, suffix: &str) -> PathBuf {
    let name = target
        .file_name()
        .map_or_else(|| "artifact".to_string(), |n| n.to_string_lossy().to_string());
    target.with_file_name(format!(".{name}.{suffix}"))
}

fn temp_path(target: &Path) -> PathBuf {
    sibling(target, "tmp")
}

fn backup_path(target: &Path) -> PathBuf {
    sibling(target, "bak")
}

fn discard(staged: &[(PathBuf, &PathBuf)]) {
    for (tmp, _) in staged {
        let _ = fs::remove_file(tmp);
    }
}
