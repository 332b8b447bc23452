// src/events.rs
//! Machine-readable run diagnostics.
//!
//! Every non-fatal degradation during a run is recorded as a [`RunEvent`]. The CLI
//! prints them and the [`EventLogger`] appends them to `<out>/events.jsonl`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum RunEvent {
    RunStarted {
        root: String,
        files: usize,
    },
    /// The file could not be read; its record is empty.
    FileDegraded {
        path: String,
        reason: String,
    },
    /// The syntax extractor failed and the regex fallback was used.
    ParseFallback {
        path: String,
        reason: String,
    },
    ChurnUnavailable {
        reason: String,
    },
    CoverageUnavailable {
        reason: String,
    },
    ConfigIgnored {
        reason: String,
    },
    DigestMismatch,
    ArtifactsWritten {
        dir: String,
        files: usize,
    },
}

impl RunEvent {
    /// Whether the event signals degraded analysis (as opposed to progress).
    #[must_use]
    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::RunStarted { .. } | Self::ArtifactsWritten { .. })
    }
}

impl fmt::Display for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunStarted { root, files } => write!(f, "analyzing {files} files in {root}"),
            Self::FileDegraded { path, reason } => write!(f, "{path}: unreadable ({reason})"),
            Self::ParseFallback { path, reason } => {
                write!(f, "{path}: syntax extraction failed, used patterns ({reason})")
            }
            Self::ChurnUnavailable { reason } => write!(f, "no history, churn is 0 ({reason})"),
            Self::CoverageUnavailable { reason } => write!(f, "coverage ignored ({reason})"),
            Self::ConfigIgnored { reason } => write!(f, "moth.toml ignored ({reason})"),
            Self::DigestMismatch => write!(f, "manifest digest does not verify"),
            Self::ArtifactsWritten { dir, files } => write!(f, "wrote {files} entries to {dir}"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MothEvent {
    pub timestamp: i64,
    #[serde(flatten)]
    pub kind: RunEvent,
}

#[derive(Clone)]
pub struct EventLogger {
    log_path: PathBuf,
}

impl EventLogger {
    #[must_use]
    pub fn new(out_dir: &Path) -> Self {
        let log_path = out_dir.join("events.jsonl");
        Self { log_path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn log(&self, kind: &RunEvent) {
        // Best-effort: write errors are dropped.
        if let Ok(json) = Self::serialize_event(kind) {
            let _ = self.append_to_file(&json);
        }
    }

    pub fn log_all(&self, events: &[RunEvent]) {
        for e in events {
            self.log(e);
        }
    }

    fn serialize_event(kind: &RunEvent) -> Result<String> {
        let event = MothEvent {
            timestamp: chrono::Utc::now().timestamp(),
            kind: kind.clone(),
        };
        Ok(serde_json::to_string(&event)?)
    }

    fn append_to_file(&self, line: &str) -> Result<()> {
        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn appends_json_lines() {
        let dir = TempDir::new().unwrap();
        let logger = EventLogger::new(&dir.path().join("out"));
        logger.log(&RunEvent::ChurnUnavailable {
            reason: "not a git repository".into(),
        });
        logger.log(&RunEvent::DigestMismatch);

        let text = fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"event\":\"churn_unavailable\""));
        assert!(lines[1].contains("digest_mismatch"));
    }

    #[test]
    fn progress_events_are_not_warnings() {
        assert!(!RunEvent::RunStarted { root: ".".into(), files: 1 }.is_warning());
        assert!(RunEvent::DigestMismatch.is_warning());
    }
}
