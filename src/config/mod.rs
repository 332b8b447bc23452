// src/config/mod.rs
pub mod io;
pub mod types;

pub use self::types::{AnalysisConfig, Config, MothToml, OutputConfig, ProjectConfig, ReportConfig};

use crate::error::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-repository configuration file.
pub const CONFIG_FILE: &str = "moth.toml";

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `moth.toml` from `root` if present. A missing file yields defaults.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed, or an
    /// `exclude` pattern is not a valid regex.
    pub fn load(root: &Path) -> Result<Self> {
        let toml = io::load_toml_config(root)?;
        Self::from_toml(toml)
    }

    /// Builds a runtime config from an already parsed file.
    ///
    /// # Errors
    /// Returns error if an `exclude` pattern is not a valid regex.
    pub fn from_toml(toml: MothToml) -> Result<Self> {
        let exclude_patterns = io::compile_patterns(&toml.analysis.exclude)?;
        Ok(Self {
            exclude_patterns,
            verbose: false,
            project: toml.project,
            output: toml.output,
            analysis: toml.analysis,
            report: toml.report,
        })
    }

    /// Project name for the manifest header; falls back to the root directory name.
    #[must_use]
    pub fn project_name(&self, root: &Path) -> String {
        if let Some(name) = self.project.name.as_ref().filter(|n| !n.trim().is_empty()) {
            return name.clone();
        }
        root.canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "project".to_string())
    }

    #[must_use]
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        if self.output.dir.is_absolute() {
            self.output.dir.clone()
        } else {
            root.join(&self.output.dir)
        }
    }

    #[must_use]
    pub fn coverage_path(&self, root: &Path) -> Option<PathBuf> {
        self.analysis.coverage.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                root.join(p)
            }
        })
    }

    #[must_use]
    pub fn parse_timeout(&self) -> Duration {
        Duration::from_millis(self.analysis.parse_timeout_ms)
    }

    #[must_use]
    pub fn git_timeout(&self) -> Duration {
        Duration::from_millis(self.analysis.git_timeout_ms)
    }
}
