use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name written to the manifest header. Defaults to the root directory name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: None,
            version: default_version(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory, relative to the repository root.
    #[serde(default = "default_out_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_true")]
    pub event_log: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_out_dir(),
            event_log: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Regexes matched against `/`-separated relative paths; matches are skipped.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_true")]
    pub use_git: bool,
    #[serde(default = "default_parse_timeout")]
    pub parse_timeout_ms: u64,
    #[serde(default = "default_git_timeout")]
    pub git_timeout_ms: u64,
    /// coverage.py JSON report, relative to the root.
    #[serde(default)]
    pub coverage: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            use_git: true,
            parse_timeout_ms: default_parse_timeout(),
            git_timeout_ms: default_git_timeout(),
            coverage: None,
        }
    }
}

/// Ranking cutoffs. A file is listed on an axis only if its score reaches the minimum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_n: usize,
    pub min_complexity: f64,
    pub min_churn: f64,
    pub min_size: f64,
    pub min_fan_out: f64,
    pub min_fan_in: f64,
    pub min_hotspot: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            min_complexity: 5.0,
            min_churn: 1.0,
            min_size: 1024.0,
            min_fan_out: 1.0,
            min_fan_in: 1.0,
            min_hotspot: 0.05,
        }
    }
}

/// On-disk shape of `moth.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MothToml {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

const fn default_true() -> bool { true }
const fn default_parse_timeout() -> u64 { 2_000 }
const fn default_git_timeout() -> u64 { 30_000 }
fn default_out_dir() -> PathBuf { PathBuf::from(".moth") }
fn default_version() -> String { "1.0".to_string() }

/// Runtime configuration: the parsed file plus compiled patterns and CLI overrides.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub exclude_patterns: Vec<regex::Regex>,
    pub verbose: bool,
    pub project: ProjectConfig,
    pub output: OutputConfig,
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
}
