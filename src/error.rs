// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MothError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Repository root is missing or unreadable: {0}")]
    RootMissing(PathBuf),

    #[error("Malformed manifest at line {line}: {reason}")]
    ManifestParse { line: usize, reason: String },

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl MothError {
    /// Wraps an I/O error with the path it happened on.
    #[must_use]
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }

    #[must_use]
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::ManifestParse {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MothError>;

// Allow `?` on std::io::Error by converting to MothError::Io with unknown path.
impl From<std::io::Error> for MothError {
    fn from(source: std::io::Error) -> Self {
        MothError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}
