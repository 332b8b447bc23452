// src/config/io.rs
use super::types::MothToml;
use super::CONFIG_FILE;
use crate::error::{MothError, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Reads `moth.toml` under `root`. Absence is not an error.
///
/// # Errors
/// Returns error on unreadable or malformed TOML.
pub fn load_toml_config(root: &Path) -> Result<MothToml> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(MothToml::default());
    }
    let content = fs::read_to_string(&path).map_err(|e| MothError::io(e, &path))?;
    parse_toml(&content)
}

/// Parses TOML text into the config file shape.
///
/// # Errors
/// Returns error on malformed TOML.
pub fn parse_toml(content: &str) -> Result<MothToml> {
    Ok(toml::from_str(content)?)
}

/// Compiles exclude patterns, skipping blank entries.
///
/// # Errors
/// Returns error on the first invalid regex.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| Regex::new(p).map_err(MothError::from))
        .collect()
}
