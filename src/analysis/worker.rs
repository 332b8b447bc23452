//! Worker for a single file: read, hash, measure, extract.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::extract::{anchor_rust_modules, ExtractorRegistry};
use super::{complexity, docs, SourceFile};
use crate::constants::BIN_EXT_PATTERN;
use crate::events::RunEvent;
use crate::lang::Lang;
use crate::utils::compute_sha256;

static BIN_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(BIN_EXT_PATTERN).ok());

/// The record for one file plus the degradation it hit, if any.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file: SourceFile,
    pub event: Option<RunEvent>,
}

#[must_use]
pub fn is_binary_path(rel: &str) -> bool {
    BIN_RE.as_ref().is_some_and(|r| r.is_match(rel))
}

/// Analyzes `rel` under `root`. Never fails: unreadable files come back as degraded
/// records with a `FileDegraded` event.
#[must_use]
pub fn analyze_file(root: &Path, rel: &str, registry: &ExtractorRegistry) -> FileOutcome {
    let full = root.join(rel);
    let bytes = match fs::read(&full) {
        Ok(b) => b,
        Err(e) => {
            return FileOutcome {
                file: SourceFile::degraded(rel),
                event: Some(RunEvent::FileDegraded {
                    path: rel.to_string(),
                    reason: e.to_string(),
                }),
            }
        }
    };

    let hash = compute_sha256(&bytes);
    let size = bytes.len() as u64;
    let modified = modified_rfc3339(&full);
    let language = Lang::from_path(rel);

    if is_binary_path(rel) {
        return FileOutcome {
            file: SourceFile {
                path: rel.to_string(),
                hash,
                size,
                loc: 0,
                modified,
                language: None,
                imports: Vec::new(),
                symbols: Vec::new(),
                complexity: 1,
                doc: None,
                binary: true,
                degraded: false,
            },
            event: None,
        };
    }

    let text = String::from_utf8_lossy(&bytes);
    let mut event = None;
    let (imports, symbols) = match language {
        Some(lang) => {
            let outcome = registry.extract(&text, lang);
            if let Some(reason) = outcome.fallback_reason {
                event = Some(RunEvent::ParseFallback {
                    path: rel.to_string(),
                    reason: reason.to_string(),
                });
            }
            let imports = if lang == Lang::Rust {
                anchor_rust_modules(rel, outcome.extraction.imports)
            } else {
                outcome.extraction.imports
            };
            (imports, outcome.extraction.symbols)
        }
        None => (Vec::new(), Vec::new()),
    };

    FileOutcome {
        file: SourceFile {
            path: rel.to_string(),
            hash,
            size,
            loc: text.lines().count(),
            modified,
            language,
            imports,
            symbols,
            complexity: complexity::score(&text),
            doc: docs::leading_comment(&text, language),
            binary: false,
            degraded: false,
        },
        event,
    }
}

fn modified_rfc3339(path: &Path) -> String {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| DateTime::<Utc>::from(t).to_rfc3339())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (rel, body) in files {
            let p = dir.path().join(rel);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, body).unwrap();
        }
        dir
    }

    #[test]
    fn text_file_is_measured() {
        let dir = fixture(&[("app/server.py", "\"\"\"Server\"\"\"\nfrom .routes import r\n\ndef main():\n    if r:\n        pass\n")]);
        let out = analyze_file(dir.path(), "app/server.py", &ExtractorRegistry::empty());
        assert!(out.event.is_none());
        let f = out.file;
        assert_eq!(f.loc, 6);
        assert_eq!(f.size, 71);
        assert_eq!(f.imports, vec!["./routes"]);
        assert_eq!(f.symbols, vec!["main"]);
        assert_eq!(f.complexity, 2);
        assert_eq!(f.doc.as_deref(), Some("Server"));
        assert_eq!(f.language, Some(Lang::Python));
        assert!(!f.modified.is_empty());
    }

    #[test]
    fn hash_depends_only_on_content() {
        let dir = fixture(&[("a/x.ts", "export const a = 1;\n"), ("b/y.js", "export const a = 1;\n")]);
        let reg = ExtractorRegistry::empty();
        let x = analyze_file(dir.path(), "a/x.ts", &reg).file;
        let y = analyze_file(dir.path(), "b/y.js", &reg).file;
        assert_eq!(x.hash, y.hash);
        assert_eq!(x.hash, compute_sha256(b"export const a = 1;\n"));
    }

    #[test]
    fn binary_files_are_not_parsed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("logo.png"), [0x89, b'P', b'N', b'G', 0, 1, 2]).unwrap();
        let f = analyze_file(dir.path(), "logo.png", &ExtractorRegistry::empty()).file;
        assert!(f.binary);
        assert_eq!(f.size, 7);
        assert_eq!(f.loc, 0);
        assert_eq!(f.complexity, 1);
        assert!(f.imports.is_empty());
        assert_eq!(f.hash.len(), 64);
    }

    #[test]
    fn unreadable_file_degrades() {
        let dir = TempDir::new().unwrap();
        let out = analyze_file(dir.path(), "gone.rs", &ExtractorRegistry::empty());
        assert!(out.file.degraded);
        assert!(matches!(out.event, Some(RunEvent::FileDegraded { .. })));
    }

    #[test]
    fn unknown_language_still_gets_metrics() {
        let dir = fixture(&[("README", "# title\nsome words\n")]);
        let f = analyze_file(dir.path(), "README", &ExtractorRegistry::empty()).file;
        assert_eq!(f.language, None);
        assert_eq!(f.loc, 2);
        assert!(f.imports.is_empty());
        assert_eq!(f.complexity, 1);
    }
}
