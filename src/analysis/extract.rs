//! The extraction capability pair: a primary syntax extractor per language and
//! the pattern fallback that runs whenever the primary is absent or fails.

use std::collections::BTreeSet;
use std::time::Duration;

use thiserror::Error;

use super::fallback;
use super::syntax::TreeSitterExtractor;
use crate::lang::Lang;

/// Imports and exported symbols pulled from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub imports: Vec<String>,
    pub symbols: Vec<String>,
}

impl Extraction {
    /// Sorts and de-duplicates both lists, normalizing import specifiers for `lang`.
    #[must_use]
    pub fn finish(self, lang: Lang) -> Self {
        let imports: BTreeSet<String> = self
            .imports
            .into_iter()
            .filter_map(|raw| normalize_specifier(lang, &raw))
            .collect();
        let symbols: BTreeSet<String> = self
            .symbols
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            imports: imports.into_iter().collect(),
            symbols: symbols.into_iter().collect(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no grammar for {0}")]
    Unsupported(&'static str),
    #[error("grammar rejected: {0}")]
    Grammar(String),
    #[error("parse timed out")]
    Timeout,
    #[error("syntax errors in source")]
    Syntax,
}

/// A language-aware extractor: source text in, imports and symbols out, or an error.
pub trait SyntaxExtractor: Send + Sync {
    fn supports(&self, lang: Lang) -> bool;

    /// # Errors
    /// Returns an error when the text cannot be parsed for `lang`.
    fn extract(&self, source: &str, lang: Lang) -> Result<Extraction, ExtractError>;
}

/// Registered primary extractors. Lookup is by first `supports` match.
pub struct ExtractorRegistry {
    primary: Vec<Box<dyn SyntaxExtractor>>,
}

/// Outcome of a registry lookup: the extraction plus why the fallback ran, if it did
/// after a primary failure.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub extraction: Extraction,
    pub fallback_reason: Option<ExtractError>,
}

impl ExtractorRegistry {
    /// Registry with no primary extractors: every file takes the pattern path.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            primary: Vec::new(),
        }
    }

    /// Registry with the tree-sitter extractor bounded by `timeout` per parse.
    #[must_use]
    pub fn with_tree_sitter(timeout: Duration) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(TreeSitterExtractor::new(timeout)));
        registry
    }

    pub fn register(&mut self, extractor: Box<dyn SyntaxExtractor>) {
        self.primary.push(extractor);
    }

    /// Runs the primary extractor for `lang` if one is registered, else (or on its
    /// failure) the pattern fallback. Never fails.
    #[must_use]
    pub fn extract(&self, source: &str, lang: Lang) -> ExtractOutcome {
        let Some(primary) = self.primary.iter().find(|e| e.supports(lang)) else {
            return ExtractOutcome {
                extraction: fallback::extract(source, lang).finish(lang),
                fallback_reason: None,
            };
        };

        match primary.extract(source, lang) {
            Ok(extraction) => ExtractOutcome {
                extraction: extraction.finish(lang),
                fallback_reason: None,
            },
            Err(e) => ExtractOutcome {
                extraction: fallback::extract(source, lang).finish(lang),
                fallback_reason: Some(e),
            },
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_tree_sitter(Duration::from_secs(2))
    }
}

/// Rewrites language-specific relative module syntax into `./`/`../` path form so
/// the resolver can treat every language alike. Returns `None` for empty specifiers.
///
/// Python: `.routes` becomes `./routes`, `..core.db` becomes `../core/db`, `.` stays `.`.
#[must_use]
pub fn normalize_specifier(lang: Lang, raw: &str) -> Option<String> {
    let spec = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim();
    if spec.is_empty() {
        return None;
    }

    if lang == Lang::Python && spec.starts_with('.') && !spec.starts_with("./") {
        let dots = spec.chars().take_while(|c| *c == '.').count();
        let rest = spec[dots..].replace('.', "/");
        let prefix = if dots == 1 {
            ".".to_string()
        } else {
            vec![".."; dots - 1].join("/")
        };
        return Some(if rest.is_empty() {
            prefix
        } else {
            format!("{prefix}/{rest}")
        });
    }

    Some(spec.to_string())
}

/// Re-anchors `mod x;` specifiers (`./x`) of the Rust file at `path`.
///
/// `lib.rs`, `main.rs` and `mod.rs` own their directory; any other `foo.rs`
/// keeps its child modules in `foo/`.
#[must_use]
pub fn anchor_rust_modules(path: &str, imports: Vec<String>) -> Vec<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let stem = name.strip_suffix(".rs").unwrap_or(name);
    if matches!(stem, "lib" | "main" | "mod") {
        return imports;
    }
    imports
        .into_iter()
        .map(|spec| match spec.strip_prefix("./") {
            Some(child) => format!("./{stem}/{child}"),
            None => spec,
        })
        .collect()
}
