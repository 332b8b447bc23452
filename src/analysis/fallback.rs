//! Pattern-based extraction used when no syntax extractor is registered for a
//! language, or when it fails. Approximate by design and infallible: a pattern
//! that does not compile simply contributes nothing.

use std::sync::LazyLock;

use regex::Regex;

use super::extract::Extraction;
use crate::lang::Lang;

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

// Import forms, JS family. Order matters only for readability: results are sorted later.
static JS_IMPORT_FROM: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"(?m)^\s*import\s+(?:type\s+)?[^'";]*?\bfrom\s*['"]([^'"]+)['"]"#));
static JS_IMPORT_BARE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"(?m)^\s*import\s*['"]([^'"]+)['"]"#));
static JS_EXPORT_FROM: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"(?m)^\s*export\s+[^'";]*?\bfrom\s*['"]([^'"]+)['"]"#));
static JS_REQUIRE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#));
static JS_DYNAMIC: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"\bimport\s*\(\s*['"]([^'"]+)['"]\s*\)"#));

static PY_FROM: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?m)^\s*from\s+(\.+[\w.]*|[\w.]+)\s+import\b"));
static PY_IMPORT: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?m)^\s*import\s+([\w.]+(?:\s+as\s+\w+)?(?:\s*,\s*[\w.]+(?:\s+as\s+\w+)?)*)\s*(?:#.*)?$"));

static RUST_USE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+([^;{]+?)(?:::\{[^;]*)?;"));
static RUST_MOD: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?mod\s+(\w+)\s*;"));

static GO_SINGLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"(?m)^\s*import\s+(?:[\w.]+\s+)?"([^"]+)""#));
static GO_BLOCK: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?s)\bimport\s*\((.*?)\)"));
static GO_BLOCK_ITEM: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r#""([^"]+)""#));

static JAVA_IMPORT: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?m)^\s*import\s+(?:static\s+)?([\w.]+(?:\.\*)?)\s*;"));

static C_INCLUDE_LOCAL: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"(?m)^\s*#\s*include\s*"([^"]+)""#));
static C_INCLUDE_SYSTEM: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?m)^\s*#\s*include\s*<([^>]+)>"));

// Exported symbols.
static JS_EXPORT_DECL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?m)^\s*export\s+(?:default\s+)?(?:declare\s+)?(?:async\s+)?(?:abstract\s+)?(?:function\*?|class|const|let|var|interface|type|enum)\s+([A-Za-z_$][\w$]*)")
});
static PY_TOP_DEF: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?m)^(?:async\s+)?(?:def|class)\s+(\w+)"));
static RUST_PUB_ITEM: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?m)^(?:pub(?:\([^)]*\))?\s+)(?:async\s+)?(?:unsafe\s+)?(?:fn|struct|enum|trait|type|const|static|mod|union)\s+(\w+)")
});
static GO_EXPORTED: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?m)^(?:func\s+(?:\([^)]*\)\s*)?|type\s+)([A-Z]\w*)"));
static JAVA_PUBLIC_TYPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?m)^\s*public\s+(?:(?:final|abstract|static|sealed)\s+)*(?:class|interface|enum|record)\s+(\w+)")
});

/// Extracts imports and symbols for `lang` using text patterns.
#[must_use]
pub fn extract(source: &str, lang: Lang) -> Extraction {
    let mut out = Extraction::default();
    match lang {
        Lang::TypeScript | Lang::Tsx | Lang::JavaScript => {
            for re in [&JS_IMPORT_FROM, &JS_IMPORT_BARE, &JS_EXPORT_FROM, &JS_REQUIRE, &JS_DYNAMIC] {
                capture_all(re, source, &mut out.imports);
            }
            capture_all(&JS_EXPORT_DECL, source, &mut out.symbols);
        }
        Lang::Python => {
            capture_all(&PY_FROM, source, &mut out.imports);
            python_plain_imports(source, &mut out.imports);
            capture_all(&PY_TOP_DEF, source, &mut out.symbols);
        }
        Lang::Rust => {
            for raw in captures(&RUST_USE, source) {
                let path = raw.split(" as ").next().unwrap_or(&raw);
                out.imports.push(path.trim().to_string());
            }
            for name in captures(&RUST_MOD, source) {
                out.imports.push(format!("./{name}"));
            }
            capture_all(&RUST_PUB_ITEM, source, &mut out.symbols);
        }
        Lang::Go => {
            capture_all(&GO_SINGLE, source, &mut out.imports);
            for block in captures(&GO_BLOCK, source) {
                capture_all(&GO_BLOCK_ITEM, &block, &mut out.imports);
            }
            capture_all(&GO_EXPORTED, source, &mut out.symbols);
        }
        Lang::Java => {
            capture_all(&JAVA_IMPORT, source, &mut out.imports);
            capture_all(&JAVA_PUBLIC_TYPE, source, &mut out.symbols);
        }
        Lang::C | Lang::Cpp => {
            for local in captures(&C_INCLUDE_LOCAL, source) {
                // Quoted includes are relative to the including file.
                if local.starts_with("./") || local.starts_with("../") {
                    out.imports.push(local);
                } else {
                    out.imports.push(format!("./{local}"));
                }
            }
            capture_all(&C_INCLUDE_SYSTEM, source, &mut out.imports);
        }
    }
    out
}

/// First non-empty capture group of every match.
fn captures(re: &LazyLock<Option<Regex>>, text: &str) -> Vec<String> {
    let Some(re) = re.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|c| c.iter().skip(1).flatten().next().map(|m| m.as_str().to_string()))
        .collect()
}

fn capture_all(re: &LazyLock<Option<Regex>>, text: &str, into: &mut Vec<String>) {
    into.extend(captures(re, text));
}

fn python_plain_imports(source: &str, into: &mut Vec<String>) {
    for list in captures(&PY_IMPORT, source) {
        for item in list.split(',') {
            let name = item.split_whitespace().next().unwrap_or("");
            if !name.is_empty() {
                into.push(name.to_string());
            }
        }
    }
}
