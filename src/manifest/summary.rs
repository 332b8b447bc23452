//! One-line deterministic summary per file: `<category> <kind> <stem>[; tags]`.

use crate::analysis::SourceFile;
use crate::graph::Metrics;

pub const LARGE_LOC: usize = 500;
pub const COMPLEX_CX: usize = 25;
pub const VOLATILE_CHURN: u32 = 10;
pub const UNTESTED_COVERAGE: u8 = 50;

/// Directory names with a fixed category, checked innermost first.
const DIR_CATEGORIES: &[(&[&str], &str)] = &[
    (&["test", "tests", "__tests__", "spec", "specs", "testing"], "test"),
    (&["doc", "docs", "documentation"], "docs"),
    (&["script", "scripts", "bin", "tools", "tooling"], "tooling"),
    (&["example", "examples", "demo", "demos", "samples"], "example"),
    (&["config", "configs", ".github", "ci", "deploy"], "config"),
];

#[must_use]
pub fn summarize(file: &SourceFile, metrics: &Metrics) -> String {
    let mut line = format!("{} {} {}", category(&file.path), kind(file), file.stem());
    for tag in tags(metrics) {
        line.push_str("; ");
        line.push_str(tag);
    }
    line
}

/// Category from the directory part of `path`: a known directory role, else the
/// parent directory name, else `root`.
#[must_use]
pub fn category(path: &str) -> String {
    let Some((dir, _)) = path.rsplit_once('/') else {
        return "root".to_string();
    };
    let segments: Vec<&str> = dir.split('/').collect();
    for seg in segments.iter().rev() {
        let lower = seg.to_ascii_lowercase();
        if let Some((_, cat)) = DIR_CATEGORIES
            .iter()
            .find(|(names, _)| names.contains(&lower.as_str()))
        {
            return (*cat).to_string();
        }
    }
    segments
        .last()
        .filter(|s| !s.is_empty())
        .map_or_else(|| "root".to_string(), |s| (*s).to_string())
}

fn kind(file: &SourceFile) -> String {
    if file.binary {
        return "binary".to_string();
    }
    if let Some(lang) = file.language {
        return lang.name().to_string();
    }
    let name = file.path.rsplit('/').next().unwrap_or(&file.path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => "file".to_string(),
    }
}

fn tags(m: &Metrics) -> Vec<&'static str> {
    let mut tags = Vec::new();
    if m.loc >= LARGE_LOC {
        tags.push("large");
    }
    if m.complexity >= COMPLEX_CX {
        tags.push("complex");
    }
    if m.churn >= VOLATILE_CHURN {
        tags.push("volatile");
    }
    if m.coverage.is_some_and(|c| c < UNTESTED_COVERAGE) {
        tags.push("untested");
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Lang;

    fn file(path: &str) -> SourceFile {
        let mut f = SourceFile::degraded(path);
        f.degraded = false;
        f
    }

    #[test]
    fn categories() {
        assert_eq!(category("main.rs"), "root");
        assert_eq!(category("backend/api/server.py"), "api");
        assert_eq!(category("tests/unit/test_db.py"), "test");
        assert_eq!(category("docs/guide/intro.md"), "docs");
        assert_eq!(category("/abs.rs"), "root");
    }

    #[test]
    fn plain_summary() {
        let f = file("backend/api/server.py");
        assert_eq!(f.language, Some(Lang::Python));
        assert_eq!(summarize(&f, &Metrics::default()), "api python server");
    }

    #[test]
    fn threshold_tags_in_fixed_order() {
        let f = file("src/engine.rs");
        let m = Metrics {
            loc: 800,
            complexity: 40,
            churn: 12,
            coverage: Some(10),
            ..Metrics::default()
        };
        assert_eq!(summarize(&f, &m), "src rust engine; large; complex; volatile; untested");
    }

    #[test]
    fn kind_for_unknown_and_binary() {
        let mut f = file("assets/logo.png");
        f.binary = true;
        assert_eq!(summarize(&f, &Metrics::default()), "assets binary logo");
        assert_eq!(summarize(&file("Makefile"), &Metrics::default()), "root file Makefile");
        assert_eq!(summarize(&file("conf/app.yaml"), &Metrics::default()), "conf yaml app");
    }
}
