//! Manifest text format: escaping, mixed file kinds, coverage, round trips.

use std::fs;

use moth_core::config::Config;
use moth_core::manifest::{self, commit, Entry, EntryMetrics};
use moth_core::pipeline;
use proptest::prelude::*;
use tempfile::TempDir;

#[test]
fn structural_characters_survive_a_run() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("pkg")).unwrap();
    fs::create_dir_all(root.join("tests")).unwrap();
    fs::write(
        root.join("pkg/util.py"),
        "\"\"\"Split a|b; keep [x] {y}, z.\"\"\"\nimport os\n\ndef split(s):\n    return s\n",
    )
    .unwrap();
    fs::write(root.join("tests/test_util.py"), "def test_split():\n    assert True\n").unwrap();
    fs::write(root.join("logo.png"), [0x89u8, b'P', b'N', b'G', 0, 1, 2]).unwrap();
    fs::write(
        root.join("coverage.json"),
        r#"{"files": {"pkg/util.py": {"summary": {"percent_covered": 42.4}}}}"#,
    )
    .unwrap();

    let mut config = Config::default();
    config.analysis.use_git = false;
    config.analysis.coverage = Some("coverage.json".into());
    let outcome = pipeline::run(root, &config, "2024-05-01").unwrap();
    assert!(outcome.validation.digest_match);

    let text = fs::read_to_string(&outcome.artifacts.manifest).unwrap();
    assert!(text.contains(r"doc=Split a\|b\; keep \[x\] \{y\}\, z."));
    let parsed = manifest::parse(&text).unwrap();

    let util = parsed.entry("pkg/util.py").unwrap();
    assert_eq!(util.doc, "Split a|b; keep [x] {y}, z.");
    assert_eq!(util.deps, vec!["ext:os"]);
    assert_eq!(util.metrics.coverage, Some(42));
    assert_eq!(util.summary, "pkg python util; untested");

    let test = parsed.entry("tests/test_util.py").unwrap();
    assert!(test.summary.starts_with("test python test_util"));
    assert_eq!(test.metrics.coverage, None);

    let logo = parsed.entry("logo.png").unwrap();
    assert_eq!(logo.summary, "root binary logo");
    assert_eq!((logo.metrics.loc, logo.metrics.complexity), (0, 1));
    assert!(logo.symbols.is_empty());
}

#[test]
fn long_docs_are_capped() {
    let long = "word ".repeat(100);
    let entries = vec![entry("a.rs".into(), long.trim().to_string(), Vec::new())];
    let (_, m) = commit("p", "1.0", "2024-01-01", None, entries);
    // commit renders what it is given; capping happens when entries are built.
    assert_eq!(m.entries[0].doc.len(), long.trim().len());

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.rs"), format!("//! {long}\nfn main() {{}}\n")).unwrap();
    let mut config = Config::default();
    config.analysis.use_git = false;
    let outcome = pipeline::run(dir.path(), &config, "2024-01-01").unwrap();
    let doc = &outcome.manifest.entry("a.rs").unwrap().doc;
    assert_eq!(doc.chars().count(), 160);
    assert!(doc.ends_with("..."));
}

fn entry(path: String, doc: String, deps: Vec<String>) -> Entry {
    Entry {
        path,
        metrics: EntryMetrics {
            fan_in: 0,
            fan_out: deps.len(),
            depth: 1,
            churn: 0,
            loc: 1,
            complexity: 1,
            coverage: None,
        },
        deps,
        symbols: vec!["main".into()],
        doc,
        summary: "root rust a".into(),
    }
}

proptest! {
    #[test]
    fn committed_manifests_parse_and_verify(
        paths in proptest::collection::btree_set("[a-z][a-z0-9_./|;,\\[\\]{}-]{0,15}", 1..6),
        doc in "[ -~]{1,40}",
        dep in "[ -~]{1,20}",
    ) {
        let entries: Vec<Entry> = paths
            .into_iter()
            .map(|p| entry(p, doc.clone(), vec![format!("ext:{dep}")]))
            .collect();
        let (text, committed) = commit("proj;x", "1.0", "2024-01-01", None, entries);
        let (parsed, v) = manifest::verify(&text).unwrap();
        prop_assert!(v.ok());
        prop_assert_eq!(parsed, committed);
    }
}
