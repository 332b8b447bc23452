//! End-to-end runs over small fixture repositories.

use std::fs;
use std::path::Path;
use std::process::Command;

use moth_core::config::Config;
use moth_core::events::RunEvent;
use moth_core::index::Index;
use moth_core::manifest::{self, Manifest};
use moth_core::pipeline::{self, INDEX_FILE, MANIFEST_FILE, VALIDATION_FILE};
use tempfile::TempDir;

const DATE: &str = "2024-05-01";

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let files = [
        ("a.ts", "// Entry point.\nimport { b } from './b';\nexport const a = b;\n"),
        ("b.ts", "import { c } from './c';\nexport const b = c;\n"),
        ("c.ts", "export const c = 1;\n"),
        ("x.ts", "import { y } from './y';\nexport const x = 1;\n"),
        ("y.ts", "import { x } from './x';\nexport const y = 2;\n"),
        ("d.ts", "import React from 'react';\nimport { g } from './gone';\n"),
    ];
    for (name, body) in files {
        fs::write(dir.path().join(name), body).unwrap();
    }
    dir
}

fn config() -> Config {
    let mut config = Config::default();
    config.analysis.use_git = false;
    config.project.name = Some("fixture".into());
    config
}

fn read_manifest(root: &Path) -> (String, Manifest) {
    let text = fs::read_to_string(root.join(".moth").join(MANIFEST_FILE)).unwrap();
    let parsed = manifest::parse(&text).unwrap();
    (text, parsed)
}

#[test]
fn chain_cycle_and_dangling_imports() {
    let dir = fixture();
    let outcome = pipeline::run(dir.path(), &config(), DATE).unwrap();
    assert!(outcome.validation.is_clean(), "{:?}", outcome.validation);

    let (_, m) = read_manifest(dir.path());
    let depth = |p: &str| m.entry(p).unwrap().metrics.depth;
    assert_eq!((depth("a.ts"), depth("b.ts"), depth("c.ts")), (3, 2, 1));
    assert_eq!((depth("x.ts"), depth("y.ts")), (2, 2));
    assert_eq!(depth("d.ts"), 1);

    let d = m.entry("d.ts").unwrap();
    assert_eq!(d.deps, vec!["missing:gone", "ext:react"]);
    assert_eq!(d.metrics.fan_out, 2);
    assert_eq!(d.metrics.fan_in, 0);

    // External and missing targets count toward fan-out only.
    let c = m.entry("c.ts").unwrap();
    assert_eq!((c.metrics.fan_in, c.metrics.fan_out), (1, 0));
    assert_eq!(m.entry("a.ts").unwrap().doc, "Entry point.");
    assert_eq!(m.entry("c.ts").unwrap().doc, "(undocumented)");
}

#[test]
fn writes_all_artifacts() {
    let dir = fixture();
    pipeline::run(dir.path(), &config(), DATE).unwrap();
    let out = dir.path().join(".moth");
    for name in [MANIFEST_FILE, INDEX_FILE, VALIDATION_FILE] {
        assert!(out.join(name).is_file(), "missing {name}");
    }
    let index = Index::from_json(&fs::read_to_string(out.join(INDEX_FILE)).unwrap()).unwrap();
    assert_eq!(index.files.len(), 6);
    assert_eq!(index.files["b.ts"].deps, vec!["c.ts"]);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(VALIDATION_FILE)).unwrap()).unwrap();
    assert_eq!(report["digest_match"], true);
    assert_eq!(report["summary"]["total_files"], 6);
}

#[test]
fn second_run_chains_parent_digest() {
    let dir = fixture();
    let first = pipeline::run(dir.path(), &config(), DATE).unwrap();
    assert!(first.manifest.header.parent.is_none());

    let second = pipeline::run(dir.path(), &config(), DATE).unwrap();
    assert_eq!(
        second.manifest.header.parent.as_deref(),
        Some(first.manifest.header.digest.as_str())
    );

    let (text, _) = read_manifest(dir.path());
    let (_, v) = manifest::verify(&text).unwrap();
    assert!(v.ok());
}

#[test]
fn output_is_stable_for_same_input() {
    let one = fixture();
    let two = fixture();
    pipeline::run(one.path(), &config(), DATE).unwrap();
    pipeline::run(two.path(), &config(), DATE).unwrap();
    let (a, _) = read_manifest(one.path());
    let (b, _) = read_manifest(two.path());
    assert_eq!(a, b);
}

#[test]
fn content_hash_ignores_location_and_mtime() {
    let one = fixture();
    let two = fixture();
    fs::write(two.path().join("c.ts"), "export const c = 1;\n").unwrap();
    pipeline::run(one.path(), &config(), DATE).unwrap();
    pipeline::run(two.path(), &config(), DATE).unwrap();

    let hash = |root: &Path| {
        let text = fs::read_to_string(root.join(".moth").join(INDEX_FILE)).unwrap();
        Index::from_json(&text).unwrap().files["c.ts"].hash.clone()
    };
    assert_eq!(hash(one.path()), hash(two.path()));
}

#[test]
fn metrics_survive_round_trip() {
    let dir = fixture();
    let outcome = pipeline::run(dir.path(), &config(), DATE).unwrap();
    let (_, parsed) = read_manifest(dir.path());
    assert_eq!(parsed, outcome.manifest);
}

#[test]
fn missing_root_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("absent");
    assert!(pipeline::run(&root, &config(), DATE).is_err());
    assert!(!root.exists());
}

#[test]
fn tampered_entry_fails_verification() {
    let dir = fixture();
    pipeline::run(dir.path(), &config(), DATE).unwrap();
    let (text, _) = read_manifest(dir.path());
    let tampered = text.replacen("d=3", "d=4", 1);
    assert_ne!(tampered, text);
    let (_, v) = manifest::verify(&tampered).unwrap();
    assert!(!v.checksum_match);
    assert!(!v.digest_match);
}

#[test]
fn only_the_meta_line_depends_on_the_date() {
    let one = fixture();
    let two = fixture();
    pipeline::run(one.path(), &config(), "2024-05-01").unwrap();
    pipeline::run(two.path(), &config(), "2024-06-30").unwrap();
    let (a, _) = read_manifest(one.path());
    let (b, _) = read_manifest(two.path());
    let differing: Vec<usize> = a
        .lines()
        .zip(b.lines())
        .enumerate()
        .filter(|(_, (x, y))| x != y)
        .map(|(i, _)| i + 1)
        .collect();
    assert_eq!(differing, vec![2]);
}

#[test]
fn rust_modules_resolve_in_both_layouts() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src/graph")).unwrap();
    fs::create_dir_all(root.join("src/net")).unwrap();
    let files = [
        ("src/lib.rs", "pub mod graph;\npub mod net;\n"),
        ("src/graph.rs", "pub mod metrics;\n"),
        ("src/graph/metrics.rs", "pub fn depth() -> usize { 1 }\n"),
        ("src/net/mod.rs", "mod tcp;\n"),
        ("src/net/tcp.rs", "pub fn connect() {}\n"),
    ];
    for (name, body) in files {
        fs::write(root.join(name), body).unwrap();
    }

    let outcome = pipeline::run(root, &config(), DATE).unwrap();
    let deps = |p: &str| outcome.manifest.entry(p).unwrap().deps.clone();
    assert_eq!(deps("src/lib.rs"), vec!["src/graph.rs", "src/net/mod.rs"]);
    assert_eq!(deps("src/graph.rs"), vec!["src/graph/metrics.rs"]);
    assert_eq!(deps("src/net/mod.rs"), vec!["src/net/tcp.rs"]);
    assert_eq!(outcome.manifest.entry("src/lib.rs").unwrap().metrics.depth, 3);
}

fn git(root: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .arg("-C")
        .arg(root)
        .args(args)
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .output()
        .is_ok_and(|o| o.status.success())
}

fn committed_fixture() -> Option<TempDir> {
    let dir = fixture();
    let root = dir.path();
    let ok = git(root, &["init", "-q"])
        && git(root, &["config", "user.email", "dev@example.com"])
        && git(root, &["config", "user.name", "Dev"])
        && git(root, &["add", "."])
        && git(root, &["commit", "-q", "-m", "init"]);
    ok.then_some(dir)
}

fn churn_unavailable(events: &[RunEvent]) -> bool {
    events
        .iter()
        .any(|e| matches!(e, RunEvent::ChurnUnavailable { .. }))
}

#[test]
fn history_is_read_from_git() {
    let Some(dir) = committed_fixture() else {
        return;
    };
    let mut config = config();
    config.analysis.use_git = true;
    let outcome = pipeline::run(dir.path(), &config, DATE).unwrap();
    assert!(!churn_unavailable(&outcome.events));
    assert_eq!(outcome.manifest.entry("a.ts").unwrap().metrics.churn, 1);
}

#[test]
fn history_timeout_degrades_to_zero_churn() {
    let Some(dir) = committed_fixture() else {
        return;
    };
    let mut config = config();
    config.analysis.use_git = true;
    config.analysis.git_timeout_ms = 0;
    let outcome = pipeline::run(dir.path(), &config, DATE).unwrap();
    assert!(churn_unavailable(&outcome.events));
    assert!(outcome.manifest.entries.iter().all(|e| e.metrics.churn == 0));
    assert!(outcome.validation.digest_match);
}

#[test]
fn non_repository_root_warns_about_history() {
    let dir = fixture();
    let mut config = config();
    config.analysis.use_git = true;
    let outcome = pipeline::run(dir.path(), &config, DATE).unwrap();
    assert!(churn_unavailable(&outcome.events));
    assert!(outcome.warnings().any(|e| matches!(e, RunEvent::ChurnUnavailable { .. })));
    assert_eq!(outcome.manifest.entries.len(), 6);
}
