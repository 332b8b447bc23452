// src/cli/handlers.rs
use crate::cli::args::RunArgs;
use crate::config::Config;
use crate::events::RunEvent;
use crate::exit::MothExit;
use crate::manifest;
use crate::pipeline::{self, MANIFEST_FILE};
use crate::reporting;
use crate::utils::normalize_rel;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

fn default_manifest() -> PathBuf {
    Config::default().output.dir.join(MANIFEST_FILE)
}

/// Loads `moth.toml` under `root`, falling back to defaults if it is broken.
/// The fallback is returned as a `ConfigIgnored` event for the run to record.
fn load_config(root: &Path, args: &RunArgs) -> (Config, Option<RunEvent>) {
    let (mut config, ignored) = match Config::load(root) {
        Ok(config) => (config, None),
        Err(e) => (
            Config::default(),
            Some(RunEvent::ConfigIgnored {
                reason: e.to_string(),
            }),
        ),
    };
    config.verbose = args.verbose;
    if let Some(out) = &args.out {
        config.output.dir.clone_from(out);
    }
    if let Some(name) = &args.project {
        config.project.name = Some(name.clone());
    }
    if args.no_git {
        config.analysis.use_git = false;
    }
    if let Some(cov) = &args.coverage {
        config.analysis.coverage = Some(cov.clone());
    }
    (config, ignored)
}

/// Handles the run command.
///
/// # Errors
/// Returns error if the root is missing or the artifacts cannot be written.
pub fn handle_run(args: &RunArgs) -> Result<MothExit> {
    let (config, ignored) = load_config(&args.root, args);
    let date = chrono::Utc::now().format("%Y-%m-%d").to_string();

    let outcome = pipeline::run_with(&args.root, &config, &date, ignored.into_iter().collect())
        .with_context(|| format!("run failed for {}", args.root.display()))?;

    if args.json {
        println!("{}", outcome.validation.to_json()?);
    } else {
        reporting::print_run(&outcome, config.verbose);
    }
    Ok(MothExit::Success)
}

/// Handles the verify command.
///
/// # Errors
/// Returns error if the manifest cannot be read or is not a manifest.
pub fn handle_verify(path: Option<&Path>) -> Result<MothExit> {
    let path = path.map_or_else(default_manifest, Path::to_path_buf);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let (parsed, verification) = manifest::verify(&text)?;

    reporting::print_verification(&path.display().to_string(), &parsed, &verification);
    if verification.ok() {
        Ok(MothExit::Success)
    } else {
        Ok(MothExit::VerifyFailed)
    }
}

/// Handles the show command.
///
/// # Errors
/// Returns error if the manifest cannot be read or has no entry for `entry_path`.
pub fn handle_show(entry_path: &str, manifest_path: Option<&Path>) -> Result<MothExit> {
    let path = manifest_path.map_or_else(default_manifest, Path::to_path_buf);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let parsed = manifest::parse(&text)?;

    let wanted = normalize_rel(entry_path);
    let entry = parsed
        .entry(&wanted)
        .ok_or_else(|| anyhow!("no entry for {wanted} in {}", path.display()))?;
    reporting::print_entry(entry);
    Ok(MothExit::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(root: &Path) -> RunArgs {
        RunArgs {
            root: root.to_path_buf(),
            out: Some(PathBuf::from("artifacts")),
            project: Some("demo".into()),
            no_git: true,
            coverage: None,
            verbose: false,
            json: true,
        }
    }

    #[test]
    fn flags_override_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("moth.toml"),
            "[project]\nname = \"file\"\n[analysis]\nuse_git = true\n",
        )
        .unwrap();
        let (config, ignored) = load_config(dir.path(), &args(dir.path()));
        assert!(ignored.is_none());
        assert_eq!(config.project.name.as_deref(), Some("demo"));
        assert_eq!(config.output.dir, PathBuf::from("artifacts"));
        assert!(!config.analysis.use_git);
    }

    #[test]
    fn broken_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("moth.toml"), "[project\n").unwrap();
        let (config, ignored) = load_config(dir.path(), &args(dir.path()));
        assert_eq!(config.report.top_n, 10);
        assert!(matches!(ignored, Some(RunEvent::ConfigIgnored { .. })));

        assert_eq!(handle_run(&args(dir.path())).unwrap(), MothExit::Success);
        let log = fs::read_to_string(dir.path().join("artifacts").join("events.jsonl")).unwrap();
        assert!(log.contains("\"event\":\"config_ignored\""), "{log}");
    }

    #[test]
    fn run_then_verify_and_show() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lib.py"), "\"\"\"Helpers.\"\"\"\nimport os\n").unwrap();
        assert_eq!(handle_run(&args(dir.path())).unwrap(), MothExit::Success);

        let manifest = dir.path().join("artifacts").join(MANIFEST_FILE);
        assert_eq!(handle_verify(Some(&manifest)).unwrap(), MothExit::Success);
        assert_eq!(handle_show("./lib.py", Some(&manifest)).unwrap(), MothExit::Success);
        assert!(handle_show("nope.py", Some(&manifest)).is_err());

        let text = fs::read_to_string(&manifest).unwrap();
        fs::write(&manifest, text.replace("project=demo", "project=evil")).unwrap();
        assert_eq!(handle_verify(Some(&manifest)).unwrap(), MothExit::VerifyFailed);
    }
}
