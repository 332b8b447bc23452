// src/churn.rs
//! Change counts per path from one `git log` query.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum ChurnError {
    #[error("git could not be started: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git log exceeded {0:?}")]
    Timeout(Duration),
    #[error("git log failed ({0})")]
    Failed(String),
    #[error("no commits found")]
    NoHistory,
}

/// Path to number of commits that touched it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChurnMap {
    counts: HashMap<String, u32>,
}

impl ChurnMap {
    /// Builds the map from `git log --name-only --format=` output: every non-empty
    /// line is one change to that path.
    #[must_use]
    pub fn from_log(text: &str) -> Self {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            *counts.entry(strip_dot(line).to_string()).or_default() += 1;
        }
        Self { counts }
    }

    /// Change count for `path`; 0 when unknown. A leading `./` is ignored.
    #[must_use]
    pub fn get(&self, path: &str) -> u32 {
        self.counts.get(strip_dot(path)).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

fn strip_dot(path: &str) -> &str {
    path.strip_prefix("./").unwrap_or(path)
}

fn git_cmd() -> Command {
    let mut cmd = Command::new("git");
    cmd.env_remove("GIT_DIR").env_remove("GIT_WORK_TREE");
    cmd
}

/// Runs the history query under `root`, killing it after `timeout`.
///
/// # Errors
/// Returns an error if git is unavailable, fails, times out or reports no history.
/// Callers treat every error as "churn unknown" and carry on.
pub fn extract_churn(root: &Path, timeout: Duration) -> Result<ChurnMap, ChurnError> {
    let mut child = git_cmd()
        .args(["-c", "core.quotePath=false"])
        .arg("-C")
        .arg(root)
        .args(["log", "--name-only", "--format=", "--relative", "--", "."])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    // Drain stdout on a helper thread so a full pipe cannot stall the child.
    let reader = child.stdout.take().map(|mut out| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            out.read_to_end(&mut buf).map(|_| buf)
        })
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ChurnError::Timeout(timeout));
        }
        if let Some(status) = child.try_wait()? {
            break status;
        }
        thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
    };

    if !status.success() {
        return Err(ChurnError::Failed(status.to_string()));
    }

    let bytes = match reader.map(thread::JoinHandle::join) {
        Some(Ok(read)) => read?,
        Some(Err(_)) => return Err(ChurnError::Failed("reader thread panicked".to_string())),
        None => Vec::new(),
    };
    let map = ChurnMap::from_log(&String::from_utf8_lossy(&bytes));
    if map.is_empty() {
        return Err(ChurnError::NoHistory);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn git(root: &Path, args: &[&str]) -> Option<()> {
        let ok = git_cmd().arg("-C").arg(root).args(args).output().ok()?.status.success();
        ok.then_some(())
    }

    fn repo_with_history() -> Option<TempDir> {
        let dir = TempDir::new().ok()?;
        let root = dir.path();
        git(root, &["init", "-q"])?;
        git(root, &["config", "user.email", "dev@example.com"])?;
        git(root, &["config", "user.name", "Dev"])?;
        fs::write(root.join("main.rs"), "fn main() {}\n").ok()?;
        git(root, &["add", "."])?;
        git(root, &["commit", "-q", "-m", "c1"])?;
        fs::write(root.join("main.rs"), "fn main() { run() }\n").ok()?;
        fs::write(root.join("lib.rs"), "pub fn run() {}\n").ok()?;
        git(root, &["add", "."])?;
        git(root, &["commit", "-q", "-m", "c2"])?;
        Some(dir)
    }

    #[test]
    fn counts_lines_and_tolerates_dot_prefix() {
        let map = ChurnMap::from_log("src/a.rs\nsrc/b.rs\n\n./src/a.rs\n\nsrc/a.rs\n");
        assert_eq!(map.get("src/a.rs"), 3);
        assert_eq!(map.get("./src/a.rs"), 3);
        assert_eq!(map.get("src/b.rs"), 1);
        assert_eq!(map.get("src/none.rs"), 0);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn non_repository_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(extract_churn(dir.path(), Duration::from_secs(10)).is_err());
    }

    #[test]
    fn reads_real_history() {
        let Some(dir) = repo_with_history() else {
            return;
        };
        let map = extract_churn(dir.path(), Duration::from_secs(30)).unwrap();
        assert_eq!(map.get("main.rs"), 2);
        assert_eq!(map.get("lib.rs"), 1);
    }

    #[test]
    fn non_ascii_paths_are_not_quoted() {
        let Some(dir) = repo_with_history() else {
            return;
        };
        let root = dir.path();
        fs::write(root.join("café.py"), "x = 1\n").unwrap();
        if git(root, &["add", "."]).and_then(|()| git(root, &["commit", "-q", "-m", "c3"])).is_none() {
            return;
        }
        let map = extract_churn(root, Duration::from_secs(30)).unwrap();
        assert_eq!(map.get("café.py"), 1);
    }

    #[test]
    fn expired_deadline_times_out() {
        let Some(dir) = repo_with_history() else {
            return;
        };
        let err = extract_churn(dir.path(), Duration::ZERO).unwrap_err();
        assert!(matches!(err, ChurnError::Timeout(_)));
    }
}
