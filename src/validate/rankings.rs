//! Top-N lists along independent axes.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::ReportConfig;
use crate::index::IndexEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranked {
    pub path: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rankings {
    pub complexity: Vec<Ranked>,
    pub churn: Vec<Ranked>,
    pub size: Vec<Ranked>,
    pub fan_out: Vec<Ranked>,
    pub fan_in: Vec<Ranked>,
    /// Normalized complexity times normalized churn.
    pub hotspot: Vec<Ranked>,
}

#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn rank<'a, I>(files: I, cfg: &ReportConfig) -> Rankings
where
    I: IntoIterator<Item = (&'a String, &'a IndexEntry)> + Clone,
{
    let max_cx = files
        .clone()
        .into_iter()
        .map(|(_, e)| e.metrics.complexity)
        .max()
        .unwrap_or(0);
    let max_churn = files
        .clone()
        .into_iter()
        .map(|(_, e)| e.metrics.churn)
        .max()
        .unwrap_or(0);
    let n = cfg.top_n;

    Rankings {
        complexity: axis(files.clone(), |e| e.metrics.complexity as f64, cfg.min_complexity, n),
        churn: axis(files.clone(), |e| f64::from(e.metrics.churn), cfg.min_churn, n),
        size: axis(files.clone(), |e| e.size as f64, cfg.min_size, n),
        fan_out: axis(files.clone(), |e| e.metrics.fan_out as f64, cfg.min_fan_out, n),
        fan_in: axis(files.clone(), |e| e.metrics.fan_in as f64, cfg.min_fan_in, n),
        hotspot: axis(
            files,
            |e| hotspot(e.metrics.complexity, max_cx, e.metrics.churn, max_churn),
            cfg.min_hotspot,
            n,
        ),
    }
}

#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn hotspot(cx: usize, max_cx: usize, churn: u32, max_churn: u32) -> f64 {
    if max_cx == 0 || max_churn == 0 {
        return 0.0;
    }
    (cx as f64 / max_cx as f64) * (f64::from(churn) / f64::from(max_churn))
}

fn axis<'a, I, F>(files: I, score: F, min: f64, n: usize) -> Vec<Ranked>
where
    I: IntoIterator<Item = (&'a String, &'a IndexEntry)>,
    F: Fn(&IndexEntry) -> f64,
{
    top(
        files.into_iter().map(|(path, e)| Ranked {
            path: path.clone(),
            score: score(e),
        }),
        min,
        n,
    )
}

/// Keeps items scoring at least `min`, highest first, ties by path, at most `n`.
fn top(items: impl Iterator<Item = Ranked>, min: f64, n: usize) -> Vec<Ranked> {
    let mut kept: Vec<Ranked> = items.filter(|r| r.score >= min).collect();
    kept.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.path.cmp(&b.path))
    });
    kept.truncate(n);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Metrics;
    use std::collections::BTreeMap;

    fn entry(cx: usize, churn: u32, size: u64, fan_in: usize) -> IndexEntry {
        IndexEntry {
            metrics: Metrics {
                complexity: cx,
                churn,
                fan_in,
                depth: 1,
                ..Metrics::default()
            },
            hash: String::new(),
            size,
            modified: String::new(),
            language: None,
            deps: Vec::new(),
            symbols: Vec::new(),
            binary: false,
            degraded: false,
        }
    }

    fn files() -> BTreeMap<String, IndexEntry> {
        [
            ("a.rs", entry(30, 10, 4096, 0)),
            ("b.rs", entry(30, 2, 100, 3)),
            ("c.rs", entry(2, 20, 2048, 1)),
            ("d.rs", entry(10, 0, 0, 0)),
        ]
        .into_iter()
        .map(|(p, e)| (p.to_string(), e))
        .collect()
    }

    fn paths(r: &[Ranked]) -> Vec<&str> {
        r.iter().map(|x| x.path.as_str()).collect()
    }

    #[test]
    fn ranks_with_cutoffs_and_path_ties() {
        let files = files();
        let r = rank(&files, &ReportConfig::default());
        assert_eq!(paths(&r.complexity), vec!["a.rs", "b.rs", "d.rs"]);
        assert_eq!(paths(&r.churn), vec!["c.rs", "a.rs", "b.rs"]);
        assert_eq!(paths(&r.size), vec!["a.rs", "c.rs"]);
        assert_eq!(paths(&r.fan_in), vec!["b.rs", "c.rs"]);
        assert!(r.fan_out.is_empty());
    }

    #[test]
    fn hotspot_is_normalized_product() {
        let files = files();
        let r = rank(&files, &ReportConfig::default());
        // a: 1.0 * 0.5, b: 1.0 * 0.1, c: (2/30) * 1.0
        assert_eq!(paths(&r.hotspot), vec!["a.rs", "b.rs", "c.rs"]);
        assert!((r.hotspot[0].score - 0.5).abs() < 1e-9);
        assert_eq!(hotspot(5, 0, 5, 5), 0.0);
    }

    #[test]
    fn top_n_truncates() {
        let files = files();
        let cfg = ReportConfig {
            top_n: 1,
            ..ReportConfig::default()
        };
        assert_eq!(paths(&rank(&files, &cfg).complexity), vec!["a.rs"]);
    }
}
