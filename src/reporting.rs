//! Console output for runs, verification and single entries.

use colored::Colorize;

use crate::discovery::Source;
use crate::manifest::{Entry, Manifest, Verification};
use crate::pipeline::RunOutcome;
use crate::validate::{Ranked, ValidationReport};

/// Prints the run summary. Warnings are listed only when `verbose`; otherwise
/// just counted.
pub fn print_run(outcome: &RunOutcome, verbose: bool) {
    let summary = &outcome.validation.summary;
    let source = match outcome.source {
        Source::Git => "git",
        Source::Walk => "walk",
    };
    println!(
        "{} {} files ({}), {} lines, complexity {}, avg depth {:.2}",
        "moth:".cyan().bold(),
        summary.total_files,
        source,
        summary.total_lines,
        summary.total_complexity,
        summary.average_depth
    );
    println!("  {} {}", "manifest".dimmed(), outcome.artifacts.manifest.display());
    println!("  {} {}", "digest".dimmed(), outcome.manifest.header.digest);
    if let Some(parent) = &outcome.manifest.header.parent {
        println!("  {} {}", "parent".dimmed(), parent);
    }

    let warnings: Vec<_> = outcome.warnings().collect();
    if verbose {
        for w in &warnings {
            println!("{} {w}", "warn:".yellow().bold());
        }
        print_rankings(&outcome.validation);
    } else if !warnings.is_empty() {
        println!(
            "{} {} degraded item(s); rerun with --verbose for details",
            "warn:".yellow().bold(),
            warnings.len()
        );
    }

    print_integrity(&outcome.validation);
}

fn print_integrity(report: &ValidationReport) {
    let failing = report.failing();
    if report.is_clean() {
        println!("{}", "✓ manifest verified".green().bold());
        return;
    }
    if !report.digest_match || !report.checksum_match {
        println!("{}", "✗ manifest commitment does not verify".red().bold());
    }
    if !failing.is_empty() {
        println!("{} {} file(s) failed checks", "✗".red().bold(), failing.len());
    }
}

fn print_rankings(report: &ValidationReport) {
    let r = &report.rankings;
    print_axis("complexity", &r.complexity);
    print_axis("churn", &r.churn);
    print_axis("size", &r.size);
    print_axis("fan-out", &r.fan_out);
    print_axis("fan-in", &r.fan_in);
    print_axis("hotspot", &r.hotspot);
}

fn print_axis(title: &str, items: &[Ranked]) {
    if items.is_empty() {
        return;
    }
    println!("{}", format!("top {title}").bold());
    for r in items {
        if r.score.fract() == 0.0 {
            println!("  {:>10}  {}", r.score, r.path);
        } else {
            println!("  {:>10.3}  {}", r.score, r.path);
        }
    }
}

pub fn print_verification(label: &str, manifest: &Manifest, v: &Verification) {
    let mark = |ok: bool| if ok { "ok".green() } else { "FAILED".red().bold() };
    println!("{} {label}", "verify:".cyan().bold());
    println!("  entries   {} ({})", manifest.entries.len(), mark(v.count_match));
    println!("  checksum  {} ({})", manifest.index.checksum, mark(v.checksum_match));
    println!("  digest    {} ({})", manifest.header.digest, mark(v.digest_match));
    if !v.canonical {
        println!("  {}", "entries are not in canonical form".yellow());
    }
}

pub fn print_entry(entry: &Entry) {
    let m = &entry.metrics;
    println!("{}", entry.path.bold());
    println!("  {}", entry.summary.dimmed());
    println!(
        "  fan-in {}  fan-out {}  depth {}  churn {}  loc {}  cx {}  cov {}",
        m.fan_in,
        m.fan_out,
        m.depth,
        m.churn,
        m.loc,
        m.complexity,
        m.coverage.map_or_else(|| "-".to_string(), |c| format!("{c}%"))
    );
    println!("  doc: {}", entry.doc);
    if !entry.deps.is_empty() {
        println!("  deps:");
        for d in &entry.deps {
            println!("    {d}");
        }
    }
    if !entry.symbols.is_empty() {
        println!("  symbols: {}", entry.symbols.join(", "));
    }
}
