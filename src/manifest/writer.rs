//! Rendering and the two-pass hash commitment.

use std::collections::BTreeMap;
use std::fmt::Write;

use super::escape::{clean, sanitize, truncate};
use super::summary::summarize;
use super::{
    Entry, EntryMetrics, Header, IndexLine, Manifest, DOC_CAP, END_TAG, FILES_TAG, INDEX_TAG,
    MAGIC, META_TAG, NO_COVERAGE, NO_PARENT, SUMMARY_CAP, UNDOCUMENTED,
};
use crate::analysis::SourceFile;
use crate::graph::{EdgeMap, Metrics};
use crate::utils::{compute_crc32, compute_sha256};

/// Builds entries sorted by path. Text fields are sanitized and capped here;
/// escaping happens at render time.
#[must_use]
pub fn build_entries(
    files: &[SourceFile],
    metrics: &BTreeMap<String, Metrics>,
    edges: &EdgeMap,
) -> Vec<Entry> {
    let mut entries: Vec<Entry> = files
        .iter()
        .map(|f| {
            let m = metrics.get(&f.path).cloned().unwrap_or_default();
            let doc = f
                .doc
                .as_deref()
                .map(sanitize)
                .filter(|d| !d.trim().is_empty())
                .map_or_else(|| UNDOCUMENTED.to_string(), |d| truncate(d.trim(), DOC_CAP));
            Entry {
                path: sanitize(&f.path),
                metrics: EntryMetrics::from(&m),
                deps: edges
                    .get(&f.path)
                    .map(|ts| ts.iter().map(|t| sanitize(&t.to_string())).collect())
                    .unwrap_or_default(),
                symbols: f.symbols.iter().map(|s| sanitize(s)).collect(),
                doc,
                summary: truncate(&sanitize(&summarize(f, &m)), SUMMARY_CAP),
            }
        })
        .collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries
}

#[must_use]
pub fn render_meta(header: &Header) -> String {
    format!(
        "{META_TAG}project={};version={};date={};digest={};parent={}",
        clean(&header.project),
        clean(&header.version),
        clean(&header.date),
        clean(&header.digest),
        header.parent.as_deref().map_or_else(|| NO_PARENT.to_string(), clean),
    )
}

#[must_use]
pub fn render_index(index: &IndexLine) -> String {
    format!("{INDEX_TAG}count={};checksum={}", index.count, index.checksum)
}

#[must_use]
pub fn render_entry(entry: &Entry) -> String {
    let m = &entry.metrics;
    let cov = m
        .coverage
        .map_or_else(|| NO_COVERAGE.to_string(), |c| c.to_string());
    let mut line = format!(
        "{}|{{fi={};fo={};d={};ch={};loc={};cx={};cov={}}}",
        clean(&entry.path),
        m.fan_in,
        m.fan_out,
        m.depth,
        m.churn,
        m.loc,
        m.complexity,
        cov
    );
    if !entry.deps.is_empty() {
        let _ = write!(line, "|deps=[{}]", render_list(&entry.deps));
    }
    if !entry.symbols.is_empty() {
        let _ = write!(line, "|syms=[{}]", render_list(&entry.symbols));
    }
    let _ = write!(line, "|doc={}|sum={}", clean(&entry.doc), clean(&entry.summary));
    line
}

fn render_list(items: &[String]) -> String {
    items.iter().map(|i| clean(i)).collect::<Vec<_>>().join(",")
}

/// Entry lines, each terminated by `\n`. This is what the checksum covers.
#[must_use]
pub fn render_body(entries: &[Entry]) -> String {
    entries.iter().fold(String::new(), |mut acc, e| {
        acc.push_str(&render_entry(e));
        acc.push('\n');
        acc
    })
}

/// The complete document for a header, index line and pre-rendered body.
#[must_use]
pub fn render_document(header: &Header, index: &IndexLine, body: &str) -> String {
    format!(
        "{MAGIC}\n{}\n{}\n{FILES_TAG}\n{body}{END_TAG}\n",
        render_meta(header),
        render_index(index)
    )
}

/// SHA-256 over the document rendered with the digest zeroed.
#[must_use]
pub fn digest_of(header: &Header, index: &IndexLine, body: &str) -> String {
    compute_sha256(render_document(&header.zeroed(), index, body).as_bytes())
}

/// Renders `entries` under a header for `project`, committing to the result:
/// checksum over the body, then digest over the zero-digest document, then the
/// final document with the real digest in place.
#[must_use]
pub fn commit(
    project: &str,
    version: &str,
    date: &str,
    parent: Option<String>,
    entries: Vec<Entry>,
) -> (String, Manifest) {
    let body = render_body(&entries);
    let index = IndexLine {
        count: entries.len(),
        checksum: compute_crc32(body.as_bytes()),
    };
    let mut header = Header {
        project: project.to_string(),
        version: version.to_string(),
        date: date.to_string(),
        digest: String::new(),
        parent,
    };
    header.digest = digest_of(&header, &index, &body);
    let text = render_document(&header, &index, &body);
    (
        text,
        Manifest {
            header,
            index,
            entries,
        },
    )
}
