// src/manifest/mod.rs
//! The manifest: a deterministic, line-oriented snapshot of the repository.
//!
//! ```text
//! #MOTH manifest
//! @meta project=<p>;version=<v>;date=<d>;digest=<sha256>;parent=<sha256|none>
//! @index count=<n>;checksum=<crc32>
//! @files
//! <path>|{fi=;fo=;d=;ch=;loc=;cx=;cov=}[|deps=[..]][|syms=[..]]|doc=<text>|sum=<text>
//! @end
//! ```
//!
//! The checksum covers the entry lines. The digest is SHA-256 over the whole
//! document rendered with the digest field zeroed.

pub mod escape;
pub mod parser;
pub mod summary;
pub mod writer;

pub use parser::{parse, verify, Verification};
pub use writer::{build_entries, commit};

use crate::graph::Metrics;

pub const MAGIC: &str = "#MOTH manifest";
pub const META_TAG: &str = "@meta ";
pub const INDEX_TAG: &str = "@index ";
pub const FILES_TAG: &str = "@files";
pub const END_TAG: &str = "@end";

/// Digest placeholder used while computing the real digest.
pub const ZERO_DIGEST: &str = "0000000000000000000000000000000000000000000000000000000000000000";

pub const NO_PARENT: &str = "none";
pub const NO_COVERAGE: &str = "-";
pub const UNDOCUMENTED: &str = "(undocumented)";

pub const DOC_CAP: usize = 160;
pub const SUMMARY_CAP: usize = 96;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub project: String,
    pub version: String,
    pub date: String,
    pub digest: String,
    pub parent: Option<String>,
}

impl Header {
    /// The same header with its digest replaced by [`ZERO_DIGEST`].
    #[must_use]
    pub fn zeroed(&self) -> Self {
        Self {
            digest: ZERO_DIGEST.to_string(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLine {
    pub count: usize,
    pub checksum: String,
}

/// The metrics block of one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetrics {
    pub fan_in: usize,
    pub fan_out: usize,
    pub depth: usize,
    pub churn: u32,
    pub loc: usize,
    pub complexity: usize,
    pub coverage: Option<u8>,
}

impl From<&Metrics> for EntryMetrics {
    fn from(m: &Metrics) -> Self {
        Self {
            fan_in: m.fan_in,
            fan_out: m.fan_out,
            depth: m.depth,
            churn: m.churn,
            loc: m.loc,
            complexity: m.complexity,
            coverage: m.coverage,
        }
    }
}

/// One file line, with every text field unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: String,
    pub metrics: EntryMetrics,
    /// Rendered targets (`path`, `ext:spec`, `missing:path`).
    pub deps: Vec<String>,
    pub symbols: Vec<String>,
    pub doc: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub header: Header,
    pub index: IndexLine,
    pub entries: Vec<Entry>,
}

impl Manifest {
    #[must_use]
    pub fn entry(&self, path: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.path == path)
    }
}
