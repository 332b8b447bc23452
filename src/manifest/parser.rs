//! Reading manifests back, and checking their commitments.

use super::escape::{split_unescaped, unescape};
use super::writer::{digest_of, render_body, render_index, render_meta};
use super::{
    Entry, EntryMetrics, Header, IndexLine, Manifest, END_TAG, FILES_TAG, INDEX_TAG, MAGIC,
    META_TAG, NO_COVERAGE, NO_PARENT,
};
use crate::error::{MothError, Result};
use crate::utils::compute_crc32;

/// Parses a manifest. Line numbers in errors are 1-based.
///
/// # Errors
/// Returns `ManifestParse` on any structural problem.
pub fn parse(text: &str) -> Result<Manifest> {
    let sections = Sections::split(text)?;
    let header = parse_meta(sections.meta)?;
    let index = parse_index(sections.index)?;
    let entries = sections
        .entries
        .iter()
        .enumerate()
        .map(|(i, line)| parse_entry(line, i + 5))
        .collect::<Result<Vec<_>>>()?;
    Ok(Manifest {
        header,
        index,
        entries,
    })
}

/// Raw lines of a manifest, before field parsing.
struct Sections<'a> {
    meta: &'a str,
    index: &'a str,
    entries: Vec<&'a str>,
}

impl<'a> Sections<'a> {
    fn split(text: &'a str) -> Result<Self> {
        let mut lines = text.split('\n');
        let mut expect = |n: usize, want: &str| -> Result<&'a str> {
            match lines.next() {
                Some(l) if l.starts_with(want) => Ok(l),
                Some(_) => Err(MothError::parse(n, format!("expected `{}`", want.trim()))),
                None => Err(MothError::parse(n, "unexpected end of manifest")),
            }
        };
        let magic = expect(1, MAGIC)?;
        if magic != MAGIC {
            return Err(MothError::parse(1, "not a manifest"));
        }
        let meta = expect(2, META_TAG)?;
        let index = expect(3, INDEX_TAG)?;
        if expect(4, FILES_TAG)? != FILES_TAG {
            return Err(MothError::parse(4, "malformed files marker"));
        }

        let mut entries = Vec::new();
        let mut line_no = 4;
        loop {
            line_no += 1;
            match lines.next() {
                Some(END_TAG) => break,
                Some(l) => entries.push(l),
                None => return Err(MothError::parse(line_no, "missing @end")),
            }
        }
        if lines.any(|l| !l.trim().is_empty()) {
            return Err(MothError::parse(line_no + 1, "content after @end"));
        }
        Ok(Self {
            meta: &meta[META_TAG.len()..],
            index: &index[INDEX_TAG.len()..],
            entries,
        })
    }

    /// The body exactly as written: entry lines, each ending in `\n`.
    fn raw_body(&self) -> String {
        self.entries.iter().fold(String::new(), |mut acc, l| {
            acc.push_str(l);
            acc.push('\n');
            acc
        })
    }
}

/// `key=value` pairs separated by unescaped `;`, values unescaped.
fn pairs(text: &str, line: usize) -> Result<Vec<(&str, String)>> {
    split_unescaped(text, ';')
        .into_iter()
        .map(|kv| {
            kv.split_once('=')
                .map(|(k, v)| (k, unescape(v)))
                .ok_or_else(|| MothError::parse(line, format!("expected key=value, got `{kv}`")))
        })
        .collect()
}

fn field<'p>(pairs: &'p [(&str, String)], key: &str, line: usize) -> Result<&'p str> {
    pairs
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_str())
        .ok_or_else(|| MothError::parse(line, format!("missing `{key}`")))
}

fn number<T: std::str::FromStr>(pairs: &[(&str, String)], key: &str, line: usize) -> Result<T> {
    let raw = field(pairs, key, line)?;
    raw.parse()
        .map_err(|_| MothError::parse(line, format!("`{key}` is not a number: `{raw}`")))
}

fn parse_meta(text: &str) -> Result<Header> {
    let kv = pairs(text, 2)?;
    let parent = field(&kv, "parent", 2)?;
    Ok(Header {
        project: field(&kv, "project", 2)?.to_string(),
        version: field(&kv, "version", 2)?.to_string(),
        date: field(&kv, "date", 2)?.to_string(),
        digest: field(&kv, "digest", 2)?.to_string(),
        parent: (parent != NO_PARENT).then(|| parent.to_string()),
    })
}

fn parse_index(text: &str) -> Result<IndexLine> {
    let kv = pairs(text, 3)?;
    Ok(IndexLine {
        count: number(&kv, "count", 3)?,
        checksum: field(&kv, "checksum", 3)?.to_string(),
    })
}

fn parse_entry(line: &str, n: usize) -> Result<Entry> {
    let fields = split_unescaped(line, '|');
    let [path, block, rest @ ..] = fields.as_slice() else {
        return Err(MothError::parse(n, "entry needs a path and a metrics block"));
    };

    let inner = block
        .strip_prefix('{')
        .and_then(|b| b.strip_suffix('}'))
        .ok_or_else(|| MothError::parse(n, "metrics block must be braced"))?;
    let kv = pairs(inner, n)?;
    let cov = field(&kv, "cov", n)?;
    let metrics = EntryMetrics {
        fan_in: number(&kv, "fi", n)?,
        fan_out: number(&kv, "fo", n)?,
        depth: number(&kv, "d", n)?,
        churn: number(&kv, "ch", n)?,
        loc: number(&kv, "loc", n)?,
        complexity: number(&kv, "cx", n)?,
        coverage: if cov == NO_COVERAGE {
            None
        } else {
            Some(number(&kv, "cov", n)?)
        },
    };

    let mut entry = Entry {
        path: unescape(path),
        metrics,
        deps: Vec::new(),
        symbols: Vec::new(),
        doc: String::new(),
        summary: String::new(),
    };
    let mut seen_doc = false;
    let mut seen_sum = false;
    for f in rest {
        if let Some(list) = f.strip_prefix("deps=") {
            entry.deps = parse_list(list, n)?;
        } else if let Some(list) = f.strip_prefix("syms=") {
            entry.symbols = parse_list(list, n)?;
        } else if let Some(doc) = f.strip_prefix("doc=") {
            entry.doc = unescape(doc);
            seen_doc = true;
        } else if let Some(sum) = f.strip_prefix("sum=") {
            entry.summary = unescape(sum);
            seen_sum = true;
        } else {
            return Err(MothError::parse(n, format!("unknown field `{f}`")));
        }
    }
    if !(seen_doc && seen_sum) {
        return Err(MothError::parse(n, "entry needs doc and sum"));
    }
    Ok(entry)
}

fn parse_list(text: &str, n: usize) -> Result<Vec<String>> {
    let inner = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(|| MothError::parse(n, "list must be bracketed"))?;
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    Ok(split_unescaped(inner, ',').into_iter().map(unescape).collect())
}

/// Outcome of re-deriving a manifest's commitments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub checksum_match: bool,
    pub digest_match: bool,
    pub count_match: bool,
    /// The parsed entries re-render to exactly the stored lines.
    pub canonical: bool,
}

impl Verification {
    #[must_use]
    pub fn ok(&self) -> bool {
        self.checksum_match && self.digest_match && self.count_match
    }
}

/// Parses `text` and recomputes its checksum and digest.
///
/// The checksum is taken over the stored entry lines; the digest over the
/// document with the parsed header's digest zeroed. The stored `@meta` and
/// `@index` lines must also be exactly what that header renders to, so extra or
/// reordered keys fail the digest check.
///
/// # Errors
/// Returns `ManifestParse` if `text` is not a manifest.
pub fn verify(text: &str) -> Result<(Manifest, Verification)> {
    let sections = Sections::split(text)?;
    let manifest = parse(text)?;
    let body = sections.raw_body();

    let checksum_match = compute_crc32(body.as_bytes()) == manifest.index.checksum;
    let header_exact = format!("{META_TAG}{}", sections.meta) == render_meta(&manifest.header)
        && format!("{INDEX_TAG}{}", sections.index) == render_index(&manifest.index);
    let digest_match = header_exact
        && digest_of(&manifest.header, &manifest.index, &body) == manifest.header.digest;
    let count_match = manifest.entries.len() == manifest.index.count;
    let canonical = render_body(&manifest.entries) == body;

    Ok((
        manifest,
        Verification {
            checksum_match,
            digest_match,
            count_match,
            canonical,
        },
    ))
}
