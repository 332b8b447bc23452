// src/utils.rs
use sha2::{Digest, Sha256};

/// Computes the SHA-256 hash of raw bytes as lowercase hex.
///
/// Content hashes are a pure function of the bytes: no line-ending normalization,
/// so binary files and text files hash the same way.
#[must_use]
pub fn compute_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Fast CRC-32 checksum, rendered as eight lowercase hex digits.
#[must_use]
pub fn compute_crc32(bytes: &[u8]) -> String {
    format!("{:08x}", crc32fast::hash(bytes))
}

/// True when `s` looks like a SHA-256 hex digest.
#[must_use]
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Normalizes a path string to forward slashes without a leading `./`.
#[must_use]
pub fn normalize_rel(path: &str) -> String {
    let forward = path.replace('\\', "/");
    let mut s = forward.as_str();
    while let Some(rest) = s.strip_prefix("./") {
        s = rest;
    }
    s.to_string()
}
