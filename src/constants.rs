// src/constants.rs
//! Fixed deny-lists and pattern constants shared by discovery and analysis.

/// Directories never descended into: version control, vendored and generated trees.
pub const PRUNE_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".moth",
    "node_modules",
    "dist",
    "build",
    "target",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    ".cache",
    ".next",
    "coverage",
    "vendor",
    "third_party",
];

/// Binary extensions. Files matching get a size-and-hash record and are never parsed.
pub const BIN_EXT_PATTERN: &str = r"(?i)\.(png|jpe?g|gif|bmp|ico|icns|webp|woff2?|ttf|otf|eot|pdf|mp4|mov|mkv|avi|mp3|wav|flac|ogg|zip|gz|bz2|xz|7z|rar|jar|war|parquet|sqlite|db|bin|exe|dll|so|dylib|a|o|class|pyc|pkl|onnx|wasm|tgz|zst)$";

/// Dotenv files, private keys and keystores. Plain `env.*` modules are source, not secrets.
pub const SECRET_PATTERN: &str = r"(?i)(^|/)(\.env(\.[\w.-]+)?|id_rsa(\.pub)?|id_ed25519(\.pub)?|[^/]*\.(pem|p12|jks|keystore|pfx|key))$";

/// Stable marker prefixed to external import targets in serialized dependency lists.
pub const EXTERNAL_MARKER: &str = "ext:";

/// Marker for relative imports that resolved to no known file.
pub const MISSING_MARKER: &str = "missing:";

/// Returns true when a directory name is on the fixed deny-list.
#[must_use]
pub fn should_prune(name: &str) -> bool {
    PRUNE_DIRS.contains(&name) || name.ends_with(".egg-info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prunes_vendor_and_vcs() {
        assert!(should_prune(".git"));
        assert!(should_prune("node_modules"));
        assert!(should_prune("mypkg.egg-info"));
        assert!(!should_prune("src"));
    }
}
