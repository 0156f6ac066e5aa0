//! Cache path resolution
//!
//! The cache file name is derived from the user and the install path of the
//! running binary, so different users and different installs never share a file.

use std::path::{Path, PathBuf};

use crate::core::util::hash_bytes;

/// Prefix of every cache file name
pub const CACHE_FILE_PREFIX: &str = "nix-packages-cache-";

/// Map `(user, tool_path)` to a cache file inside `cache_dir`.
///
/// The mapping is deterministic: the same pair always yields the same path.
pub fn resolve_cache_path(cache_dir: &Path, user: &str, tool_path: &Path) -> PathBuf {
    let unique = format!("{}-{}", user, tool_path.display());
    cache_dir.join(format!("{}{}", CACHE_FILE_PREFIX, hash_bytes(unique.as_bytes())))
}

/// Default directory for the cache file (the system temp directory)
pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir()
}

/// Absolute path of the running executable
pub fn tool_path() -> PathBuf {
    std::env::current_exe()
        .and_then(|exe| exe.canonicalize())
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_PKG_NAME")))
}
