//! Common utilities

use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::SystemTime;
use xxhash_rust::xxh3::xxh3_64;

/// Compute the xxh3-64 hash of bytes as 16 lowercase hex digits
pub fn hash_bytes(data: &[u8]) -> String {
    format!("{:016x}", xxh3_64(data))
}

/// Get file modification time as a UTC timestamp
pub fn get_mtime(path: &Path) -> std::io::Result<DateTime<Utc>> {
    let metadata = std::fs::metadata(path)?;
    Ok(DateTime::<Utc>::from(metadata.modified()?))
}

/// Current time as a UTC timestamp
pub fn now() -> DateTime<Utc> {
    DateTime::<Utc>::from(SystemTime::now())
}

/// Get the name of the current user, `unknown` when it can't be determined
pub fn current_user() -> String {
    std::env::var("USER")
        .ok()
        .filter(|user| !user.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
