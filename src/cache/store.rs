//! Cache store - Freshness policy and atomic refresh of the package cache

use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::backends::lister::PackageLister;
use crate::core::model::SearchError;
use crate::core::util::{get_mtime, now};

/// Maximum cache age before a refresh is due (24 hours)
pub const MAX_AGE_SECS: i64 = 86_400;

/// Why a refresh is (or isn't) needed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Forced,
    Missing,
    Stale,
}

impl Freshness {
    /// Whether the cache has to be rebuilt before searching
    pub fn needs_refresh(self) -> bool {
        self != Freshness::Fresh
    }
}

/// Classify the cache at `path` relative to `now`.
///
/// Unreadable metadata counts as missing. An mtime in the future is fresh.
pub fn check_freshness_at(path: &Path, force: bool, now: DateTime<Utc>) -> Freshness {
    if force {
        return Freshness::Forced;
    }

    let mtime = match get_mtime(path) {
        Ok(mtime) => mtime,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cache not readable");
            return Freshness::Missing;
        }
    };

    let age = now - mtime;
    debug!(path = %path.display(), age_secs = age.num_seconds(), "cache age");
    if age > Duration::seconds(MAX_AGE_SECS) {
        Freshness::Stale
    } else {
        Freshness::Fresh
    }
}

pub fn check_freshness(path: &Path, force: bool) -> Freshness {
    check_freshness_at(path, force, now())
}

/// Rebuild the cache from the lister.
///
/// The listing goes to a temp file next to `path` which is then renamed over
/// it, so readers only ever see the old or the new content. If the lister
/// fails, nothing on disk is touched.
pub fn refresh(path: &Path, lister: &dyn PackageLister) -> Result<(), SearchError> {
    let content = lister.list()?;

    let write_error = |source: std::io::Error| SearchError::CacheWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_error)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(content.as_bytes()).map_err(write_error)?;
    tmp.as_file().sync_all().map_err(write_error)?;
    tmp.persist(path).map_err(|e| write_error(e.error))?;

    info!(
        path = %path.display(),
        bytes = content.len(),
        lines = content.lines().count(),
        "cache refreshed"
    );
    Ok(())
}
