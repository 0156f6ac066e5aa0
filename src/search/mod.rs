//! Search module - Match engine over cache lines
//!
//! Provides:
//! - matcher: the per-line predicate for each strictness level
//! - highlight: span emphasis with explicit markers
//!
//! Both are stateless; lines are filtered one by one and lazily.

pub mod highlight;
pub mod matcher;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::core::model::{MatchResult, SearchError};
use matcher::Matcher;

/// Filter the lines of a reader, keeping the original order.
///
/// Lines are pulled one at a time; a read error is passed through as an item.
pub fn search<'a, R>(
    reader: R,
    matcher: &'a Matcher,
) -> impl Iterator<Item = io::Result<MatchResult>> + 'a
where
    R: BufRead + 'a,
{
    reader.lines().filter_map(move |line| match line {
        Ok(line) => matcher.match_line(&line).map(Ok),
        Err(e) => Some(Err(e)),
    })
}

/// Stream matches out of a cache file.
///
/// Failing to open the file is reported up front; a read failure part way
/// through surfaces as an `Err` item.
pub fn search_file<'a>(
    path: &Path,
    matcher: &'a Matcher,
) -> Result<impl Iterator<Item = Result<MatchResult, SearchError>> + 'a, SearchError> {
    let file = File::open(path).map_err(|source| SearchError::CacheRead {
        path: path.to_path_buf(),
        source,
    })?;

    let path = path.to_path_buf();
    Ok(search(BufReader::new(file), matcher).map(move |result| {
        result.map_err(|source| SearchError::CacheRead {
            path: path.clone(),
            source,
        })
    }))
}
