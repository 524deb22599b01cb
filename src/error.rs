//! Error types for haybale.
//!
//! A single `thiserror`-derived enum covers both query-build-time failures
//! (bad pattern, bad size/date syntax) and the per-path conditions the
//! coordinator turns into `Warning` events during traversal.

use std::path::PathBuf;
use thiserror::Error;

/// The error type returned by query construction and fatal traversal
/// failures.
#[derive(Error, Debug)]
pub enum HaybaleError {
    /// A name or content pattern failed to parse (bad escape, empty
    /// alternative, invalid regex).
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A `--min-size`/`--max-size` value failed to parse.
    #[error("invalid size '{input}': {reason}")]
    InvalidSize { input: String, reason: String },

    /// A `--modified-after`/`--modified-before` value failed to parse.
    #[error("invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    /// `minSizeBytes > maxSizeBytes` or `modifiedAfter > modifiedBefore`.
    #[error("invalid range: {reason}")]
    InvalidRange { reason: String },

    /// The root directory could not be opened. Fatal: terminates the
    /// stream with no results.
    #[error("cannot read root directory '{path}': {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A lower-level I/O failure, wrapped for `?` convenience.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-local `Result` alias.
pub type Result<T> = std::result::Result<T, HaybaleError>;

/// Reasons a descendant entry produced a `Warning` instead of a result.
/// Distinct from `HaybaleError` because these never abort the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningReason {
    /// Permission denied, stat failure, or read error on a descendant.
    EntryUnreadable(String),
    /// A symlink's target does not exist.
    BrokenSymlink,
    /// A symlink resolves to a directory already on the visited set.
    SymlinkCycle,
    /// A regex pattern was applied line-by-line because the file exceeded
    /// the whole-file scan threshold.
    LargeFileRegexDegraded,
}

impl std::fmt::Display for WarningReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningReason::EntryUnreadable(msg) => write!(f, "unreadable: {msg}"),
            WarningReason::BrokenSymlink => write!(f, "broken symlink"),
            WarningReason::SymlinkCycle => write!(f, "symlink cycle"),
            WarningReason::LargeFileRegexDegraded => {
                write!(f, "large-file regex degraded to line mode")
            }
        }
    }
}
