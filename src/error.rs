//! Error types for rank-wand.
//!
//! Follows a single flat taxonomy rather than one error enum per module: codec,
//! posting-list, WAND, and persistence code all report into [`IndexError`]. Codec
//! and cursor code never logs (it only returns errors); builders and the CLI driver
//! log with `log::warn!`/`log::error!` before propagating or aborting.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that can occur while building or querying an index.
#[derive(Debug)]
pub enum IndexError {
    /// A structural invariant was violated: non-monotonic docids, an offset table
    /// that isn't strictly increasing, a required list that's empty, etc. Fatal;
    /// aborts the build that produced it.
    InvariantViolation(String),

    /// A codec name was not one of the registered encodings.
    UnknownEncoding(String),

    /// A term id or docid fell outside `[0, num_terms)` / `[0, num_docs)`.
    OutOfRange { what: &'static str, value: u64, bound: u64 },

    /// Underlying I/O failure, with the path that was being read or written.
    Io { path: PathBuf, source: io::Error },

    /// A scorer produced a non-finite value for some posting; the posting was
    /// skipped rather than corrupting the top-k heap.
    NumericDegenerate(String),
}

impl IndexError {
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn out_of_range(what: &'static str, value: u64, bound: u64) -> Self {
        Self::OutOfRange { what, value, bound }
    }

    /// Maps this error to the process exit codes from the on-disk layout spec:
    /// 1 = argument/parsing error, 2 = I/O error, 3 = invariant violation during build.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvariantViolation(_) => 3,
            Self::Io { .. } => 2,
            Self::UnknownEncoding(_) | Self::OutOfRange { .. } | Self::NumericDegenerate(_) => 1,
        }
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
            Self::UnknownEncoding(name) => write!(f, "unknown encoding: {name}"),
            Self::OutOfRange { what, value, bound } => {
                write!(f, "{what} {value} out of range (bound {bound})")
            }
            Self::Io { path, source } => write!(f, "I/O error at {}: {source}", path.display()),
            Self::NumericDegenerate(msg) => write!(f, "numeric degenerate score: {msg}"),
        }
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<crate::codec::error::CodecError> for IndexError {
    fn from(e: crate::codec::error::CodecError) -> Self {
        use crate::codec::error::CodecError::*;
        match e {
            InvalidInput(msg) => Self::InvariantViolation(msg),
            UnknownEncoding(name) => Self::UnknownEncoding(name),
            Overflow(msg) => Self::InvariantViolation(msg),
        }
    }
}

/// Result type for index construction and query operations.
pub type IndexResult<T> = Result<T, IndexError>;

