//! Error types for integer-sequence codecs.

use std::fmt;

/// Errors that can occur while encoding or decoding a posting sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Input violated a codec precondition (e.g. a non-monotonic sequence
    /// handed to a monotone-only codec, or an empty required list).
    InvalidInput(String),

    /// The encoding name in a posting-list header didn't match a registered
    /// codec.
    UnknownEncoding(String),

    /// A value didn't fit the codec's universe (e.g. a docid greater than the
    /// `num_docs` the sequence was built for).
    Overflow(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid codec input: {msg}"),
            Self::UnknownEncoding(name) => write!(f, "unknown codec: {name}"),
            Self::Overflow(msg) => write!(f, "codec overflow: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

pub type CodecResult<T> = Result<T, CodecError>;
