//! Integer-sequence codecs for posting lists, skip structures, and WAND data.
//!
//! The reference design note on codec dispatch calls for a finite, named set
//! of encodings matched on rather than an open trait-object hierarchy — so
//! [`Encoding`] is a plain tagged enum, and callers that need a cursor over a
//! sequence hold the concrete type they built rather than a `dyn` trait
//! object. [`SequenceCursor`] documents the shared contract (`move_to`,
//! `next_geq`, `value`) that each concrete cursor type implements inherently.

pub mod block_codec;
pub mod elias_fano;
pub mod error;
pub mod partitioned_ef;
pub mod varbyte;

pub use error::{CodecError, CodecResult};

/// The finite set of registered sequence encodings, matched by name in
/// on-disk posting-list headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    EliasFano,
    PartitionedEliasFano,
    Varbyte,
    Bp128,
    Interpolative,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Self::EliasFano => "elias_fano",
            Self::PartitionedEliasFano => "partitioned_elias_fano",
            Self::Varbyte => "varbyte",
            Self::Bp128 => "bp128",
            Self::Interpolative => "interpolative",
        }
    }

    pub fn parse(name: &str) -> CodecResult<Self> {
        match name {
            "elias_fano" => Ok(Self::EliasFano),
            "partitioned_elias_fano" => Ok(Self::PartitionedEliasFano),
            "varbyte" => Ok(Self::Varbyte),
            "bp128" => Ok(Self::Bp128),
            "interpolative" => Ok(Self::Interpolative),
            other => Err(CodecError::UnknownEncoding(other.to_string())),
        }
    }
}

/// Shared contract every sequence cursor in this crate implements: a current
/// `value`, a `position` (rank within the sequence), random-access `move_to`,
/// and monotone `next_geq` for DAAT traversal. Each concrete cursor type
/// (`EliasFanoCursor`, `VarbyteCursor`, block-codec iterators in
/// [`crate::postings`]) implements these as inherent methods rather than this
/// trait directly — kept here as documentation of the contract operations must
/// honor, per the dispatch-by-match design above.
pub trait SequenceCursor {
    /// Number of elements in the underlying sequence.
    fn len(&self) -> usize;

    /// Current rank, `len()` once exhausted.
    fn position(&self) -> usize;

    /// Current value, or `None`/an END sentinel once exhausted.
    fn value(&self) -> Option<u64>;

    /// Moves to rank `k`.
    fn move_to(&mut self, k: usize);

    /// Advances to the smallest element >= `v`, returning it.
    fn next_geq(&mut self, v: u64) -> Option<u64>;
}
