//! On-disk persistence for a built index: a storage-backend abstraction
//! ([`directory`]), the stream/offset-table writer ([`writer`]), and a fixed
//! binary footer format ([`format`]) kept for a future combined-file layout.
//! The index is written once by the builder and read read-only afterward —
//! no write-ahead log, checkpoints, or recovery path, since nothing here
//! mutates after a build completes.

pub mod directory;
pub mod format;
pub mod writer;

pub use directory::{Directory, FsDirectory, MemoryDirectory};
pub use format::{IndexFooter, IndexOffsets};
pub use writer::write_index;
