//! A static inverted-index search core: bit-packed posting-list codecs,
//! Elias-Fano skip structures, WAND/MaxScore/Block-Max pruning, and parallel
//! sharded index construction.
//!
//! # Pipeline stage
//!
//! This crate covers first-stage retrieval: given a built index and a set of
//! query term ids, it returns a top-k `Vec<(docid, score)>` ranked by BM25 or
//! query-likelihood. It does not tokenize, does not rerank, and does not fuse
//! multiple retrievers' outputs — those belong to the surrounding pipeline.
//!
//! # Modules
//!
//! - [`bitio`]: variable-width bit I/O, the foundation every codec is built on.
//! - [`codec`]: Elias-Fano (compact + partitioned), varbyte, BP128, interpolative.
//! - [`postings`]: block-structured posting lists with a skip list over blocks.
//! - [`wand`]: per-term WAND upper-bound metadata, raw or quantized.
//! - [`scorer`]: BM25 and query-likelihood scoring functions.
//! - [`cursor`]: posting cursors bound to a scorer, with pruning bounds.
//! - [`query`]: top-k heap and the DAAT/TAAT traversal algorithms.
//! - [`index`]: the assembled queryable index and its on-disk metadata.
//! - [`builder`]: parallel sharded construction from a forward collection.
//! - [`persistence`]: storage backend abstraction and binary footer format.
//! - [`taily`]: binary record I/O for the Taily external threshold estimator.
//! - [`config`]: explicit, passed-by-value configuration for the above.
//! - [`error`]: the crate's single flat error taxonomy.

pub mod bitio;
pub mod builder;
pub mod codec;
pub mod config;
pub mod cursor;
pub mod error;
pub mod index;
pub mod postings;
pub mod query;
pub mod scorer;
pub mod taily;
pub mod wand;

#[cfg(feature = "persistence")]
pub mod persistence;

pub use error::{IndexError, IndexResult};

/// Commonly used types, re-exported for a single `use rank_wand::prelude::*;`.
pub mod prelude {
    pub use crate::config::{BlockSize, Config};
    pub use crate::cursor::{BlockMaxScoredCursor, MaxScoredCursor, ScoredCursor};
    pub use crate::error::{IndexError, IndexResult};
    pub use crate::index::Index;
    pub use crate::postings::PostingList;
    pub use crate::query::algorithms::{
        block_max_maxscore, block_max_wand, maxscore, range_k, ranked_and, ranked_or, ranked_or_taat_lazy, ranked_or_taat_simple, wand,
    };
    pub use crate::query::heap::TopKHeap;
    pub use crate::scorer::{Bm25Params, CollectionStats, QueryLikelihoodParams, Scorer};
}
