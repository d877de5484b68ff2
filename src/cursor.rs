//! Scored cursors: a [`crate::postings::PostingCursor`] paired with a
//! [`Scorer`] and this term's collection statistics, plus two pruning-aware
//! variants that additionally expose WAND upper bounds.
//!
//! `ScoredCursor` is what Ranked-OR/AND DAAT traversal uses. `MaxScoredCursor`
//! adds a single whole-list upper bound (for WAND / MaxScore). `BlockMaxScoredCursor`
//! adds a per-block upper bound that tightens as the cursor advances (for
//! Block-Max WAND / Block-Max MaxScore).

use crate::error::{IndexError, IndexResult};
use crate::postings::{PostingCursor, PostingList};
use crate::scorer::{CollectionStats, PostingStats, Scorer};
use crate::wand::TermBlocks;

/// A posting-list cursor bound to a scorer; yields `(docid, score)` pairs.
pub struct ScoredCursor<'a> {
    postings: PostingCursor<'a>,
    scorer: Scorer,
    collection: CollectionStats,
    doc_freq: u64,
    collection_prob: f32,
    doc_len_of: &'a dyn Fn(u32) -> u32,
}

impl<'a> ScoredCursor<'a> {
    pub fn new(
        list: &'a PostingList,
        scorer: Scorer,
        collection: CollectionStats,
        doc_freq: u64,
        collection_prob: f32,
        doc_len_of: &'a dyn Fn(u32) -> u32,
    ) -> Self {
        Self { postings: list.cursor(), scorer, collection, doc_freq, collection_prob, doc_len_of }
    }

    pub fn docid(&mut self) -> Option<u32> {
        self.postings.docid()
    }

    pub fn position(&self) -> usize {
        self.postings.position()
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn next_geq(&mut self, target: u32) -> Option<u32> {
        self.postings.next_geq(target)
    }

    /// Rewinds to the first posting; used by the TAAT algorithms, which make
    /// one full pass per term rather than interleaving DAAT-style.
    pub fn move_to_start(&mut self) {
        self.postings.move_to(0);
    }

    /// Score at the current position, or `Ok(None)` if the scorer produced a
    /// non-finite value for this posting (skip, don't fail the whole query).
    pub fn score(&mut self) -> IndexResult<Option<f32>> {
        let docid = match self.postings.docid() {
            Some(d) => d,
            None => return Ok(None),
        };
        let freq = self.postings.freq().ok_or_else(|| IndexError::invariant("missing frequency at valid docid"))?;
        let doc_len = (self.doc_len_of)(docid);
        let posting = PostingStats { freq, doc_len, doc_freq: self.doc_freq, collection_prob: self.collection_prob };
        Ok(self.scorer.score(&self.collection, &posting))
    }
}

/// A [`ScoredCursor`] with a single whole-list score upper bound, for WAND/MaxScore.
pub struct MaxScoredCursor<'a> {
    pub inner: ScoredCursor<'a>,
    pub max_score: f32,
}

impl<'a> MaxScoredCursor<'a> {
    pub fn new(inner: ScoredCursor<'a>, blocks: &TermBlocks) -> Self {
        Self { inner, max_score: blocks.max_term_weight() }
    }
}

/// A [`ScoredCursor`] whose block-max bound tightens to the current block as
/// the cursor advances, for Block-Max WAND / Block-Max MaxScore.
pub struct BlockMaxScoredCursor<'a> {
    pub inner: ScoredCursor<'a>,
    blocks: &'a TermBlocks,
    current_block: usize,
}

impl<'a> BlockMaxScoredCursor<'a> {
    pub fn new(inner: ScoredCursor<'a>, blocks: &'a TermBlocks) -> Self {
        Self { inner, blocks, current_block: 0 }
    }

    pub fn max_score(&self) -> f32 {
        self.blocks.max_term_weight()
    }

    /// Upper bound for the block that contains (or would contain) `docid`.
    pub fn block_max_score(&mut self, docid: u32) -> f32 {
        if self.blocks.num_blocks() == 0 {
            return self.max_score();
        }
        self.current_block = self.blocks.block_for(docid).min(self.blocks.num_blocks() - 1);
        self.blocks.block_max_score(self.current_block)
    }

    /// Docid at which the current block's bound stops applying — the caller
    /// can skip straight there with `next_geq` once this bound is exhausted.
    pub fn block_boundary_docid(&self) -> u32 {
        if self.current_block < self.blocks.num_blocks() {
            self.blocks.block_max_docid(self.current_block)
        } else {
            u32::MAX
        }
    }

    pub fn docid(&mut self) -> Option<u32> {
        self.inner.docid()
    }

    pub fn next_geq(&mut self, target: u32) -> Option<u32> {
        self.inner.next_geq(target)
    }

    pub fn score(&mut self) -> IndexResult<Option<f32>> {
        self.inner.score()
    }
}

/// Validates a docid against the collection's universe before constructing a
/// cursor probe; used by the query algorithms to turn an out-of-range seek
/// target into `IndexError::OutOfRange` instead of silently clamping.
pub fn check_docid_range(docid: u64, num_docs: u64) -> IndexResult<()> {
    if docid >= num_docs {
        Err(IndexError::out_of_range("docid", docid, num_docs))
    } else {
        Ok(())
    }
}
