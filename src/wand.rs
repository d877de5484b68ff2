//! WAND upper-bound metadata: per-term max score, partitioned into blocks each
//! carrying a block-local max score, for WAND/MaxScore/Block-Max pruning.
//!
//! Two on-disk flavors, chosen per collection (not per term):
//!
//! - [`WandData::Raw`] stores `f32` block-max scores directly.
//! - [`WandData::Compressed`] quantizes each block-max score into one of `R`
//!   reference buckets and packs `(docid << k) | bucket` into a single
//!   Elias-Fano sequence per term, following the packed-element layout in the
//!   reference `wand_data_compressed` design. `R` and the quantization step
//!   come from [`crate::config::Config::reference_size`] / `score_bits`.
//!
//! Terms with fewer postings than `Config::threshold_wand_list` get the
//! non-prunable sentinel: `max_term_weight = 0.0`, no blocks at all, so a
//! cursor over them degrades to no-op pruning rather than an error.

use crate::codec::elias_fano::EliasFano;
use crate::config::{BlockSize, Config};

#[derive(Debug, Clone)]
pub struct RawTermBlocks {
    pub block_max_docid: Vec<u32>,
    pub block_max_score: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct CompressedTermBlocks {
    packed: EliasFano, // element i = (block_max_docid[i] << score_bits) | bucket[i]
    max_term_weight: f32,
    quant: f32,
    score_bits: u32,
}

impl CompressedTermBlocks {
    pub fn num_blocks(&self) -> usize {
        self.packed.len()
    }

    pub fn block_max_docid(&self, i: usize) -> u32 {
        (self.packed.value_at(i) >> self.score_bits) as u32
    }

    pub fn block_max_score(&self, i: usize) -> f32 {
        let bucket = self.packed.value_at(i) & ((1u64 << self.score_bits) - 1);
        self.quant * (bucket as f32 + 1.0) * self.max_term_weight
    }
}

#[derive(Debug, Clone)]
pub enum TermBlocks {
    Raw(RawTermBlocks),
    Compressed(CompressedTermBlocks),
    /// Below `threshold_wand_list`: not worth building blocks for.
    NonPrunable,
}

impl TermBlocks {
    pub fn max_term_weight(&self) -> f32 {
        match self {
            Self::Raw(r) => r.block_max_score.iter().copied().fold(0.0, f32::max),
            Self::Compressed(c) => (0..c.num_blocks()).map(|i| c.block_max_score(i)).fold(0.0, f32::max),
            Self::NonPrunable => 0.0,
        }
    }

    pub fn num_blocks(&self) -> usize {
        match self {
            Self::Raw(r) => r.block_max_docid.len(),
            Self::Compressed(c) => c.num_blocks(),
            Self::NonPrunable => 0,
        }
    }

    pub fn block_max_docid(&self, i: usize) -> u32 {
        match self {
            Self::Raw(r) => r.block_max_docid[i],
            Self::Compressed(c) => c.block_max_docid(i),
            Self::NonPrunable => u32::MAX,
        }
    }

    pub fn block_max_score(&self, i: usize) -> f32 {
        match self {
            Self::Raw(r) => r.block_max_score[i],
            Self::Compressed(c) => c.block_max_score(i),
            Self::NonPrunable => 0.0,
        }
    }

    /// Index of the first block whose `block_max_docid >= docid`, or
    /// `num_blocks()` if none.
    pub fn block_for(&self, docid: u32) -> usize {
        (0..self.num_blocks()).find(|&i| self.block_max_docid(i) >= docid).unwrap_or_else(|| self.num_blocks())
    }
}

/// Scored `(docid, max_score)` blocks for one term, before partitioning.
pub struct ScoredBlockInput<'a> {
    pub docids: &'a [u32],
    pub scores: &'a [f32],
}

/// Builds [`TermBlocks`] for one term's posting list given its per-posting
/// scores under the collection's scorer, honoring `Config::block_size` and
/// `Config::threshold_wand_list`.
pub fn build_term_blocks(input: ScoredBlockInput, config: &Config) -> TermBlocks {
    if input.docids.len() < config.threshold_wand_list {
        return TermBlocks::NonPrunable;
    }
    let boundaries = match config.block_size {
        BlockSize::Fixed { size } => fixed_boundaries(input.docids.len(), size as usize),
        BlockSize::Variable { lambda } => variable_block_partition(input.scores, lambda),
    };
    let mut block_max_docid = Vec::with_capacity(boundaries.len() - 1);
    let mut block_max_score = Vec::with_capacity(boundaries.len() - 1);
    for w in boundaries.windows(2) {
        let (start, end) = (w[0], w[1]);
        block_max_docid.push(input.docids[end - 1]);
        block_max_score.push(input.scores[start..end].iter().copied().fold(f32::MIN, f32::max));
    }
    TermBlocks::Raw(RawTermBlocks { block_max_docid, block_max_score })
}

/// Quantizes a built [`RawTermBlocks`] into a [`CompressedTermBlocks`] using
/// `config.reference_size` buckets, following the reference
/// `wand_data_compressed` packed-element layout: each block's score,
/// normalized by the term's overall `max_term_weight`, is quantized into one
/// of `R` buckets of width `quant = 1/R`. A score `s` maps to the bucket
/// `i = floor((s / max_term_weight) / quant)`, and decodes back to
/// `quant * (i + 1) * max_term_weight` — the smallest reconstructable value
/// that is still `>= s`, so pruning against it never discards a real
/// candidate.
pub fn compress_term_blocks(raw: &RawTermBlocks, config: &Config) -> CompressedTermBlocks {
    let score_bits = config.score_bits();
    let buckets = (1u64 << score_bits).max(2);
    let max_term_weight = raw.block_max_score.iter().copied().fold(0.0f32, f32::max);
    let quant = 1.0 / buckets as f32;
    let packed: Vec<u64> = raw
        .block_max_docid
        .iter()
        .zip(raw.block_max_score.iter())
        .map(|(&docid, &score)| {
            let normalized = if max_term_weight > 0.0 { score / max_term_weight } else { 0.0 };
            let bucket = ((normalized / quant).floor() as u64).min(buckets - 1);
            ((docid as u64) << score_bits) | bucket
        })
        .collect();
    let universe = ((*raw.block_max_docid.last().unwrap_or(&0) as u64) + 1) << score_bits;
    CompressedTermBlocks { packed: EliasFano::build(&packed, universe), max_term_weight, quant, score_bits }
}

fn fixed_boundaries(n: usize, size: usize) -> Vec<usize> {
    let size = size.max(1);
    let mut bounds: Vec<usize> = (0..n).step_by(size).collect();
    bounds.push(n);
    bounds
}

/// DP partitioning of a term's per-posting scores into variable-size blocks,
/// trading block count against within-block score spread: cost of a candidate
/// block `[i, j)` is `(j - i) + lambda * (max - min)` over that span, and the
/// DP picks the boundary set minimizing total cost. Mirrors the reference
/// `wand_data_compressed` fixed-vs-variable block tradeoff one level up, at
/// partition-selection time instead of after a fixed grouping.
pub fn variable_block_partition(scores: &[f32], lambda: f32) -> Vec<usize> {
    let n = scores.len();
    if n == 0 {
        return vec![0];
    }
    const MAX_BLOCK: usize = 256;
    let mut cost = vec![f64::INFINITY; n + 1];
    let mut back = vec![0usize; n + 1];
    cost[0] = 0.0;
    for end in 1..=n {
        let start_floor = end.saturating_sub(MAX_BLOCK);
        let mut min_s = f32::MAX;
        let mut max_s = f32::MIN;
        for start in (start_floor..end).rev() {
            min_s = min_s.min(scores[start]);
            max_s = max_s.max(scores[start]);
            if cost[start].is_infinite() {
                continue;
            }
            let span_cost = (end - start) as f64 + lambda as f64 * (max_s - min_s) as f64;
            let total = cost[start] + span_cost;
            if total < cost[end] {
                cost[end] = total;
                back[end] = start;
            }
        }
    }
    let mut boundaries = vec![n];
    let mut cur = n;
    while cur > 0 {
        cur = back[cur];
        boundaries.push(cur);
    }
    boundaries.reverse();
    boundaries
}
