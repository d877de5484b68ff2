//! Explicit configuration, threaded through builders and scorers.
//!
//! The reference implementation reads these three knobs from a process-wide
//! `configuration::get()` singleton. Here they are an ordinary value passed by
//! the caller, matching the rest of this crate's style of threading parameters
//! (`Bm25Params`, `QueryLikelihoodParams`) rather than reaching for global state.

/// Block-size policy for posting lists and WAND data.
///
/// Mirrors the `FixedBlock | VariableBlock` choice in the reference index: a
/// fixed block groups every `size` postings together regardless of score
/// distribution, while a variable block is chosen by a cost-minimizing DP
/// parameterized by `lambda` (see [`crate::wand::variable_block_partition`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockSize {
    Fixed { size: u32 },
    Variable { lambda: f32 },
}

impl Default for BlockSize {
    fn default() -> Self {
        Self::Fixed { size: 128 }
    }
}

/// Collection- and query-wide knobs.
///
/// `reference_size` and the `num_docs` used to size the compact Elias-Fano
/// universe are deliberately kept as two separate call sites (see
/// [`crate::wand::compress_term_blocks`]) even though the reference
/// implementation reuses one configuration field for both; conflating them was
/// flagged as an open question in the design notes.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Number of quantization buckets `R` for compressed WAND scores. Must be a
    /// power of two; `log2(reference_size)` is the number of low bits reserved
    /// for the bucket index in the packed `(docid << k) | bucket` element.
    pub reference_size: u32,

    /// Terms with fewer postings than this are not worth building WAND blocks
    /// for; they get the non-prunable sentinel (`max_term_weight = 0`, no
    /// blocks).
    pub threshold_wand_list: usize,

    /// Default top-k heap capacity when a query doesn't specify one.
    pub k: usize,

    /// Default block-size policy used by the WAND builder.
    pub block_size: BlockSize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_size: 256,
            threshold_wand_list: 1024,
            k: 10,
            block_size: BlockSize::default(),
        }
    }
}

impl Config {
    /// `log2(reference_size)`, the number of low bits of a compressed-WAND
    /// element reserved for the score bucket.
    pub fn score_bits(&self) -> u32 {
        debug_assert!(self.reference_size.is_power_of_two());
        self.reference_size.trailing_zeros()
    }
}
