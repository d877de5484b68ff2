//! Fixed-size block codecs: SIMD-BP128-style bit-packing and binary interpolative coding.
//!
//! Both operate on blocks of up to 128 values and are used interchangeably as
//! the per-block codec inside [`crate::postings`] for docid deltas and
//! frequencies alike — generalizes the single fixed-width bit-packer in this
//! crate's persistence layer (`persistence::codec::bitpack`) to a per-block
//! width chosen by the block's own max value, plus a second, non-bit-packed
//! option for already-clustered monotone runs.

use crate::bitio::{BitReader, BitWriter};

pub const BLOCK_SIZE: usize = 128;

/// Packs `values` (non-negative, no ordering assumed) into a block header
/// giving the bit width of the largest value, followed by each value
/// bit-packed to that width. Mirrors SIMD-BP128's "one width per block of 128"
/// layout without requiring an actual SIMD lane count.
pub fn encode_bp128(values: &[u32]) -> Vec<u64> {
    let max = values.iter().copied().max().unwrap_or(0);
    let width = bit_width(max);
    let mut w = BitWriter::new();
    w.append_bits(width as u64, 8);
    for &v in values {
        w.append_bits(v as u64, width);
    }
    w.into_words()
}

pub fn decode_bp128(words: &[u64], n: usize) -> Vec<u32> {
    let mut r = BitReader::new(words);
    let width = r.get_bits(8) as u32;
    (0..n).map(|_| r.get_bits(width) as u32).collect()
}

fn bit_width(max: u32) -> u32 {
    32 - max.leading_zeros()
}

/// Binary interpolative coding: recursively encodes the middle element of a
/// strictly increasing run as an offset within the range implied by its
/// neighbors, then recurses on the two halves. Effective when gaps cluster
/// (bursty term occurrences within a document block), the complement to
/// `encode_bp128`'s flat width when a block's values don't share one width well.
pub fn encode_interpolative(values: &[u32], lo: u32, hi: u32) -> Vec<u64> {
    let mut w = BitWriter::new();
    encode_interp_range(&mut w, values, lo, hi);
    w.into_words()
}

fn encode_interp_range(w: &mut BitWriter, values: &[u32], lo: u32, hi: u32) {
    if values.is_empty() {
        return;
    }
    let mid = values.len() / 2;
    let v = values[mid];
    // v must lie in [lo + mid, hi - (len-1-mid)] given the strictly increasing
    // neighbors on either side; encode the offset from that tightened low bound.
    let low_bound = lo + mid as u32;
    let high_bound = hi - (values.len() - 1 - mid) as u32;
    let range = high_bound - low_bound;
    let width = bits_for_range(range);
    w.append_bits((v - low_bound) as u64, width);
    encode_interp_range(w, &values[..mid], lo, v - 1);
    encode_interp_range(w, &values[mid + 1..], v + 1, hi);
}

pub fn decode_interpolative(words: &[u64], n: usize, lo: u32, hi: u32) -> Vec<u32> {
    let mut r = BitReader::new(words);
    let mut out = vec![0u32; n];
    decode_interp_range(&mut r, &mut out, lo, hi);
    out
}

fn decode_interp_range(r: &mut BitReader, out: &mut [u32], lo: u32, hi: u32) {
    if out.is_empty() {
        return;
    }
    let mid = out.len() / 2;
    let low_bound = lo + mid as u32;
    let high_bound = hi - (out.len() - 1 - mid) as u32;
    let range = high_bound - low_bound;
    let width = bits_for_range(range);
    let v = low_bound + r.get_bits(width) as u32;
    out[mid] = v;
    let (left, rest) = out.split_at_mut(mid);
    let right = &mut rest[1..];
    decode_interp_range(r, left, lo, v - 1);
    decode_interp_range(r, right, v + 1, hi);
}

fn bits_for_range(range: u32) -> u32 {
    if range == 0 {
        0
    } else {
        32 - range.leading_zeros()
    }
}
