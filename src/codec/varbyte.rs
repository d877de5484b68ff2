//! Bit-aligned varbyte codec.
//!
//! The fallback codec for both docid gaps and frequencies: no block structure,
//! no upfront bit-width scan, just a 7-bits-of-payload / 1-bit-continuation
//! encoding of each value written with [`crate::bitio::BitWriter`]. Used when a
//! list is too short for the DP-partitioned or fixed-block codecs to pay for
//! their own overhead (see [`crate::postings`]'s block-size threshold).

use crate::bitio::{BitReader, BitWriter};

/// Encodes `values` (already delta-coded by the caller if monotone) as a varbyte stream.
pub fn encode(values: &[u64]) -> Vec<u64> {
    let mut w = BitWriter::new();
    for &v in values {
        encode_one(&mut w, v);
    }
    w.into_words()
}

fn encode_one(w: &mut BitWriter, mut v: u64) {
    loop {
        let byte = (v & 0x7f) as u64;
        v >>= 7;
        if v == 0 {
            w.append_bits(byte, 8);
            return;
        }
        w.append_bits(byte | 0x80, 8);
    }
}

/// Decodes `n` varbyte-encoded values from `words`.
pub fn decode(words: &[u64], n: usize) -> Vec<u64> {
    let mut r = BitReader::new(words);
    (0..n).map(|_| decode_one(&mut r)).collect()
}

fn decode_one(r: &mut BitReader) -> u64 {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = r.get_bits(8);
        value |= (byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return value;
        }
        shift += 7;
    }
}

/// Cursor over a varbyte stream. Unlike Elias-Fano there is no random-access
/// structure, so `next_geq` is a linear scan forward from the current position —
/// the reason this codec is reserved for short lists.
pub struct VarbyteCursor<'a> {
    words: &'a [u64],
    deltas: bool,
    n: usize,
    pos: usize,
    bit_pos: usize,
    value: u64,
}

impl<'a> VarbyteCursor<'a> {
    pub fn new(words: &'a [u64], n: usize, deltas: bool) -> Self {
        let mut cursor = Self { words, deltas, n, pos: 0, bit_pos: 0, value: 0 };
        if n > 0 {
            cursor.decode_current();
        }
        cursor
    }

    fn decode_current(&mut self) {
        let mut r = BitReader::at(self.words, self.bit_pos);
        let raw = decode_one(&mut r);
        self.bit_pos = r.position();
        self.value = if self.deltas && self.pos > 0 { self.value + raw } else { raw };
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn value(&self) -> Option<u64> {
        if self.pos < self.n {
            Some(self.value)
        } else {
            None
        }
    }

    pub fn next_geq(&mut self, target: u64) -> Option<u64> {
        while self.pos < self.n && self.value < target {
            self.pos += 1;
            if self.pos < self.n {
                self.decode_current();
            }
        }
        self.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let values = [0u64, 1, 127, 128, 16383, 16384, 1 << 40];
        let words = encode(&values);
        let decoded = decode(&words, values.len());
        assert_eq!(decoded, values);
    }

    #[test]
    fn cursor_over_deltas() {
        let docs = [3u64, 9, 10, 50, 1000];
        let deltas: Vec<u64> = std::iter::once(docs[0])
            .chain(docs.windows(2).map(|w| w[1] - w[0]))
            .collect();
        let words = encode(&deltas);
        let mut cursor = VarbyteCursor::new(&words, docs.len(), true);
        assert_eq!(cursor.value(), Some(3));
        assert_eq!(cursor.next_geq(10), Some(10));
        assert_eq!(cursor.next_geq(51), Some(1000));
        assert_eq!(cursor.next_geq(1001), None);
    }
}
