//! Posting-list encoding: fixed-size blocks of docid deltas and frequencies,
//! with a compact Elias-Fano skip structure over each block's last docid so
//! `next_geq` can jump straight to the right block instead of scanning.
//!
//! Short lists (below [`SMALL_LIST_THRESHOLD`]) skip the block machinery
//! entirely and fall back to a flat varbyte stream, mirroring the reference
//! index's decision to not pay block overhead on lists too short to benefit.

use crate::codec::block_codec::{self, BLOCK_SIZE};
use crate::codec::elias_fano::EliasFano;
use crate::codec::varbyte;
use crate::config::BlockSize;
use crate::error::{IndexError, IndexResult};

const SMALL_LIST_THRESHOLD: usize = 8;

#[derive(Debug, Clone)]
struct Block {
    count: usize,
    first_docid: u32,
    docs_words: Vec<u64>,
    freqs_words: Vec<u64>,
}

#[derive(Debug, Clone)]
enum Body {
    Small { docs_words: Vec<u64>, freqs_words: Vec<u64>, n: usize },
    Blocked { blocks: Vec<Block>, skip: EliasFano },
}

/// An encoded posting list: one term's `(docid, frequency)` pairs.
#[derive(Debug, Clone)]
pub struct PostingList {
    len: usize,
    body: Body,
}

impl PostingList {
    /// Builds a posting list from strictly increasing `docids` paired with
    /// per-document `freqs`, each of which must be nonzero.
    pub fn build(docids: &[u32], freqs: &[u32], block_size: BlockSize) -> IndexResult<Self> {
        if docids.len() != freqs.len() {
            return Err(IndexError::invariant("docids and freqs length mismatch"));
        }
        if docids.windows(2).any(|w| w[0] >= w[1]) {
            return Err(IndexError::invariant("posting list docids must be strictly increasing"));
        }
        if freqs.iter().any(|&f| f == 0) {
            return Err(IndexError::invariant("posting list frequency must be nonzero"));
        }
        let len = docids.len();
        if len == 0 {
            return Err(IndexError::invariant("posting list must not be empty"));
        }
        if len < SMALL_LIST_THRESHOLD {
            let deltas: Vec<u64> = std::iter::once(docids[0] as u64)
                .chain(docids.windows(2).map(|w| (w[1] - w[0]) as u64))
                .collect();
            let freq_vals: Vec<u64> = freqs.iter().map(|&f| f as u64).collect();
            return Ok(Self {
                len,
                body: Body::Small { docs_words: varbyte::encode(&deltas), freqs_words: varbyte::encode(&freq_vals), n: len },
            });
        }

        let block_len = match block_size {
            BlockSize::Fixed { size } => size as usize,
            BlockSize::Variable { .. } => BLOCK_SIZE, // variable partitioning applies to WAND data, not posting blocks
        }
        .min(BLOCK_SIZE)
        .max(1);

        let mut blocks = Vec::new();
        let mut last_docids = Vec::new();
        for chunk_start in (0..len).step_by(block_len) {
            let chunk_end = (chunk_start + block_len).min(len);
            let chunk_docs = &docids[chunk_start..chunk_end];
            let chunk_freqs = &freqs[chunk_start..chunk_end];
            let first = chunk_docs[0];
            let deltas: Vec<u32> = std::iter::once(0u32)
                .chain(chunk_docs.windows(2).map(|w| w[1] - w[0]))
                .collect();
            last_docids.push(*chunk_docs.last().unwrap() as u64);
            blocks.push(Block {
                count: chunk_docs.len(),
                first_docid: first,
                docs_words: block_codec::encode_bp128(&deltas),
                freqs_words: block_codec::encode_bp128(chunk_freqs),
            });
        }
        let universe = last_docids.last().copied().unwrap_or(0) + 1;
        let skip = EliasFano::build(&last_docids, universe);
        Ok(Self { len, body: Body::Blocked { blocks, skip } })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cursor(&self) -> PostingCursor<'_> {
        PostingCursor::new(self)
    }

    /// Serializes this term's document side to `writer`: a tag byte (0 =
    /// small/varbyte, 1 = blocked/bp128), the posting count, then either the
    /// flat varbyte words or each block's `(count, first_docid, words)`.
    /// Returns the number of bytes written, so a caller concatenating many
    /// terms can build an offset table without a second pass.
    pub fn write_documents<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<u64> {
        let mut written = write_u8(writer, self.body_tag())?;
        written += write_u32(writer, self.len as u32)?;
        match &self.body {
            Body::Small { docs_words, n, .. } => {
                written += write_u32(writer, *n as u32)?;
                written += write_words(writer, docs_words)?;
            }
            Body::Blocked { blocks, .. } => {
                written += write_u32(writer, blocks.len() as u32)?;
                for b in blocks {
                    written += write_u32(writer, b.count as u32)?;
                    written += write_u32(writer, b.first_docid)?;
                    written += write_words(writer, &b.docs_words)?;
                }
            }
        }
        Ok(written)
    }

    /// Serializes this term's frequency side to `writer`, mirroring
    /// [`Self::write_documents`] but without the per-block `first_docid`
    /// (frequencies carry no delta structure to seed).
    pub fn write_frequencies<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<u64> {
        let mut written = write_u8(writer, self.body_tag())?;
        written += write_u32(writer, self.len as u32)?;
        match &self.body {
            Body::Small { freqs_words, n, .. } => {
                written += write_u32(writer, *n as u32)?;
                written += write_words(writer, freqs_words)?;
            }
            Body::Blocked { blocks, .. } => {
                written += write_u32(writer, blocks.len() as u32)?;
                for b in blocks {
                    written += write_u32(writer, b.count as u32)?;
                    written += write_words(writer, &b.freqs_words)?;
                }
            }
        }
        Ok(written)
    }

    fn body_tag(&self) -> u8 {
        match &self.body {
            Body::Small { .. } => 0,
            Body::Blocked { .. } => 1,
        }
    }
}

fn write_u8<W: std::io::Write>(writer: &mut W, v: u8) -> std::io::Result<u64> {
    writer.write_all(&[v])?;
    Ok(1)
}

fn write_u32<W: std::io::Write>(writer: &mut W, v: u32) -> std::io::Result<u64> {
    writer.write_all(&v.to_le_bytes())?;
    Ok(4)
}

fn write_words<W: std::io::Write>(writer: &mut W, words: &[u64]) -> std::io::Result<u64> {
    writer.write_all(&(words.len() as u32).to_le_bytes())?;
    for w in words {
        writer.write_all(&w.to_le_bytes())?;
    }
    Ok(4 + words.len() as u64 * 8)
}

/// A decoded, positioned view over a [`PostingList`].
///
/// Caches the currently-decoded block so repeated `next_geq` calls inside the
/// same block (the common case in DAAT traversal) don't re-run bit decoding.
pub struct PostingCursor<'a> {
    list: &'a PostingList,
    pos: usize,
    // For the Blocked body: currently-decoded block contents.
    block_idx: usize,
    block_docs: Vec<u32>,
    block_freqs: Vec<u32>,
    within_block: usize,
}

impl<'a> PostingCursor<'a> {
    fn new(list: &'a PostingList) -> Self {
        let mut cursor = Self { list, pos: 0, block_idx: usize::MAX, block_docs: Vec::new(), block_freqs: Vec::new(), within_block: 0 };
        cursor.load_block(0);
        cursor
    }

    fn load_block(&mut self, idx: usize) {
        if self.block_idx == idx {
            return;
        }
        if let Body::Blocked { blocks, .. } = &self.list.body {
            if idx >= blocks.len() {
                self.block_idx = idx;
                self.block_docs.clear();
                self.block_freqs.clear();
                return;
            }
            let b = &blocks[idx];
            let deltas = block_codec::decode_bp128(&b.docs_words, b.count);
            let mut docs = Vec::with_capacity(b.count);
            let mut acc = b.first_docid;
            for (i, d) in deltas.iter().enumerate() {
                if i == 0 {
                    acc = b.first_docid;
                } else {
                    acc += d;
                }
                docs.push(acc);
            }
            self.block_docs = docs;
            self.block_freqs = block_codec::decode_bp128(&b.freqs_words, b.count);
            self.block_idx = idx;
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.list.len
    }

    /// Current docid, or `None` once the cursor has run off the end.
    pub fn docid(&mut self) -> Option<u32> {
        match &self.list.body {
            Body::Small { docs_words, n, .. } => {
                if self.pos >= *n {
                    return None;
                }
                Some(decode_small_docid(docs_words, self.pos))
            }
            Body::Blocked { .. } => {
                if self.pos >= self.list.len {
                    return None;
                }
                self.load_block(self.block_idx_for_pos());
                Some(self.block_docs[self.within_block])
            }
        }
    }

    /// Current frequency; only valid alongside a valid `docid()`.
    pub fn freq(&mut self) -> Option<u32> {
        match &self.list.body {
            Body::Small { freqs_words, n, .. } => {
                if self.pos >= *n {
                    return None;
                }
                Some(decode_small_freq(freqs_words, self.pos))
            }
            Body::Blocked { .. } => {
                if self.pos >= self.list.len {
                    return None;
                }
                self.load_block(self.block_idx_for_pos());
                Some(self.block_freqs[self.within_block])
            }
        }
    }

    fn block_idx_for_pos(&self) -> usize {
        if let Body::Blocked { blocks, .. } = &self.list.body {
            let mut remaining = self.pos;
            for (i, b) in blocks.iter().enumerate() {
                if remaining < b.count {
                    return i;
                }
                remaining -= b.count;
            }
        }
        0
    }

    /// Moves to rank `k`.
    pub fn move_to(&mut self, k: usize) {
        self.pos = k.min(self.list.len);
        if let Body::Blocked { blocks, .. } = &self.list.body {
            let idx = self.block_idx_for_pos();
            self.load_block(idx);
            let mut remaining = self.pos;
            for b in &blocks[..idx] {
                remaining -= b.count;
            }
            self.within_block = remaining;
        }
    }

    /// Advances to the first docid >= `target`, returning it (or `None` at end).
    pub fn next_geq(&mut self, target: u32) -> Option<u32> {
        match &self.list.body {
            Body::Small { docs_words, n, .. } => {
                while self.pos < *n && decode_small_docid(docs_words, self.pos) < target {
                    self.pos += 1;
                }
                self.docid()
            }
            Body::Blocked { blocks, skip } => {
                let mut skip_cursor = skip.cursor();
                skip_cursor.move_to(self.block_idx.min(blocks.len().saturating_sub(1)));
                let found = skip_cursor.next_geq(target as u64);
                let idx = if found == crate::codec::elias_fano::END { blocks.len() } else { skip_cursor.position() };
                if idx >= blocks.len() {
                    self.pos = self.list.len;
                    return None;
                }
                self.load_block(idx);
                let mut base = 0;
                for b in &blocks[..idx] {
                    base += b.count;
                }
                let mut within = if idx == self.block_idx_for_pos() { self.within_block } else { 0 };
                while within < self.block_docs.len() && self.block_docs[within] < target {
                    within += 1;
                }
                self.within_block = within;
                self.pos = base + within;
                self.docid()
            }
        }
    }
}

fn decode_small_docid(words: &[u64], pos: usize) -> u32 {
    // Small lists store gap deltas; decoding a single position requires
    // replaying from the start, which is fine at this list size.
    let deltas = varbyte::decode(words, pos + 1);
    deltas.iter().take(pos + 1).sum::<u64>() as u32
}

fn decode_small_freq(words: &[u64], pos: usize) -> u32 {
    let values = varbyte::decode(words, pos + 1);
    values[pos] as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(list: &PostingList) -> Vec<(u32, u32)> {
        let mut cursor = list.cursor();
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < list.len() {
            cursor.move_to(pos);
            out.push((cursor.docid().unwrap(), cursor.freq().unwrap()));
            pos += 1;
        }
        out
    }

    #[test]
    fn small_list_round_trip() {
        let docs = [1u32, 4, 9];
        let freqs = [2u32, 1, 7];
        let list = PostingList::build(&docs, &freqs, BlockSize::default()).unwrap();
        assert_eq!(collect(&list), vec![(1, 2), (4, 1), (9, 7)]);
    }

    #[test]
    fn blocked_list_round_trip_and_next_geq() {
        let docs: Vec<u32> = (0..500).map(|i| i * 3 + 1).collect();
        let freqs: Vec<u32> = (0..500).map(|i| (i % 17) + 1).collect();
        let list = PostingList::build(&docs, &freqs, BlockSize::Fixed { size: 128 }).unwrap();
        assert_eq!(collect(&list), docs.iter().zip(freqs.iter()).map(|(&d, &f)| (d, f)).collect::<Vec<_>>());

        let mut cursor = list.cursor();
        assert_eq!(cursor.next_geq(0), Some(1));
        assert_eq!(cursor.next_geq(301), Some(301));
        assert_eq!(cursor.next_geq(10_000), None);
    }

    #[test]
    fn rejects_non_monotonic_docids() {
        let docs = [5u32, 3];
        let freqs = [1u32, 1];
        assert!(PostingList::build(&docs, &freqs, BlockSize::default()).is_err());
    }

    #[test]
    fn rejects_zero_frequency() {
        let docs = [1u32, 2];
        let freqs = [1u32, 0];
        assert!(PostingList::build(&docs, &freqs, BlockSize::default()).is_err());
    }

    #[test]
    fn write_documents_and_frequencies_report_bytes_actually_written() {
        let docs: Vec<u32> = (0..300).map(|i| i * 2 + 1).collect();
        let freqs: Vec<u32> = (0..300).map(|i| (i % 9) + 1).collect();
        let list = PostingList::build(&docs, &freqs, BlockSize::Fixed { size: 64 }).unwrap();

        let mut doc_buf = Vec::new();
        let doc_written = list.write_documents(&mut doc_buf).unwrap();
        assert_eq!(doc_written, doc_buf.len() as u64);

        let mut freq_buf = Vec::new();
        let freq_written = list.write_frequencies(&mut freq_buf).unwrap();
        assert_eq!(freq_written, freq_buf.len() as u64);
    }

    #[test]
    fn small_list_serialization_is_nonempty_and_distinguishable_by_tag() {
        let docs = [1u32, 4, 9];
        let freqs = [2u32, 1, 7];
        let list = PostingList::build(&docs, &freqs, BlockSize::default()).unwrap();
        let mut buf = Vec::new();
        list.write_documents(&mut buf).unwrap();
        assert_eq!(buf[0], 0); // Small body tag
        assert!(!buf.is_empty());
    }
}
