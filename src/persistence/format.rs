//! Binary format definitions for persisted indexes: the fixed-size footer at
//! the end of the single combined index file, giving byte offsets into the
//! postings, WAND, and document-length streams that precede it. The metadata
//! INI file ([`crate::index::Metadata`]) is kept as a separate, human-readable
//! sibling file rather than folded into this binary footer.

use crate::error::{IndexError, IndexResult};

/// Magic bytes identifying this crate's index file format.
pub const MAGIC_BYTES: [u8; 4] = *b"WAND";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

/// Fixed-size footer at the end of a combined index file (`#[repr(C)]`,
/// `bytemuck::Pod` for zero-copy reads off a memory map).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "persistence", derive(bytemuck::Pod, bytemuck::Zeroable))]
pub struct IndexFooter {
    pub magic: [u8; 4],
    pub format_version: u32,

    pub postings_offset: u64,
    pub postings_len: u64,

    pub wand_offset: u64,
    pub wand_len: u64,

    pub doc_lengths_offset: u64,
    pub doc_lengths_len: u64,

    pub num_docs: u64,
    pub num_terms: u64,

    pub checksum: u32,
    pub padding: [u8; 4],
}

impl IndexFooter {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(offsets: IndexOffsets, num_docs: u64, num_terms: u64) -> Self {
        Self {
            magic: MAGIC_BYTES,
            format_version: FORMAT_VERSION,
            postings_offset: offsets.postings_offset,
            postings_len: offsets.postings_len,
            wand_offset: offsets.wand_offset,
            wand_len: offsets.wand_len,
            doc_lengths_offset: offsets.doc_lengths_offset,
            doc_lengths_len: offsets.doc_lengths_len,
            num_docs,
            num_terms,
            checksum: 0,
            padding: [0; 4],
        }
    }

    pub fn validate(&self) -> IndexResult<()> {
        if self.magic != MAGIC_BYTES {
            return Err(IndexError::invariant(format!("invalid index magic bytes: {:?}", self.magic)));
        }
        if self.format_version != FORMAT_VERSION {
            return Err(IndexError::invariant(format!(
                "index format version mismatch: expected {FORMAT_VERSION}, found {}",
                self.format_version
            )));
        }
        Ok(())
    }

    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> IndexResult<()> {
        use byteorder::{LittleEndian, WriteBytesExt};
        let err = |e: std::io::Error| IndexError::io("<index footer>", e);
        writer.write_all(&self.magic).map_err(err)?;
        writer.write_u32::<LittleEndian>(self.format_version).map_err(err)?;
        writer.write_u64::<LittleEndian>(self.postings_offset).map_err(err)?;
        writer.write_u64::<LittleEndian>(self.postings_len).map_err(err)?;
        writer.write_u64::<LittleEndian>(self.wand_offset).map_err(err)?;
        writer.write_u64::<LittleEndian>(self.wand_len).map_err(err)?;
        writer.write_u64::<LittleEndian>(self.doc_lengths_offset).map_err(err)?;
        writer.write_u64::<LittleEndian>(self.doc_lengths_len).map_err(err)?;
        writer.write_u64::<LittleEndian>(self.num_docs).map_err(err)?;
        writer.write_u64::<LittleEndian>(self.num_terms).map_err(err)?;
        writer.write_u32::<LittleEndian>(self.checksum).map_err(err)?;
        writer.write_all(&self.padding).map_err(err)?;
        Ok(())
    }

    pub fn read<R: std::io::Read>(reader: &mut R) -> IndexResult<Self> {
        use byteorder::{LittleEndian, ReadBytesExt};
        let err = |e: std::io::Error| IndexError::io("<index footer>", e);
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(err)?;
        let format_version = reader.read_u32::<LittleEndian>().map_err(err)?;
        let postings_offset = reader.read_u64::<LittleEndian>().map_err(err)?;
        let postings_len = reader.read_u64::<LittleEndian>().map_err(err)?;
        let wand_offset = reader.read_u64::<LittleEndian>().map_err(err)?;
        let wand_len = reader.read_u64::<LittleEndian>().map_err(err)?;
        let doc_lengths_offset = reader.read_u64::<LittleEndian>().map_err(err)?;
        let doc_lengths_len = reader.read_u64::<LittleEndian>().map_err(err)?;
        let num_docs = reader.read_u64::<LittleEndian>().map_err(err)?;
        let num_terms = reader.read_u64::<LittleEndian>().map_err(err)?;
        let checksum = reader.read_u32::<LittleEndian>().map_err(err)?;
        let mut padding = [0u8; 4];
        reader.read_exact(&mut padding).map_err(err)?;

        let footer = Self {
            magic,
            format_version,
            postings_offset,
            postings_len,
            wand_offset,
            wand_len,
            doc_lengths_offset,
            doc_lengths_len,
            num_docs,
            num_terms,
            checksum,
            padding,
        };
        footer.validate()?;
        Ok(footer)
    }
}

/// Byte offsets of each stream within the combined index file, computed by
/// the writer as it lays out sections before appending the footer.
#[derive(Debug, Clone, Default)]
pub struct IndexOffsets {
    pub postings_offset: u64,
    pub postings_len: u64,
    pub wand_offset: u64,
    pub wand_len: u64,
    pub doc_lengths_offset: u64,
    pub doc_lengths_len: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footer_round_trips() {
        let offsets = IndexOffsets { postings_offset: 0, postings_len: 100, wand_offset: 100, wand_len: 40, doc_lengths_offset: 140, doc_lengths_len: 20 };
        let mut footer = IndexFooter::new(offsets, 500, 30);
        footer.checksum = 0xdead_beef;

        let mut buffer = Vec::new();
        footer.write(&mut buffer).unwrap();
        assert_eq!(buffer.len(), IndexFooter::SIZE);

        let read_back = IndexFooter::read(&mut std::io::Cursor::new(&buffer)).unwrap();
        assert_eq!(read_back.num_docs, 500);
        assert_eq!(read_back.num_terms, 30);
        assert_eq!(read_back.checksum, 0xdead_beef);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buffer = vec![0u8; IndexFooter::SIZE];
        buffer[0..4].copy_from_slice(b"NOPE");
        assert!(IndexFooter::read(&mut std::io::Cursor::new(&buffer)).is_err());
    }
}
