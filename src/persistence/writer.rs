//! Writes a built [`Index`] out to the on-disk layout: concatenated document
//! and frequency streams with their offset tables, a document-length table,
//! and the `.ini` metadata manifest.
//!
//! The builder already merges shards into one globally ordered [`PostingList`]
//! per term (see [`crate::builder::build_index`]), so there is no per-shard
//! scratch file to rebase here — the rebasing happens at the point where it
//! matters: each term's serialized byte length is added to a running offset
//! as streams are written in term-id order, giving the same strictly
//! increasing, `num_terms + 1`-length offset tables a shard-then-rebase
//! merge would produce, from input that's independent of shard boundaries.

use std::io::Write;

use crate::error::{IndexError, IndexResult};
use crate::index::{Index, Metadata};
use crate::persistence::directory::Directory;

const STREAM_MAGIC: [u8; 4] = *b"RWST";
const STREAM_VERSION: u32 = 1;
const STREAM_HEADER_LEN: u64 = STREAM_MAGIC.len() as u64 + 4;

/// Writes `index` under `directory` using `base` as the filename stem:
/// `<base>.documents`, `<base>.frequencies`, `<base>.document_offsets`,
/// `<base>.frequency_offsets`, `<base>.document_lengths`, `<base>.ini`.
pub fn write_index(directory: &dyn Directory, base: &str, index: &Index) -> IndexResult<()> {
    let documents_path = format!("{base}.documents");
    let frequencies_path = format!("{base}.frequencies");
    let document_offsets_path = format!("{base}.document_offsets");
    let frequency_offsets_path = format!("{base}.frequency_offsets");
    let document_lengths_path = format!("{base}.document_lengths");
    let ini_path = format!("{base}.ini");

    let (document_offsets, frequency_offsets) = write_streams(directory, &documents_path, &frequencies_path, index)?;
    write_u64_table(directory, &document_offsets_path, &document_offsets)?;
    write_u64_table(directory, &frequency_offsets_path, &frequency_offsets)?;
    write_document_lengths(directory, &document_lengths_path, index)?;

    let metadata = Metadata {
        documents_file: documents_path,
        documents_offsets: document_offsets_path,
        frequencies_file: frequencies_path,
        frequencies_offsets: frequency_offsets_path,
        avg_document_length: index.avg_doc_len(),
        document_lengths: document_lengths_path,
        lexicon_stemmer: String::new(),
        lexicon_terms: String::new(),
        lexicon_documents: String::new(),
    };
    let mut ini_file = directory.create_file(&ini_path)?;
    metadata.write(&mut ini_file)?;
    Ok(())
}

/// Writes every term's document and frequency bytes, in term-id order, to
/// the two concatenated streams, returning the `num_terms + 1`-length
/// offset tables (I2): offset `t` is where term `t`'s bytes start, and the
/// final entry is the stream's total length.
fn write_streams(directory: &dyn Directory, documents_path: &str, frequencies_path: &str, index: &Index) -> IndexResult<(Vec<u64>, Vec<u64>)> {
    let mut documents = directory.create_file(documents_path)?;
    let mut frequencies = directory.create_file(frequencies_path)?;
    write_stream_header(&mut documents, documents_path)?;
    write_stream_header(&mut frequencies, frequencies_path)?;

    let num_terms = index.num_terms() as u32;
    let mut document_offsets = Vec::with_capacity(num_terms as usize + 1);
    let mut frequency_offsets = Vec::with_capacity(num_terms as usize + 1);
    let mut doc_pos = STREAM_HEADER_LEN;
    let mut freq_pos = STREAM_HEADER_LEN;
    document_offsets.push(doc_pos);
    frequency_offsets.push(freq_pos);

    for term_id in 0..num_terms {
        let postings = index.postings(term_id)?;
        doc_pos += postings.write_documents(&mut documents).map_err(|e| IndexError::io(documents_path, e))?;
        freq_pos += postings.write_frequencies(&mut frequencies).map_err(|e| IndexError::io(frequencies_path, e))?;
        document_offsets.push(doc_pos);
        frequency_offsets.push(freq_pos);
    }
    Ok((document_offsets, frequency_offsets))
}

fn write_stream_header<W: Write>(writer: &mut W, path: &str) -> IndexResult<()> {
    writer.write_all(&STREAM_MAGIC).map_err(|e| IndexError::io(path, e))?;
    writer.write_all(&STREAM_VERSION.to_le_bytes()).map_err(|e| IndexError::io(path, e))?;
    Ok(())
}

fn write_u64_table(directory: &dyn Directory, path: &str, values: &[u64]) -> IndexResult<()> {
    let mut file = directory.create_file(path)?;
    for &v in values {
        file.write_all(&v.to_le_bytes()).map_err(|e| IndexError::io(path, e))?;
    }
    Ok(())
}

fn write_document_lengths(directory: &dyn Directory, path: &str, index: &Index) -> IndexResult<()> {
    let mut file = directory.create_file(path)?;
    for docid in 0..index.num_docs() as u32 {
        let length = index.doc_len(docid)?;
        file.write_all(&length.to_le_bytes()).map_err(|e| IndexError::io(path, e))?;
    }
    Ok(())
}
