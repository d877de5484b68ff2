//! The assembled, queryable index: per-term posting lists and WAND data,
//! document-length statistics, and the small INI-style metadata header
//! written alongside the binary streams on disk.

use std::collections::HashMap;

use crate::config::Config;
use crate::error::{IndexError, IndexResult};
use crate::postings::PostingList;
use crate::scorer::{Bm25Params, CollectionStats, QueryLikelihoodParams, Scorer};
use crate::wand::TermBlocks;

/// Recognized keys in the on-disk metadata file: a manifest of the sibling
/// stream files plus the one piece of collection-wide scoring state that
/// doesn't live in its own file. Unrecognized keys are ignored rather than
/// rejected, so a newer builder's metadata stays loadable by an older reader
/// that doesn't know about a new key yet. `lexicon.*` point at files this
/// crate never writes — term dictionary and document-id mapping are an
/// external collaborator's responsibility — so they're optional and default
/// to empty.
const META_DOCUMENTS_FILE: &str = "documents.file";
const META_DOCUMENTS_OFFSETS: &str = "documents.offsets";
const META_FREQUENCIES_FILE: &str = "frequencies.file";
const META_FREQUENCIES_OFFSETS: &str = "frequencies.offsets";
const META_AVG_DOCUMENT_LENGTH: &str = "stats.avg_document_length";
const META_DOCUMENT_LENGTHS: &str = "stats.document_lengths";
const META_LEXICON_STEMMER: &str = "lexicon.stemmer";
const META_LEXICON_TERMS: &str = "lexicon.terms";
const META_LEXICON_DOCUMENTS: &str = "lexicon.documents";

#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub documents_file: String,
    pub documents_offsets: String,
    pub frequencies_file: String,
    pub frequencies_offsets: String,
    pub avg_document_length: f32,
    pub document_lengths: String,
    pub lexicon_stemmer: String,
    pub lexicon_terms: String,
    pub lexicon_documents: String,
}

impl Metadata {
    /// Parses the `key = value` INI-style metadata file described in the
    /// on-disk layout: one assignment per line, `#`-prefixed comments, blank
    /// lines ignored.
    pub fn parse(text: &str) -> IndexResult<Self> {
        let mut values: HashMap<&str, &str> = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(IndexError::invariant(format!("malformed metadata line: {line}")));
            };
            values.insert(key.trim(), value.trim());
        }
        let avg_document_length = values
            .get(META_AVG_DOCUMENT_LENGTH)
            .ok_or_else(|| IndexError::invariant(format!("missing metadata key: {META_AVG_DOCUMENT_LENGTH}")))?
            .parse::<f32>()
            .map_err(|e| IndexError::invariant(format!("invalid {META_AVG_DOCUMENT_LENGTH}: {e}")))?;
        Ok(Self {
            documents_file: parse_required_str(&values, META_DOCUMENTS_FILE)?,
            documents_offsets: parse_required_str(&values, META_DOCUMENTS_OFFSETS)?,
            frequencies_file: parse_required_str(&values, META_FREQUENCIES_FILE)?,
            frequencies_offsets: parse_required_str(&values, META_FREQUENCIES_OFFSETS)?,
            avg_document_length,
            document_lengths: parse_required_str(&values, META_DOCUMENT_LENGTHS)?,
            lexicon_stemmer: values.get(META_LEXICON_STEMMER).copied().unwrap_or("").to_string(),
            lexicon_terms: values.get(META_LEXICON_TERMS).copied().unwrap_or("").to_string(),
            lexicon_documents: values.get(META_LEXICON_DOCUMENTS).copied().unwrap_or("").to_string(),
        })
    }

    /// Writes the `key = value` INI-style metadata file.
    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> IndexResult<()> {
        let err = |e: std::io::Error| IndexError::io("<index metadata>", e);
        writeln!(writer, "{META_DOCUMENTS_FILE} = {}", self.documents_file).map_err(err)?;
        writeln!(writer, "{META_DOCUMENTS_OFFSETS} = {}", self.documents_offsets).map_err(err)?;
        writeln!(writer, "{META_FREQUENCIES_FILE} = {}", self.frequencies_file).map_err(err)?;
        writeln!(writer, "{META_FREQUENCIES_OFFSETS} = {}", self.frequencies_offsets).map_err(err)?;
        writeln!(writer, "{META_AVG_DOCUMENT_LENGTH} = {}", self.avg_document_length).map_err(err)?;
        writeln!(writer, "{META_DOCUMENT_LENGTHS} = {}", self.document_lengths).map_err(err)?;
        writeln!(writer, "{META_LEXICON_STEMMER} = {}", self.lexicon_stemmer).map_err(err)?;
        writeln!(writer, "{META_LEXICON_TERMS} = {}", self.lexicon_terms).map_err(err)?;
        writeln!(writer, "{META_LEXICON_DOCUMENTS} = {}", self.lexicon_documents).map_err(err)?;
        Ok(())
    }
}

fn parse_required_str(values: &HashMap<&str, &str>, key: &str) -> IndexResult<String> {
    values
        .get(key)
        .map(|v| v.to_string())
        .ok_or_else(|| IndexError::invariant(format!("missing metadata key: {key}")))
}

struct TermEntry {
    postings: PostingList,
    blocks: TermBlocks,
}

/// A fully loaded, queryable index.
///
/// `num_docs`/`num_terms` are derived from `doc_lengths`/`terms` themselves
/// rather than duplicated from the on-disk [`Metadata`] manifest, which only
/// exists as the external `.ini` file written alongside the stream files
/// (see `persistence::writer`) — it has no bearing on in-memory construction.
pub struct Index {
    avg_doc_len: f32,
    terms: Vec<TermEntry>,
    doc_lengths: Vec<u32>,
    config: Config,
    bm25: Bm25Params,
    ql: QueryLikelihoodParams,
}

impl Index {
    /// Assembles an index from already-built per-term data. Builders call
    /// this after merging shards; readers call it after deserializing from
    /// disk.
    pub fn new(
        avg_doc_len: f32,
        terms: Vec<(PostingList, TermBlocks)>,
        doc_lengths: Vec<u32>,
        config: Config,
        bm25: Bm25Params,
        ql: QueryLikelihoodParams,
    ) -> IndexResult<Self> {
        if terms.is_empty() {
            return Err(IndexError::invariant("index must have at least one term"));
        }
        let terms = terms.into_iter().map(|(postings, blocks)| TermEntry { postings, blocks }).collect();
        Ok(Self { avg_doc_len, terms, doc_lengths, config, bm25, ql })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn avg_doc_len(&self) -> f32 {
        self.avg_doc_len
    }

    pub fn num_docs(&self) -> u64 {
        self.doc_lengths.len() as u64
    }

    pub fn num_terms(&self) -> u64 {
        self.terms.len() as u64
    }

    pub fn doc_len(&self, docid: u32) -> IndexResult<u32> {
        self.doc_lengths
            .get(docid as usize)
            .copied()
            .ok_or_else(|| IndexError::out_of_range("docid", docid as u64, self.num_docs()))
    }

    fn term(&self, term_id: u32) -> IndexResult<&TermEntry> {
        self.terms
            .get(term_id as usize)
            .ok_or_else(|| IndexError::out_of_range("term_id", term_id as u64, self.num_terms()))
    }

    pub fn postings(&self, term_id: u32) -> IndexResult<&PostingList> {
        Ok(&self.term(term_id)?.postings)
    }

    pub fn blocks(&self, term_id: u32) -> IndexResult<&TermBlocks> {
        Ok(&self.term(term_id)?.blocks)
    }

    pub fn collection_stats(&self) -> CollectionStats {
        CollectionStats { num_docs: self.num_docs(), avg_doc_len: self.avg_doc_len }
    }

    pub fn scorer(&self, name: &str) -> IndexResult<Scorer> {
        Scorer::parse(name, self.bm25, self.ql)
    }

    /// Relative collection frequency of a term, for query-likelihood smoothing.
    pub fn collection_prob(&self, term_id: u32) -> IndexResult<f32> {
        let entry = self.term(term_id)?;
        let total_occurrences: u64 = (0..entry.postings.len())
            .map(|i| {
                let mut c = entry.postings.cursor();
                c.move_to(i);
                c.freq().unwrap_or(0) as u64
            })
            .sum();
        let collection_len: u64 = self.doc_lengths.iter().map(|&l| l as u64).sum();
        if collection_len == 0 {
            Ok(0.0)
        } else {
            Ok(total_occurrences as f32 / collection_len as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlockSize;

    #[test]
    fn metadata_parses_recognized_keys_and_ignores_unknown() {
        let text = "documents.file = idx.documents\ndocuments.offsets=idx.document_offsets\nfrequencies.file = idx.frequencies\nfrequencies.offsets = idx.frequency_offsets\n# a comment\nstats.avg_document_length = 42.5\nstats.document_lengths = idx.document_lengths\nfuture_key = ignored\n";
        let metadata = Metadata::parse(text).unwrap();
        assert_eq!(metadata.documents_file, "idx.documents");
        assert_eq!(metadata.frequencies_offsets, "idx.frequency_offsets");
        assert!((metadata.avg_document_length - 42.5).abs() < 1e-6);
        assert_eq!(metadata.lexicon_stemmer, "", "lexicon.* is optional, populated by an external lexicon builder");
    }

    #[test]
    fn metadata_rejects_missing_key() {
        assert!(Metadata::parse("documents.file = idx.documents\n").is_err());
    }

    #[test]
    fn metadata_round_trips_through_write_and_parse() {
        let metadata = Metadata {
            documents_file: "idx.documents".to_string(),
            documents_offsets: "idx.document_offsets".to_string(),
            frequencies_file: "idx.frequencies".to_string(),
            frequencies_offsets: "idx.frequency_offsets".to_string(),
            avg_document_length: 12.5,
            document_lengths: "idx.document_lengths".to_string(),
            lexicon_stemmer: "porter".to_string(),
            lexicon_terms: "idx.terms".to_string(),
            lexicon_documents: "idx.docmap".to_string(),
        };
        let mut buffer = Vec::new();
        metadata.write(&mut buffer).unwrap();
        let parsed = Metadata::parse(&String::from_utf8(buffer).unwrap()).unwrap();
        assert_eq!(parsed.documents_file, metadata.documents_file);
        assert_eq!(parsed.lexicon_stemmer, metadata.lexicon_stemmer);
        assert!((parsed.avg_document_length - metadata.avg_document_length).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_term_and_doc_rejected() {
        let list = PostingList::build(&[0, 1], &[1, 1], BlockSize::default()).unwrap();
        let blocks = TermBlocks::NonPrunable;
        let index = Index::new(10.0, vec![(list, blocks)], vec![10, 10], Config::default(), Bm25Params::default(), QueryLikelihoodParams::default())
            .unwrap();
        assert!(index.doc_len(5).is_err());
        assert!(index.postings(5).is_err());
        assert!(index.postings(0).is_ok());
    }
}
