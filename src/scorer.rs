//! Term-scoring functions: Okapi BM25 and query-likelihood with Dirichlet
//! smoothing. Stateless: all collection statistics are passed in per call
//! rather than cached on the scorer, so the same [`Scorer`] value can be
//! shared across threads during a parallel build.

use crate::error::{IndexError, IndexResult};

/// BM25 parameters. The reference retrieval crate defaults to `k1 = 1.2,
/// b = 0.75`; this collection's default is `k1 = 0.9, b = 0.4`, a tuning
/// decision fixed by the index's own defaults rather than inherited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 0.9, b: 0.4 }
    }
}

/// Query-likelihood with Dirichlet smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryLikelihoodParams {
    pub mu: f32,
}

impl Default for QueryLikelihoodParams {
    fn default() -> Self {
        Self { mu: 1000.0 }
    }
}

/// Collection-wide statistics a scorer needs beyond the single posting it's scoring.
#[derive(Debug, Clone, Copy)]
pub struct CollectionStats {
    pub num_docs: u64,
    pub avg_doc_len: f32,
}

/// Per-posting inputs a scorer needs beyond the collection statistics.
#[derive(Debug, Clone, Copy)]
pub struct PostingStats {
    pub freq: u32,
    pub doc_len: u32,
    pub doc_freq: u64,
    /// Term's relative frequency in the whole collection; only used by
    /// query-likelihood (`collection_freq / collection_len`).
    pub collection_prob: f32,
}

#[derive(Debug, Clone, Copy)]
pub enum Scorer {
    Bm25(Bm25Params),
    QueryLikelihood(QueryLikelihoodParams),
}

impl Scorer {
    pub fn parse(name: &str, bm25: Bm25Params, ql: QueryLikelihoodParams) -> IndexResult<Self> {
        match name {
            "bm25" => Ok(Self::Bm25(bm25)),
            "ql" | "query_likelihood" | "dirichlet" => Ok(Self::QueryLikelihood(ql)),
            other => Err(IndexError::invariant(format!("unknown scorer: {other}"))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bm25(_) => "bm25",
            Self::QueryLikelihood(_) => "ql",
        }
    }

    /// Score of a single posting. Returns `None` (rather than NaN/inf) when
    /// the inputs are numerically degenerate, per the crate's
    /// `NumericDegenerate` error class — callers skip such postings instead of
    /// poisoning the top-k heap.
    pub fn score(&self, collection: &CollectionStats, posting: &PostingStats) -> Option<f32> {
        let value = match self {
            Self::Bm25(params) => bm25_score(params, collection, posting),
            Self::QueryLikelihood(params) => ql_score(params, collection, posting),
        };
        if value.is_finite() {
            Some(value)
        } else {
            None
        }
    }
}

fn bm25_idf(num_docs: u64, doc_freq: u64) -> f32 {
    let n = num_docs as f32;
    let df = doc_freq as f32;
    (((n - df + 0.5) / (df + 0.5)) + 1.0).ln()
}

fn bm25_score(params: &Bm25Params, collection: &CollectionStats, posting: &PostingStats) -> f32 {
    let idf = bm25_idf(collection.num_docs, posting.doc_freq);
    let f = posting.freq as f32;
    let norm = 1.0 - params.b + params.b * (posting.doc_len as f32 / collection.avg_doc_len);
    idf * (f * (params.k1 + 1.0)) / (f + params.k1 * norm)
}

fn ql_score(params: &QueryLikelihoodParams, _collection: &CollectionStats, posting: &PostingStats) -> f32 {
    let numerator = posting.freq as f32 + params.mu * posting.collection_prob;
    let denominator = posting.doc_len as f32 + params.mu;
    (numerator / denominator).ln()
}

/// Upper bound on `score()` over any posting with the given document
/// frequency and collection stats, used when a block-max structure wants an
/// a-priori bound rather than the exact per-block maximum (e.g. a
/// newly-appended block before its postings are known). BM25's bound comes
/// from saturating `f -> infinity`; query-likelihood has no such bound, so it
/// falls back to the Dirichlet score at the maximum representable frequency.
pub fn max_possible_score(scorer: &Scorer, collection: &CollectionStats, doc_freq: u64) -> f32 {
    match scorer {
        Scorer::Bm25(params) => bm25_idf(collection.num_docs, doc_freq) * (params.k1 + 1.0),
        Scorer::QueryLikelihood(params) => ((u32::MAX as f32 + params.mu) / (1.0 + params.mu)).ln(),
    }
}
