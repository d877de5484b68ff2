//! Edge case tests for rank-wand.

use rank_wand::config::BlockSize;
use rank_wand::cursor::ScoredCursor;
use rank_wand::postings::PostingList;
use rank_wand::query::algorithms::{range_k, ranked_and, ranked_or};
use rank_wand::scorer::{Bm25Params, CollectionStats, Scorer};

#[test]
fn empty_query_returns_empty_results() {
    let mut cursors: Vec<ScoredCursor> = Vec::new();
    assert_eq!(ranked_or(&mut cursors, 10).unwrap(), Vec::new());
    assert_eq!(ranked_and(&mut cursors, 10).unwrap(), Vec::new());
}

#[test]
fn zero_k_returns_empty_results() {
    let docs = [1u32, 2, 3];
    let freqs = [1u32, 1, 1];
    let list = PostingList::build(&docs, &freqs, BlockSize::default()).unwrap();
    let collection = CollectionStats { num_docs: 10, avg_doc_len: 5.0 };
    let doc_len_of = |_docid: u32| 5u32;
    let mut cursors = vec![ScoredCursor::new(&list, Scorer::Bm25(Bm25Params::default()), collection, 3, 0.3, &doc_len_of)];
    assert_eq!(ranked_or(&mut cursors, 0).unwrap(), Vec::new());
}

#[test]
fn term2_next_geq_sweep_matches_sequence() {
    // term 2's docid stream [0, 1, 2, 3]; probing every integer in [0, 4]
    // walks the sequence exactly, then the end sentinel.
    let docs = [0u32, 1, 2, 3];
    let freqs = [1u32, 1, 1, 1];
    let list = PostingList::build(&docs, &freqs, BlockSize::default()).unwrap();
    let mut cursor = list.cursor();
    let mut results = Vec::new();
    for v in 0u32..=4 {
        results.push(cursor.next_geq(v));
    }
    assert_eq!(results, vec![Some(0), Some(1), Some(2), Some(3), None]);
}

#[test]
fn ranked_and_requires_all_terms_present() {
    let docs_a = [0u32, 1, 2, 3];
    let docs_b = [1u32, 3];
    let freqs_a = vec![1u32; docs_a.len()];
    let freqs_b = vec![1u32; docs_b.len()];
    let list_a = PostingList::build(&docs_a, &freqs_a, BlockSize::default()).unwrap();
    let list_b = PostingList::build(&docs_b, &freqs_b, BlockSize::default()).unwrap();
    let collection = CollectionStats { num_docs: 4, avg_doc_len: 2.0 };
    let doc_len_of = |_docid: u32| 2u32;
    let scorer = Scorer::Bm25(Bm25Params::default());
    let mut cursors = vec![
        ScoredCursor::new(&list_a, scorer, collection, 4, 1.0, &doc_len_of),
        ScoredCursor::new(&list_b, scorer, collection, 2, 0.5, &doc_len_of),
    ];
    let result = ranked_and(&mut cursors, 10).unwrap();
    let docids: Vec<u32> = result.iter().map(|&(d, _)| d).collect();
    assert_eq!(docids.into_iter().collect::<std::collections::HashSet<_>>(), [1u32, 3].into_iter().collect());
}

#[test]
fn range_k_restricts_to_docid_window() {
    let docs: Vec<u32> = (0..20).collect();
    let freqs = vec![1u32; 20];
    let list = PostingList::build(&docs, &freqs, BlockSize::default()).unwrap();
    let collection = CollectionStats { num_docs: 20, avg_doc_len: 1.0 };
    let doc_len_of = |_docid: u32| 1u32;
    let mut cursors = vec![ScoredCursor::new(&list, Scorer::Bm25(Bm25Params::default()), collection, 20, 1.0, &doc_len_of)];
    let result = range_k(&mut cursors, 5, 10, 20).unwrap();
    let docids: Vec<u32> = result.iter().map(|&(d, _)| d).collect();
    for d in &docids {
        assert!((5..10).contains(d));
    }
    assert_eq!(docids.len(), 5);
}
