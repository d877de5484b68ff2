//! End-to-end integration tests for rank-wand: build a tiny collection
//! through the sharded builder, assemble it into an [`Index`], and run
//! queries through the DAAT pruning algorithms.

use std::collections::HashSet;
use std::sync::atomic::AtomicBool;

use rank_wand::builder::{build_index, RawDocument};
use rank_wand::config::{BlockSize, Config};
use rank_wand::cursor::{MaxScoredCursor, ScoredCursor};
use rank_wand::index::Index;
use rank_wand::postings::PostingList;
use rank_wand::query::algorithms::{ranked_or, wand};
use rank_wand::scorer::{Bm25Params, QueryLikelihoodParams};
use rank_wand::wand::{build_term_blocks, ScoredBlockInput, TermBlocks};

fn doc(docid: u32, terms: Vec<(u32, u32)>) -> RawDocument {
    let length = terms.iter().map(|&(_, f)| f).sum::<u32>().max(1);
    RawDocument { docid, terms, length }
}

/// Assembles the four-document, three-term collection directly (bypassing
/// the sharded builder) so the query-layer tests below aren't coupled to the
/// builder's own correctness.
fn tiny_index() -> Index {
    let term0 = PostingList::build(&[0, 2, 3], &[2, 1, 1], BlockSize::default()).unwrap();
    let term1 = PostingList::build(&[1, 3], &[3, 2], BlockSize::default()).unwrap();
    let term2 = PostingList::build(&[0, 1, 2, 3], &[1, 1, 1, 1], BlockSize::default()).unwrap();
    Index::new(
        3.0,
        vec![(term0, TermBlocks::NonPrunable), (term1, TermBlocks::NonPrunable), (term2, TermBlocks::NonPrunable)],
        vec![3, 4, 2, 4],
        Config::default(),
        Bm25Params::default(),
        QueryLikelihoodParams::default(),
    )
    .unwrap()
}

fn scored_cursor_for<'a>(index: &'a Index, term_id: u32, doc_len_of: &'a dyn Fn(u32) -> u32) -> ScoredCursor<'a> {
    let postings = index.postings(term_id).unwrap();
    let collection_prob = index.collection_prob(term_id).unwrap();
    ScoredCursor::new(postings, index.scorer("bm25").unwrap(), index.collection_stats(), postings.len() as u64, collection_prob, doc_len_of)
}

#[test]
fn tiny_corpus_query_ranks_doc_zero_first() {
    // Doc 0 matches both query terms {0, 2} at the highest combined
    // frequency of any document in the collection, so it must lead the
    // top-k regardless of the exact scorer parameterization.
    let index = tiny_index();
    let doc_len_of = |docid: u32| index.doc_len(docid).unwrap();
    let mut cursors = vec![scored_cursor_for(&index, 0, &doc_len_of), scored_cursor_for(&index, 2, &doc_len_of)];
    let top2 = ranked_or(&mut cursors, 2).unwrap();
    assert_eq!(top2.len(), 2);
    assert_eq!(top2[0].0, 0);
    assert!(top2[0].1 >= top2[1].1);
}

#[test]
fn wand_and_ranked_or_agree_on_docid_set() {
    let index = tiny_index();
    let doc_len_of = |docid: u32| index.doc_len(docid).unwrap();

    let mut or_cursors = vec![
        scored_cursor_for(&index, 0, &doc_len_of),
        scored_cursor_for(&index, 1, &doc_len_of),
        scored_cursor_for(&index, 2, &doc_len_of),
    ];
    let or_result = ranked_or(&mut or_cursors, 3).unwrap();

    let wand_config = Config { threshold_wand_list: 1, ..Config::default() };
    let term_ids = [0u32, 1, 2];
    let blocks: Vec<TermBlocks> = term_ids
        .iter()
        .map(|&t| {
            let postings = index.postings(t).unwrap();
            let mut cursor = postings.cursor();
            let mut docids = Vec::new();
            let mut scores = Vec::new();
            for pos in 0..postings.len() {
                cursor.move_to(pos);
                docids.push(cursor.docid().unwrap());
                scores.push(1.0f32);
            }
            build_term_blocks(ScoredBlockInput { docids: &docids, scores: &scores }, &wand_config)
        })
        .collect();
    let mut wand_cursors: Vec<MaxScoredCursor> = term_ids
        .iter()
        .zip(&blocks)
        .map(|(&t, b)| MaxScoredCursor::new(scored_cursor_for(&index, t, &doc_len_of), b))
        .collect();
    let wand_result = wand(&mut wand_cursors, 3).unwrap();

    let or_docids: HashSet<u32> = or_result.iter().map(|&(d, _)| d).collect();
    let wand_docids: HashSet<u32> = wand_result.iter().map(|&(d, _)| d).collect();
    assert_eq!(or_docids, wand_docids);
}

#[test]
fn next_geq_sweep_over_term_two() {
    let index = tiny_index();
    let mut cursor = index.postings(2).unwrap().cursor();
    let got: Vec<Option<u32>> = (0u32..=4).map(|v| cursor.next_geq(v)).collect();
    assert_eq!(got, vec![Some(0), Some(1), Some(2), Some(3), None]);
}

#[test]
fn quantization_reconstructs_within_bound() {
    // Two blocks: the first tops out at 1.3, the second at 4.0, so
    // max_term_weight = 4.0 and R=8 buckets quantize normalized scores in
    // steps of max_term_weight/R = 0.5. The first block's reconstructed max
    // must land in [1.3, 1.3 + 0.5), and must equal the spec's literal
    // scenario-four value of 1.5 exactly.
    let docids: Vec<u32> = (0..64).collect();
    let mut scores = vec![0.0f32; 64];
    scores[5] = 1.3; // this block's max
    scores[40] = 4.0; // the other block's max, setting max_term_weight
    let config = Config { threshold_wand_list: 1, block_size: BlockSize::Fixed { size: 32 }, reference_size: 8, ..Config::default() };
    let blocks = build_term_blocks(ScoredBlockInput { docids: &docids, scores: &scores }, &config);
    let TermBlocks::Raw(raw) = &blocks else { panic!("expected two Raw blocks") };
    assert_eq!(raw.block_max_score.len(), 2);
    let compressed = rank_wand::wand::compress_term_blocks(raw, &config);
    let true_score = raw.block_max_score[0];
    let max_term_weight = raw.block_max_score.iter().copied().fold(0.0f32, f32::max);
    let step = max_term_weight / config.reference_size as f32;
    let got = compressed.block_max_score(0);
    assert!(got + 1e-4 >= true_score, "reconstructed {got} underestimates true {true_score}");
    assert!(got < true_score + step + 1e-4, "reconstructed {got} exceeds bound for true {true_score}");
    assert!((got - 1.5).abs() < 1e-4, "expected exact reconstruction 1.5, got {got}");
}

#[test]
fn parallel_merge_is_deterministic_across_shard_counts() {
    let docs: Vec<RawDocument> = (0..8u32)
        .map(|d| doc(d, vec![(0, (d % 3) + 1), (1, (d % 2) + 1)]))
        .collect();

    let build_with_shards = |shard_count: usize| {
        let shard_size = (docs.len() / shard_count).max(1);
        let shards: Vec<Vec<RawDocument>> = docs.chunks(shard_size).map(|c| c.to_vec()).collect();
        let cancel = AtomicBool::new(false);
        build_index(shards, 2, Config::default(), Bm25Params::default(), QueryLikelihoodParams::default(), &cancel).unwrap()
    };

    let single_shard = build_with_shards(1);
    let four_shards = build_with_shards(4);

    assert_eq!(single_shard.num_docs(), four_shards.num_docs());
    assert_eq!(single_shard.num_terms(), four_shards.num_terms());

    for term_id in 0..2 {
        let collect = |index: &Index| {
            let postings = index.postings(term_id).unwrap();
            let mut cursor = postings.cursor();
            (0..postings.len())
                .map(|pos| {
                    cursor.move_to(pos);
                    (cursor.docid().unwrap(), cursor.freq().unwrap())
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(collect(&single_shard), collect(&four_shards));
    }
}
