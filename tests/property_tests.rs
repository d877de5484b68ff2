//! Property-based tests for rank-wand's codecs and scoring.

use proptest::prelude::*;
use rank_wand::codec::block_codec::{decode_bp128, decode_interpolative, encode_bp128, encode_interpolative};
use rank_wand::codec::elias_fano::{EliasFano, END};
use rank_wand::codec::varbyte;
use rank_wand::config::{BlockSize, Config};
use rank_wand::query::heap::TopKHeap;
use rank_wand::wand::{build_term_blocks, compress_term_blocks, ScoredBlockInput, TermBlocks};

fn strictly_increasing(mut values: Vec<u64>) -> Vec<u64> {
    values.sort_unstable();
    values.dedup();
    values
}

proptest! {
    #[test]
    fn elias_fano_round_trip(raw in prop::collection::vec(0u64..1_000_000, 0..500)) {
        let values = strictly_increasing(raw);
        let universe = values.last().map(|&v| v + 1).unwrap_or(1);
        let ef = EliasFano::build(&values, universe);
        let decoded: Vec<u64> = (0..ef.len()).map(|i| ef.value_at(i)).collect();
        prop_assert_eq!(decoded, values);
    }

    #[test]
    fn elias_fano_next_geq_finds_smallest_at_least(
        raw in prop::collection::vec(0u64..1_000, 1..200),
        probe in 0u64..1_200,
    ) {
        let values = strictly_increasing(raw);
        let universe = values.last().map(|&v| v + 1).unwrap_or(1);
        let ef = EliasFano::build(&values, universe);
        let mut cursor = ef.cursor();
        let got = cursor.next_geq(probe);
        let expected = values.iter().copied().find(|&v| v >= probe).unwrap_or(END);
        prop_assert_eq!(got, expected);
        // idempotent: probing again with the same value doesn't move further
        prop_assert_eq!(cursor.next_geq(probe), got);
    }

    #[test]
    fn varbyte_round_trip(values in prop::collection::vec(0u64..(1u64 << 50), 0..300)) {
        let words = varbyte::encode(&values);
        let decoded = varbyte::decode(&words, values.len());
        prop_assert_eq!(decoded, values);
    }

    #[test]
    fn bp128_round_trip(values in prop::collection::vec(0u32..u32::MAX, 1..=128)) {
        let words = encode_bp128(&values);
        let decoded = decode_bp128(&words, values.len());
        prop_assert_eq!(decoded, values);
    }

    #[test]
    fn interpolative_round_trip(raw in prop::collection::vec(0u32..2000, 1..64)) {
        let mut values = raw;
        values.sort_unstable();
        values.dedup();
        prop_assume!(!values.is_empty());
        let lo = 0u32;
        let hi = values.last().copied().unwrap() + 1;
        let words = encode_interpolative(&values, lo, hi);
        let decoded = decode_interpolative(&words, values.len(), lo, hi);
        prop_assert_eq!(decoded, values);
    }

    #[test]
    fn compressed_wand_never_underestimates(
        raw_scores in prop::collection::vec(0.0f32..500.0, 8..300),
    ) {
        // Every block-max score must reconstruct to a value in
        // [true_score, true_score + max_term_weight/R) after compression.
        let docids: Vec<u32> = (0..raw_scores.len() as u32).collect();
        let config = Config { threshold_wand_list: 1, block_size: BlockSize::Fixed { size: 64 }, reference_size: 16, ..Config::default() };
        let blocks = build_term_blocks(ScoredBlockInput { docids: &docids, scores: &raw_scores }, &config);
        let TermBlocks::Raw(raw) = &blocks else { panic!("expected Raw blocks above threshold") };
        let compressed = compress_term_blocks(raw, &config);
        let max_term_weight = raw.block_max_score.iter().copied().fold(0.0f32, f32::max);
        let step = max_term_weight / config.reference_size as f32;
        for (i, &true_score) in raw.block_max_score.iter().enumerate() {
            let got = compressed.block_max_score(i);
            prop_assert!(got + 1e-4 >= true_score, "reconstructed {} underestimates true {}", got, true_score);
            prop_assert!(got < true_score + step + 1e-4, "reconstructed {} exceeds bound for true {}", got, true_score);
        }
    }

    #[test]
    fn top_k_heap_never_exceeds_capacity(
        entries in prop::collection::vec((0u32..10_000, -1000.0f32..1000.0), 0..500),
        k in 1usize..20,
    ) {
        let mut heap = TopKHeap::new(k);
        for (docid, score) in &entries {
            heap.push(*docid, *score);
        }
        let sorted = heap.into_sorted_vec();
        prop_assert!(sorted.len() <= k);
        for window in sorted.windows(2) {
            prop_assert!(window[0].1 >= window[1].1);
        }
    }
}
