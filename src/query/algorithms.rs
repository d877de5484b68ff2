//! DAAT and TAAT top-k query algorithms: Ranked-OR/AND, WAND, MaxScore,
//! Block-Max WAND, Block-Max MaxScore, and two term-at-a-time accumulator
//! strategies (Simple, Lazy).
//!
//! All DAAT algorithms share the same shape: advance a frontier of cursors by
//! `next_geq`, score candidates, and feed a [`TopKHeap`]. The pruning
//! algorithms (WAND and its relatives) additionally use the cursors' upper
//! bounds to skip candidates that can't beat the current threshold without
//! ever scoring them.

use crate::cursor::{BlockMaxScoredCursor, MaxScoredCursor, ScoredCursor};
use crate::error::IndexResult;
use crate::query::heap::TopKHeap;

/// Ranked-OR: every cursor contributes; a document's score is the sum of all
/// matching terms' scores. No pruning — every candidate docid is scored.
pub fn ranked_or(cursors: &mut [ScoredCursor], k: usize) -> IndexResult<Vec<(u32, f32)>> {
    let mut heap = TopKHeap::new(k);
    loop {
        let current = cursors.iter_mut().filter_map(|c| c.docid()).min();
        let Some(docid) = current else { break };
        let mut total = 0.0f32;
        let mut any_finite = false;
        for cursor in cursors.iter_mut() {
            if cursor.docid() == Some(docid) {
                if let Some(s) = cursor.score()? {
                    total += s;
                    any_finite = true;
                }
                cursor.next_geq(docid + 1);
            }
        }
        if any_finite {
            heap.push(docid, total);
        }
    }
    Ok(heap.into_sorted_vec())
}

/// Ranked-AND: only documents present in every cursor are scored.
pub fn ranked_and(cursors: &mut [ScoredCursor], k: usize) -> IndexResult<Vec<(u32, f32)>> {
    let mut heap = TopKHeap::new(k);
    if cursors.is_empty() {
        return Ok(Vec::new());
    }
    'outer: loop {
        let Some(mut candidate) = cursors[0].docid() else { break };
        loop {
            let mut advanced = false;
            for cursor in cursors.iter_mut() {
                match cursor.next_geq(candidate) {
                    Some(d) if d == candidate => {}
                    Some(d) => {
                        candidate = d;
                        advanced = true;
                    }
                    None => break 'outer,
                }
            }
            if !advanced {
                break;
            }
        }
        let mut total = 0.0f32;
        for cursor in cursors.iter_mut() {
            if let Some(s) = cursor.score()? {
                total += s;
            }
        }
        heap.push(candidate, total);
        for cursor in cursors.iter_mut() {
            if cursor.next_geq(candidate + 1).is_none() {
                break 'outer;
            }
        }
    }
    Ok(heap.into_sorted_vec())
}

/// Broder's WAND: sort cursors by current docid, find the pivot term whose
/// cumulative max-score bound first reaches the heap threshold, and only then
/// fully evaluate a candidate at the pivot's docid.
pub fn wand(cursors: &mut [MaxScoredCursor], k: usize) -> IndexResult<Vec<(u32, f32)>> {
    let mut heap = TopKHeap::new(k);
    loop {
        let mut order: Vec<usize> = (0..cursors.len()).filter(|&i| cursors[i].inner.docid().is_some()).collect();
        if order.is_empty() {
            break;
        }
        order.sort_by_key(|&i| cursors[i].inner.docid().unwrap());

        let mut cumulative = 0.0f32;
        let mut pivot = None;
        for (rank, &i) in order.iter().enumerate() {
            cumulative += cursors[i].max_score;
            if cumulative > heap.threshold() {
                pivot = Some(rank);
                break;
            }
        }
        let Some(pivot_rank) = pivot else { break };
        let pivot_docid = cursors[order[pivot_rank]].inner.docid().unwrap();

        if order[0] == order[pivot_rank] && cursors[order[0]].inner.docid() == Some(pivot_docid) {
            // Every list already agrees on pivot_docid: evaluate it directly.
            let mut score = 0.0f32;
            for cursor in cursors.iter_mut() {
                if cursor.inner.docid() == Some(pivot_docid) {
                    if let Some(s) = cursor.inner.score()? {
                        score += s;
                    }
                }
            }
            heap.push(pivot_docid, score);
            for cursor in cursors.iter_mut() {
                cursor.inner.next_geq(pivot_docid + 1);
            }
            continue;
        }

        // Advance the lists before the pivot up to pivot_docid; if one of
        // them lands exactly on it, everyone aligns next round and we score.
        let mut aligned_docid = None;
        for &i in &order[..=pivot_rank] {
            if let Some(d) = cursors[i].inner.next_geq(pivot_docid) {
                if d == pivot_docid {
                    aligned_docid = Some(d);
                }
            }
        }
        if let Some(docid) = aligned_docid {
            let mut score = 0.0f32;
            for cursor in cursors.iter_mut() {
                if cursor.inner.docid() == Some(docid) {
                    if let Some(s) = cursor.inner.score()? {
                        score += s;
                    }
                }
            }
            heap.push(docid, score);
            for cursor in cursors.iter_mut() {
                cursor.inner.next_geq(docid + 1);
            }
        }
    }
    Ok(heap.into_sorted_vec())
}

/// MaxScore: partitions query terms into "essential" (can't be skipped
/// without risking a missed top-k candidate) and "non-essential" lists by
/// cumulative max-score, evaluating essential lists via Ranked-OR and only
/// probing non-essential lists when a candidate is still live.
pub fn maxscore(cursors: &mut [MaxScoredCursor], k: usize) -> IndexResult<Vec<(u32, f32)>> {
    let mut heap = TopKHeap::new(k);
    loop {
        let mut order: Vec<usize> = (0..cursors.len()).filter(|&i| cursors[i].inner.docid().is_some()).collect();
        if order.is_empty() {
            break;
        }
        // Non-essential = a prefix (sorted by ascending max_score) whose
        // cumulative bound still can't beat the threshold alone.
        order.sort_by(|&a, &b| cursors[a].max_score.partial_cmp(&cursors[b].max_score).unwrap());
        // A term is non-essential only while its inclusive prefix sum still
        // doesn't exceed the threshold; stop before folding in the term that
        // would push cumulative past it, or a document scoring only in that
        // term could be dropped without ever being enumerated.
        let mut cumulative = 0.0f32;
        let mut essential_start = 0;
        for &i in order.iter() {
            let candidate_cumulative = cumulative + cursors[i].max_score;
            if candidate_cumulative > heap.threshold() {
                break;
            }
            cumulative = candidate_cumulative;
            essential_start += 1;
        }
        let non_essential = &order[..essential_start];
        let essential = &order[essential_start..];
        if essential.is_empty() {
            break;
        }

        let docid = essential.iter().filter_map(|&i| cursors[i].inner.docid()).min().unwrap();
        let mut total = 0.0f32;
        for &i in essential {
            if cursors[i].inner.docid() == Some(docid) {
                if let Some(s) = cursors[i].inner.score()? {
                    total += s;
                }
            }
        }
        // Upper bound on what non-essential lists could still add.
        let remaining_bound: f32 = non_essential.iter().map(|&i| cursors[i].max_score).sum();
        if total + remaining_bound > heap.threshold() {
            for &i in non_essential {
                if cursors[i].inner.next_geq(docid) == Some(docid) {
                    if let Some(s) = cursors[i].inner.score()? {
                        total += s;
                    }
                }
            }
            heap.push(docid, total);
        }
        for &i in essential {
            cursors[i].inner.next_geq(docid + 1);
        }
    }
    Ok(heap.into_sorted_vec())
}

/// Block-Max WAND: like [`wand`], but once a pivot is found, its current
/// block-local bound (tighter than the whole-list bound) is checked against
/// the threshold first; only a block whose local bound still clears the bar
/// gets its documents scored.
pub fn block_max_wand(cursors: &mut [BlockMaxScoredCursor], k: usize) -> IndexResult<Vec<(u32, f32)>> {
    let mut heap = TopKHeap::new(k);
    loop {
        let mut order: Vec<usize> = (0..cursors.len()).filter(|&i| cursors[i].inner.docid().is_some()).collect();
        if order.is_empty() {
            break;
        }
        order.sort_by_key(|&i| cursors[i].inner.docid().unwrap());

        let mut cumulative = 0.0f32;
        let mut pivot = None;
        for (rank, &i) in order.iter().enumerate() {
            cumulative += cursors[i].max_score();
            if cumulative > heap.threshold() {
                pivot = Some(rank);
                break;
            }
        }
        let Some(pivot_rank) = pivot else { break };
        let pivot_docid = cursors[order[pivot_rank]].inner.docid().unwrap();

        let mut block_bound = 0.0f32;
        for &i in &order[..=pivot_rank] {
            block_bound += cursors[i].block_max_score(pivot_docid);
        }
        if block_bound <= heap.threshold() {
            // Skip past whichever block ends soonest among the pivot's prefix.
            let skip_to = order[..=pivot_rank]
                .iter()
                .map(|&i| cursors[i].block_boundary_docid())
                .min()
                .unwrap_or(pivot_docid)
                .saturating_add(1);
            for &i in &order[..=pivot_rank] {
                cursors[i].next_geq(skip_to);
            }
            continue;
        }

        let mut aligned_docid = None;
        for &i in &order[..=pivot_rank] {
            if let Some(d) = cursors[i].next_geq(pivot_docid) {
                if d == pivot_docid {
                    aligned_docid = Some(d);
                }
            }
        }
        if let Some(docid) = aligned_docid {
            let mut score = 0.0f32;
            for cursor in cursors.iter_mut() {
                if cursor.inner.docid() == Some(docid) {
                    if let Some(s) = cursor.inner.score()? {
                        score += s;
                    }
                }
            }
            heap.push(docid, score);
            for cursor in cursors.iter_mut() {
                cursor.next_geq(docid + 1);
            }
        }
    }
    Ok(heap.into_sorted_vec())
}

/// Block-Max MaxScore: [`maxscore`]'s essential/non-essential split, but the
/// non-essential cumulative bound uses each list's current block-local max
/// rather than its whole-list max, tightening the early-termination test.
pub fn block_max_maxscore(cursors: &mut [BlockMaxScoredCursor], k: usize) -> IndexResult<Vec<(u32, f32)>> {
    let mut heap = TopKHeap::new(k);
    loop {
        let mut order: Vec<usize> = (0..cursors.len()).filter(|&i| cursors[i].inner.docid().is_some()).collect();
        if order.is_empty() {
            break;
        }
        order.sort_by(|&a, &b| cursors[a].max_score().partial_cmp(&cursors[b].max_score()).unwrap());
        // See maxscore's identical split: only advance essential_start while
        // the inclusive cumulative bound still doesn't exceed the threshold.
        let mut cumulative = 0.0f32;
        let mut essential_start = 0;
        for &i in order.iter() {
            let candidate_cumulative = cumulative + cursors[i].max_score();
            if candidate_cumulative > heap.threshold() {
                break;
            }
            cumulative = candidate_cumulative;
            essential_start += 1;
        }
        let non_essential = &order[..essential_start];
        let essential = &order[essential_start..];
        if essential.is_empty() {
            break;
        }

        let docid = essential.iter().filter_map(|&i| cursors[i].inner.docid()).min().unwrap();
        let mut total = 0.0f32;
        for &i in essential {
            if cursors[i].inner.docid() == Some(docid) {
                if let Some(s) = cursors[i].inner.score()? {
                    total += s;
                }
            }
        }
        let remaining_bound: f32 = non_essential.iter().map(|&i| cursors[i].block_max_score(docid)).sum();
        if total + remaining_bound > heap.threshold() {
            for &i in non_essential {
                if cursors[i].next_geq(docid) == Some(docid) {
                    if let Some(s) = cursors[i].inner.score()? {
                        total += s;
                    }
                }
            }
            heap.push(docid, total);
        }
        for &i in essential {
            cursors[i].next_geq(docid + 1);
        }
    }
    Ok(heap.into_sorted_vec())
}

/// Simple term-at-a-time: a dense accumulator over every docid, one pass per
/// term. Straightforward but allocates `O(num_docs)`; only sensible for
/// small-to-medium collections or as the unconditional-correctness baseline
/// the DAAT algorithms are tested against.
pub fn ranked_or_taat_simple(cursors: &mut [ScoredCursor], num_docs: usize, k: usize) -> IndexResult<Vec<(u32, f32)>> {
    let mut accumulators = vec![0.0f32; num_docs];
    let mut touched = vec![false; num_docs];
    for cursor in cursors.iter_mut() {
        cursor.move_to_start();
        while let Some(docid) = cursor.docid() {
            if let Some(s) = cursor.score()? {
                accumulators[docid as usize] += s;
                touched[docid as usize] = true;
            }
            cursor.next_geq(docid + 1);
        }
    }
    let mut heap = TopKHeap::new(k);
    for (docid, (&score, &was_touched)) in accumulators.iter().zip(touched.iter()).enumerate() {
        if was_touched {
            heap.push(docid as u32, score);
        }
    }
    Ok(heap.into_sorted_vec())
}

const LAZY_BUCKETS: usize = 4;

/// Lazy term-at-a-time: terms are grouped into [`LAZY_BUCKETS`] buckets
/// ordered by ascending list length (shortest = most selective first).
/// Buckets are folded into the accumulator one at a time; after each bucket,
/// documents whose current partial score plus the remaining buckets' total
/// max-score bound can't beat the heap threshold are dropped from
/// consideration, so later buckets touch a shrinking candidate set instead of
/// every docid again.
pub fn ranked_or_taat_lazy(cursors: &mut [MaxScoredCursor], num_docs: usize, k: usize) -> IndexResult<Vec<(u32, f32)>> {
    let mut order: Vec<usize> = (0..cursors.len()).collect();
    order.sort_by_key(|&i| cursors[i].inner.len());
    let bucket_count = LAZY_BUCKETS.min(order.len().max(1));
    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); bucket_count];
    for (idx, i) in order.into_iter().enumerate() {
        buckets[idx % bucket_count].push(i);
    }

    let mut accumulators = vec![0.0f32; num_docs];
    let mut candidates: Vec<bool> = vec![true; num_docs];
    let mut remaining_bound: f32 = cursors.iter().map(|c| c.max_score).sum();

    for bucket in &buckets {
        let bucket_bound: f32 = bucket.iter().map(|&i| cursors[i].max_score).sum();
        for &i in bucket {
            let cursor = &mut cursors[i];
            cursor.inner.move_to_start();
            while let Some(docid) = cursor.inner.docid() {
                if candidates[docid as usize] {
                    if let Some(s) = cursor.inner.score()? {
                        accumulators[docid as usize] += s;
                    }
                }
                cursor.inner.next_geq(docid + 1);
            }
        }
        remaining_bound -= bucket_bound;
        let mut heap_threshold_probe = TopKHeap::new(k);
        for (docid, &score) in accumulators.iter().enumerate() {
            if candidates[docid] {
                heap_threshold_probe.push(docid as u32, score);
            }
        }
        let threshold = heap_threshold_probe.threshold();
        for (docid, candidate) in candidates.iter_mut().enumerate() {
            if *candidate && accumulators[docid] + remaining_bound <= threshold {
                *candidate = false;
            }
        }
    }

    let mut heap = TopKHeap::new(k);
    for (docid, (&score, &is_candidate)) in accumulators.iter().zip(candidates.iter()).enumerate() {
        if is_candidate || score != 0.0 {
            heap.push(docid as u32, score);
        }
    }
    Ok(heap.into_sorted_vec())
}

/// Ranked-OR restricted to the docid range `[lo, hi)`, for range-partitioned
/// queries over a collection split by, e.g., recency.
pub fn range_k(cursors: &mut [ScoredCursor], lo: u32, hi: u32, k: usize) -> IndexResult<Vec<(u32, f32)>> {
    let mut heap = TopKHeap::new(k);
    for cursor in cursors.iter_mut() {
        cursor.next_geq(lo);
    }
    loop {
        let current = cursors.iter_mut().filter_map(|c| c.docid()).filter(|&d| d < hi).min();
        let Some(docid) = current else { break };
        let mut total = 0.0f32;
        for cursor in cursors.iter_mut() {
            if cursor.docid() == Some(docid) {
                if let Some(s) = cursor.score()? {
                    total += s;
                }
                cursor.next_geq(docid + 1);
            }
        }
        heap.push(docid, total);
    }
    Ok(heap.into_sorted_vec())
}
