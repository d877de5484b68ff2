//! Taily external threshold-estimator record format.
//!
//! This crate implements only the binary record layout the Taily threshold
//! estimator reads and writes — the header (`collection_size`, `term_count`)
//! followed by one fixed-size [`FeatureStatistics`] record per term. The
//! estimation algorithm itself is out of scope; some other process consumes
//! these files.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{IndexError, IndexResult};

/// Per-term statistics the Taily estimator needs: the first two moments of
/// the term's score distribution over the collection, and its raw frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStatistics {
    pub expected_value: f64,
    pub variance: f64,
    pub frequency: f64,
}

/// A full Taily statistics file: collection-wide counts plus one record per term.
#[derive(Debug, Clone)]
pub struct TailyStats {
    pub collection_size: i64,
    pub term_count: i64,
    pub records: Vec<FeatureStatistics>,
}

impl TailyStats {
    pub fn write<W: Write>(&self, mut w: W) -> IndexResult<()> {
        let path_err = |source: io::Error| IndexError::io("<taily stats>", source);
        w.write_i64::<LittleEndian>(self.collection_size).map_err(path_err)?;
        w.write_i64::<LittleEndian>(self.term_count).map_err(path_err)?;
        for record in &self.records {
            w.write_f64::<LittleEndian>(record.expected_value).map_err(path_err)?;
            w.write_f64::<LittleEndian>(record.variance).map_err(path_err)?;
            w.write_f64::<LittleEndian>(record.frequency).map_err(path_err)?;
        }
        Ok(())
    }

    pub fn read<R: Read>(mut r: R) -> IndexResult<Self> {
        let path_err = |source: io::Error| IndexError::io("<taily stats>", source);
        let collection_size = r.read_i64::<LittleEndian>().map_err(path_err)?;
        let term_count = r.read_i64::<LittleEndian>().map_err(path_err)?;
        if term_count < 0 {
            return Err(IndexError::invariant("taily term_count must be non-negative"));
        }
        let mut records = Vec::with_capacity(term_count as usize);
        for _ in 0..term_count {
            let expected_value = r.read_f64::<LittleEndian>().map_err(path_err)?;
            let variance = r.read_f64::<LittleEndian>().map_err(path_err)?;
            let frequency = r.read_f64::<LittleEndian>().map_err(path_err)?;
            records.push(FeatureStatistics { expected_value, variance, frequency });
        }
        Ok(Self { collection_size, term_count, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let stats = TailyStats {
            collection_size: 10_000,
            term_count: 2,
            records: vec![
                FeatureStatistics { expected_value: 1.5, variance: 0.25, frequency: 300.0 },
                FeatureStatistics { expected_value: 0.1, variance: 0.01, frequency: 5.0 },
            ],
        };
        let mut buf = Vec::new();
        stats.write(&mut buf).unwrap();
        let decoded = TailyStats::read(&buf[..]).unwrap();
        assert_eq!(decoded.collection_size, stats.collection_size);
        assert_eq!(decoded.term_count, stats.term_count);
        assert_eq!(decoded.records, stats.records);
    }

    #[test]
    fn rejects_negative_term_count() {
        let mut buf = Vec::new();
        buf.write_i64::<LittleEndian>(0).unwrap();
        buf.write_i64::<LittleEndian>(-1).unwrap();
        assert!(TailyStats::read(&buf[..]).is_err());
    }
}
