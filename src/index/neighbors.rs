//! Brute-force nearest-neighbor search over sparse row vectors

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::CaseRagError;
use crate::Result;

/// Sparse vector with strictly increasing `indices`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn max_index(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    /// Merge-join dot product; both sides must be sorted by index
    pub fn dot(&self, other: &Self) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Sort by index and reject malformed input
    fn canonicalize(self, row: usize) -> Result<Self> {
        if self.indices.len() != self.values.len() {
            return Err(CaseRagError::CorruptIndex(format!(
                "row {row}: {} indices but {} values",
                self.indices.len(),
                self.values.len()
            )));
        }
        if self.values.iter().any(|v| !v.is_finite()) {
            return Err(CaseRagError::CorruptIndex(format!(
                "row {row}: vector contains a non-finite value"
            )));
        }

        let mut pairs: Vec<(usize, f64)> = self.indices.into_iter().zip(self.values).collect();
        pairs.sort_by_key(|(index, _)| *index);
        if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(CaseRagError::CorruptIndex(format!(
                "row {row}: duplicate column in sparse vector"
            )));
        }
        let (indices, values) = pairs.into_iter().unzip();
        Ok(Self { indices, values })
    }
}

/// Distance used to rank rows; the score reported to callers is `1 - distance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// `1 - cos(q, r)`, in `[0, 2]`; `[0, 1]` for non-negative weights.
    /// A zero vector on either side is at distance 1 from everything.
    #[default]
    Cosine,
    /// `||q - r||`; up to `sqrt(2)` for unit non-negative vectors, so scores can go
    /// below zero.
    Euclidean,
}

impl DistanceMetric {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NeighborIndex {
    metric: DistanceMetric,
    vectors: Vec<SparseVector>,
    norms: Vec<f64>,
}

impl NeighborIndex {
    pub fn new(metric: DistanceMetric, vectors: Vec<SparseVector>) -> Result<Self> {
        let vectors = vectors
            .into_iter()
            .enumerate()
            .map(|(row, v)| v.canonicalize(row))
            .collect::<Result<Vec<_>>>()?;
        let norms = vectors.iter().map(SparseVector::norm).collect();
        Ok(Self {
            metric,
            vectors,
            norms,
        })
    }

    pub const fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }

    /// Largest column referenced by any stored vector
    pub fn max_column(&self) -> Option<usize> {
        self.vectors.iter().filter_map(SparseVector::max_index).max()
    }

    fn distance(&self, query: &SparseVector, query_norm: f64, row: usize) -> f64 {
        let vector = &self.vectors[row];
        let row_norm = self.norms[row];
        let dot = query.dot(vector);
        match self.metric {
            DistanceMetric::Cosine => {
                if query_norm == 0.0 || row_norm == 0.0 {
                    1.0
                } else {
                    1.0 - dot / (query_norm * row_norm)
                }
            }
            DistanceMetric::Euclidean => {
                // Rounding can push the expansion slightly below zero for identical vectors
                (query_norm * query_norm + row_norm * row_norm - 2.0 * dot)
                    .max(0.0)
                    .sqrt()
            }
        }
    }

    /// The `k` nearest rows as `(row, distance)`, nearest first.
    ///
    /// Equal distances keep row order, so results never depend on sort stability.
    pub fn kneighbors(&self, query: &SparseVector, k: usize) -> Vec<(usize, f64)> {
        let query_norm = query.norm();
        let mut scored: Vec<(usize, f64)> = (0..self.vectors.len())
            .map(|row| (row, self.distance(query, query_norm, row)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sv(pairs: &[(usize, f64)]) -> SparseVector {
        SparseVector {
            indices: pairs.iter().map(|p| p.0).collect(),
            values: pairs.iter().map(|p| p.1).collect(),
        }
    }

    #[test]
    fn test_dot_product_merges_on_index() {
        let a = sv(&[(0, 1.0), (2, 2.0), (5, 3.0)]);
        let b = sv(&[(2, 4.0), (3, 1.0), (5, 1.0)]);
        assert!((a.dot(&b) - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_unsorted_rows_are_canonicalized() {
        let index =
            NeighborIndex::new(DistanceMetric::Cosine, vec![sv(&[(3, 1.0), (1, 2.0)])]).unwrap();
        assert_eq!(index.vectors()[0].indices, vec![1, 3]);
        assert_eq!(index.vectors()[0].values, vec![2.0, 1.0]);
        assert_eq!(index.max_column(), Some(3));
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let bad = SparseVector {
            indices: vec![0, 1],
            values: vec![1.0],
        };
        assert!(matches!(
            NeighborIndex::new(DistanceMetric::Cosine, vec![bad]),
            Err(CaseRagError::CorruptIndex(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_columns() {
        let bad = sv(&[(1, 1.0), (1, 2.0)]);
        assert!(NeighborIndex::new(DistanceMetric::Cosine, vec![bad]).is_err());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let bad = sv(&[(1, f64::INFINITY)]);
        assert!(NeighborIndex::new(DistanceMetric::Euclidean, vec![bad]).is_err());
    }

    #[test]
    fn test_cosine_ordering() {
        let index = NeighborIndex::new(
            DistanceMetric::Cosine,
            vec![sv(&[(1, 1.0)]), sv(&[(0, 1.0)]), sv(&[(0, 1.0), (1, 1.0)])],
        )
        .unwrap();
        let hits = index.kneighbors(&sv(&[(0, 1.0)]), 3);
        let rows: Vec<usize> = hits.iter().map(|h| h.0).collect();
        assert_eq!(rows, vec![1, 2, 0]);
        assert!(hits[0].1.abs() < 1e-12);
        assert!((hits[2].1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ties_break_by_row_order() {
        let index = NeighborIndex::new(
            DistanceMetric::Cosine,
            vec![sv(&[(1, 1.0)]), sv(&[(0, 2.0)]), sv(&[(0, 1.0)]), sv(&[(0, 5.0)])],
        )
        .unwrap();
        let rows: Vec<usize> = index
            .kneighbors(&sv(&[(0, 1.0)]), 4)
            .into_iter()
            .map(|h| h.0)
            .collect();
        assert_eq!(rows, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_zero_query_is_equidistant() {
        let index = NeighborIndex::new(
            DistanceMetric::Cosine,
            vec![sv(&[(0, 1.0)]), sv(&[(1, 1.0)])],
        )
        .unwrap();
        let hits = index.kneighbors(&SparseVector::default(), 2);
        assert_eq!(hits, vec![(0, 1.0), (1, 1.0)]);
    }

    #[test]
    fn test_euclidean_distance_of_orthogonal_unit_vectors() {
        let index = NeighborIndex::new(DistanceMetric::Euclidean, vec![sv(&[(1, 1.0)])]).unwrap();
        let hits = index.kneighbors(&sv(&[(0, 1.0)]), 1);
        assert!((hits[0].1 - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_k_larger_than_corpus() {
        let index = NeighborIndex::new(DistanceMetric::Cosine, vec![sv(&[(0, 1.0)])]).unwrap();
        assert_eq!(index.kneighbors(&sv(&[(0, 1.0)]), 10).len(), 1);
    }
}
