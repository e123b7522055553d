//! Ranking dataset: labels, optional weights, and query grouping.
//!
//! A ranking dataset is a flat sequence of items partitioned into queries by
//! a boundary array. Query `q` occupies items
//! `[boundaries[q], boundaries[q + 1])`. Labels and weights are owned here
//! and are read-only to the gradient computation; per-item scores are owned
//! by the boosting loop and passed in per call.

use std::ops::Range;

use crate::error::{RankingError, Result};

/// Score value marking a padding slot in fixed-width score buffers.
///
/// An item carrying this score does not correspond to a real example and is
/// excluded from gradient accumulation, both on its own behalf and as a
/// pairing partner.
pub const SENTINEL_SCORE: f32 = f32::MIN;

/// Labels, optional per-item weights, and query boundaries.
///
/// Construction validates all grouping invariants: boundaries start at 0,
/// end at the item count, and are strictly increasing (an empty query is a
/// contract violation).
///
/// # Example
///
/// ```
/// use rankboost::RankingDataset;
///
/// // Two queries: items 0..3 and 3..5.
/// let dataset = RankingDataset::new(
///     vec![2.0, 1.0, 0.0, 1.0, 0.0],
///     None,
///     vec![0, 3, 5],
/// ).unwrap();
/// assert_eq!(dataset.n_queries(), 2);
/// assert_eq!(dataset.query_range(1), 3..5);
/// ```
#[derive(Debug, Clone)]
pub struct RankingDataset {
    /// Ordinal relevance grade per item.
    labels: Vec<f32>,
    /// Optional per-item weights, length = n_items when present.
    weights: Option<Vec<f32>>,
    /// Monotone offsets into the item array, length = n_queries + 1.
    query_boundaries: Vec<usize>,
}

impl RankingDataset {
    /// Create a dataset, validating the query grouping.
    pub fn new(
        labels: Vec<f32>,
        weights: Option<Vec<f32>>,
        query_boundaries: Vec<usize>,
    ) -> Result<Self> {
        let n_items = labels.len();
        if query_boundaries.len() < 2 {
            return Err(RankingError::MissingQueryBoundaries);
        }
        let first = query_boundaries[0];
        let last = query_boundaries[query_boundaries.len() - 1];
        if first != 0 || last != n_items {
            return Err(RankingError::BoundaryMismatch {
                n_items,
                first,
                last,
            });
        }
        for (q, pair) in query_boundaries.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(RankingError::EmptyQuery { query: q });
            }
        }
        if let Some(w) = &weights {
            if w.len() != n_items {
                return Err(RankingError::WeightLenMismatch {
                    items: n_items,
                    weights: w.len(),
                });
            }
        }
        Ok(Self {
            labels,
            weights,
            query_boundaries,
        })
    }

    /// Total number of items.
    #[inline]
    pub fn n_items(&self) -> usize {
        self.labels.len()
    }

    /// Number of queries.
    #[inline]
    pub fn n_queries(&self) -> usize {
        self.query_boundaries.len() - 1
    }

    /// All labels, flat across queries.
    #[inline]
    pub fn labels(&self) -> &[f32] {
        &self.labels
    }

    /// Per-item weights, if present.
    #[inline]
    pub fn weights(&self) -> Option<&[f32]> {
        self.weights.as_deref()
    }

    /// Query boundary offsets, length = n_queries + 1.
    #[inline]
    pub fn query_boundaries(&self) -> &[usize] {
        &self.query_boundaries
    }

    /// Item range of query `q`.
    #[inline]
    pub fn query_range(&self, q: usize) -> Range<usize> {
        self.query_boundaries[q]..self.query_boundaries[q + 1]
    }

    /// Size of the largest query.
    pub fn max_query_size(&self) -> usize {
        self.query_boundaries
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .max()
            .unwrap_or(0)
    }
}
