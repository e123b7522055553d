//! Discounted cumulative gain helpers.
//!
//! DCG rewards correctly ordered high-relevance items near the top of a
//! ranking, discounted by rank position:
//!
//! ```text
//! DCG@k = sum_{i < k} gain(label_i) / log2(2 + i)
//! ```
//!
//! The gain and discount tables are built once in an explicit init phase
//! and shared read-only across workers; there is no lazy global state.

use crate::error::{RankingError, Result};

/// Validate that every label is an ordinal grade covered by a gain table
/// of `n_grades` entries.
///
/// Labels must be non-negative, integer-valued, and below `n_grades`.
/// Violations are fatal configuration errors.
pub fn check_labels(labels: &[f32], n_grades: usize) -> Result<()> {
    for (index, &label) in labels.iter().enumerate() {
        if label < 0.0 || label.fract() != 0.0 || (label as usize) >= n_grades {
            return Err(RankingError::InvalidLabel {
                index,
                label,
                n_grades,
            });
        }
    }
    Ok(())
}

/// Precomputed gain and discount tables for DCG computation.
#[derive(Debug, Clone)]
pub struct DcgCalculator {
    /// Gain per ordinal label, index = label value.
    label_gain: Vec<f64>,
    /// Discount per rank position, `1 / log2(2 + rank)`.
    discounts: Vec<f64>,
}

impl DcgCalculator {
    /// Build tables covering ranks `0..max_position`.
    pub fn new(label_gain: Vec<f64>, max_position: usize) -> Self {
        let discounts = (0..max_position)
            .map(|rank| 1.0 / (2.0 + rank as f64).log2())
            .collect();
        Self {
            label_gain,
            discounts,
        }
    }

    /// Number of relevance grades covered by the gain table.
    #[inline]
    pub fn n_grades(&self) -> usize {
        self.label_gain.len()
    }

    /// Discount factor for a rank position.
    #[inline]
    pub fn discount(&self, rank: usize) -> f64 {
        self.discounts[rank]
    }

    /// Gain value for a relevance label. Labels must have been validated
    /// with [`check_labels`] against this table.
    #[inline]
    pub fn gain(&self, label: f32) -> f64 {
        self.label_gain[label as usize]
    }

    /// Maximum achievable DCG at depth `k` for a query's labels.
    ///
    /// This is the DCG of the ideal ordering (labels sorted descending),
    /// truncated to the top `k` positions.
    pub fn max_dcg_at_k(&self, k: usize, labels: &[f32]) -> f64 {
        let mut sorted: Vec<f32> = labels.to_vec();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        sorted
            .iter()
            .take(k)
            .enumerate()
            .map(|(rank, &label)| self.gain(label) * self.discount(rank))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_label_gain;
    use approx::assert_relative_eq;

    #[test]
    fn discount_formula() {
        let dcg = DcgCalculator::new(default_label_gain(), 10);
        assert_relative_eq!(dcg.discount(0), 1.0);
        assert_relative_eq!(dcg.discount(2), 0.5);
        assert_relative_eq!(dcg.discount(6), 1.0 / 3.0);
    }

    #[test]
    fn max_dcg_sorts_labels() {
        let dcg = DcgCalculator::new(default_label_gain(), 10);
        // Ideal order for [0, 2, 1] is [2, 1, 0]:
        // 3/log2(2) + 1/log2(3) + 0/log2(4)
        let expected = 3.0 + 1.0 / 3.0f64.log2();
        assert_relative_eq!(dcg.max_dcg_at_k(3, &[0.0, 2.0, 1.0]), expected);
        // Order of the input must not matter.
        assert_relative_eq!(dcg.max_dcg_at_k(3, &[2.0, 1.0, 0.0]), expected);
    }

    #[test]
    fn max_dcg_truncates() {
        let dcg = DcgCalculator::new(default_label_gain(), 10);
        // Depth 1 keeps only the best label.
        assert_relative_eq!(dcg.max_dcg_at_k(1, &[0.0, 2.0, 1.0]), 3.0);
    }

    #[test]
    fn all_zero_labels_have_zero_max_dcg() {
        let dcg = DcgCalculator::new(default_label_gain(), 10);
        assert_eq!(dcg.max_dcg_at_k(3, &[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn label_validation() {
        assert!(check_labels(&[0.0, 1.0, 2.0], 31).is_ok());
        assert!(matches!(
            check_labels(&[0.0, -1.0], 31),
            Err(RankingError::InvalidLabel { index: 1, .. })
        ));
        assert!(matches!(
            check_labels(&[0.5], 31),
            Err(RankingError::InvalidLabel { index: 0, .. })
        ));
        assert!(matches!(
            check_labels(&[31.0], 31),
            Err(RankingError::InvalidLabel { index: 0, .. })
        ));
    }
}
