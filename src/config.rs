//! Configuration for ranking objectives.

use crate::error::{RankingError, Result};

/// Number of relevance grades covered by the default label-gain table.
const DEFAULT_LABEL_GRADES: usize = 31;

/// Configuration shared by all ranking objectives.
///
/// # Example
///
/// ```
/// use rankboost::RankingConfig;
///
/// let config = RankingConfig {
///     sigmoid: 2.0,
///     pair_samples: 50,
///     ..RankingConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct RankingConfig {
    /// Steepness of the sigmoid used by the pairwise loss. Must be > 0.
    pub sigmoid: f64,
    /// Normalize lambdas per query (LambdaMART-style gradient clipping).
    pub norm: bool,
    /// Gain assigned to each ordinal relevance label. Index = label value.
    pub label_gain: Vec<f64>,
    /// Rank depth used for max-DCG normalization (optimize NDCG@k).
    pub truncation_level: usize,
    /// Lower-label partners sampled per item. `0` disables sampling and
    /// always uses the exact pairwise computation.
    pub pair_samples: usize,
    /// Seed for the per-query pseudo-random streams.
    pub seed: u64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            sigmoid: 1.0,
            norm: true,
            label_gain: default_label_gain(),
            truncation_level: 30,
            pair_samples: 0,
            seed: 7,
        }
    }
}

impl RankingConfig {
    /// Check configuration invariants.
    ///
    /// A non-positive sigmoid or a zero truncation level is a fatal
    /// configuration error.
    pub fn validate(&self) -> Result<()> {
        if self.sigmoid <= 0.0 {
            return Err(RankingError::InvalidSigmoid(self.sigmoid));
        }
        if self.truncation_level == 0 {
            return Err(RankingError::InvalidTruncationLevel);
        }
        Ok(())
    }
}

/// Default gain table: `2^label - 1` for labels 0..31.
pub fn default_label_gain() -> Vec<f64> {
    (0..DEFAULT_LABEL_GRADES)
        .map(|i| (1u64 << i) as f64 - 1.0)
        .collect()
}
