//! Pairwise LambdaRank loss optimizing NDCG.
//!
//! For every mis-ordered pair of items with differing relevance, the loss
//! produces a gradient proportional to the NDCG change that swapping the
//! pair's ranks would cause, pushed through a sigmoid of the score gap.
//! Pair arithmetic runs in f64; outputs are stored as f32.

use std::cmp::Ordering;

use crate::config::RankingConfig;
use crate::data::{RankingDataset, SENTINEL_SCORE};
use crate::dcg::DcgCalculator;
use crate::error::Result;
use crate::sampling::PairScratch;

use super::sigmoid::SigmoidTable;

/// Pairwise LambdaRank/NDCG loss with per-query caches.
#[derive(Debug, Clone)]
pub struct LambdaRankNdcg {
    /// Sigmoid steepness, validated > 0.
    sigma: f64,
    /// Whether to normalize lambdas per query.
    norm: bool,
    /// One inverse max-DCG scalar per query; 0 for all-zero-gain queries.
    inverse_max_dcgs: Vec<f64>,
    /// Shared read-only sigmoid lookup.
    sigmoid: SigmoidTable,
    /// Gain and discount tables.
    dcg: DcgCalculator,
}

impl LambdaRankNdcg {
    /// Validate the configuration and build all per-query caches.
    pub fn new(config: &RankingConfig, dataset: &RankingDataset) -> Result<Self> {
        config.validate()?;
        let dcg = DcgCalculator::new(config.label_gain.clone(), dataset.max_query_size());
        let inverse_max_dcgs = (0..dataset.n_queries())
            .map(|q| {
                let labels = &dataset.labels()[dataset.query_range(q)];
                let max_dcg = dcg.max_dcg_at_k(config.truncation_level, labels);
                if max_dcg > 0.0 {
                    1.0 / max_dcg
                } else {
                    0.0
                }
            })
            .collect();
        Ok(Self {
            sigma: config.sigmoid,
            norm: config.norm,
            inverse_max_dcgs,
            sigmoid: SigmoidTable::new(config.sigmoid),
            dcg,
        })
    }

    /// Compute lambdas and hessians for one query.
    ///
    /// `labels`, `scores`, `lambdas` and `hessians` are the query's slices;
    /// the output slices must arrive zeroed. When `sampled` is present it
    /// holds the per-item candidate subsets and reweighting factors drawn
    /// for this query.
    pub(crate) fn query_gradients(
        &self,
        query: usize,
        labels: &[f32],
        scores: &[f32],
        sampled: Option<&PairScratch>,
        lambdas: &mut [f32],
        hessians: &mut [f32],
    ) {
        let cnt = scores.len();
        let inverse_max_dcg = self.inverse_max_dcgs[query];

        // Rank positions by descending score. The sort is stable, so tied
        // scores keep their original relative order.
        let mut sorted_idx: Vec<usize> = (0..cnt).collect();
        sorted_idx.sort_by(|&a, &b| {
            scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal)
        });

        // Sampled candidates are stored as original in-query positions;
        // discounts need their current rank.
        let mut rank_of = Vec::new();
        if sampled.is_some() {
            rank_of = vec![0usize; cnt];
            for (rank, &pos) in sorted_idx.iter().enumerate() {
                rank_of[pos] = rank;
            }
        }

        let best_score = scores[sorted_idx[0]];
        let mut worst_rank = cnt - 1;
        if worst_rank > 0 && scores[sorted_idx[worst_rank]] == SENTINEL_SCORE {
            worst_rank -= 1;
        }
        let worst_score = scores[sorted_idx[worst_rank]];

        let mut sum_lambdas = 0.0f64;
        for rank_hi in 0..cnt {
            let high = sorted_idx[rank_hi];
            if scores[high] == SENTINEL_SCORE {
                continue;
            }
            let high_label = labels[high];
            let high_score = scores[high] as f64;
            let high_gain = self.dcg.gain(high_label);
            let high_discount = self.dcg.discount(rank_hi);
            let factor = sampled.map_or(1.0, |s| s.factor(high));

            let mut high_sum_lambda = 0.0f64;
            let mut high_sum_hessian = 0.0f64;

            let mut accumulate_pair = |rank_lo: usize| {
                let low = sorted_idx[rank_lo];
                let low_label = labels[low];
                // Only pairs where the high item is strictly more relevant
                // contribute; sentinel partners never do.
                if high_label <= low_label || scores[low] == SENTINEL_SCORE {
                    return;
                }
                let delta_score = high_score - scores[low] as f64;

                let dcg_gap = high_gain - self.dcg.gain(low_label);
                let paired_discount = (high_discount - self.dcg.discount(rank_lo)).abs();
                let mut delta_ndcg = dcg_gap * paired_discount * inverse_max_dcg;
                // Regularize by score distance: once scores already agree
                // with label order, keep gradients from running away.
                if self.norm && high_label != low_label && best_score != worst_score {
                    delta_ndcg /= 0.01 + delta_score.abs();
                }

                let sig = self.sigmoid.get(delta_score);
                let p_lambda = -self.sigma * sig * delta_ndcg * factor;
                let p_hessian = self.sigma * self.sigma * sig * (1.0 - sig) * delta_ndcg * factor;

                high_sum_lambda += p_lambda;
                high_sum_hessian += p_hessian;
                lambdas[low] -= p_lambda as f32;
                hessians[low] += p_hessian as f32;
                // p_lambda is negative; accumulate the magnitude.
                sum_lambdas -= 2.0 * p_lambda;
            };

            match sampled {
                Some(scratch) => {
                    for &pos in scratch.pairs(high) {
                        accumulate_pair(rank_of[pos as usize]);
                    }
                }
                None => {
                    for rank_lo in 0..cnt {
                        if rank_lo != rank_hi {
                            accumulate_pair(rank_lo);
                        }
                    }
                }
            }

            lambdas[high] += high_sum_lambda as f32;
            hessians[high] += high_sum_hessian as f32;
        }

        if self.norm && sum_lambdas > 0.0 {
            let norm_factor = ((1.0 + sum_lambdas).log2() / sum_lambdas) as f32;
            for i in 0..cnt {
                lambdas[i] *= norm_factor;
                hessians[i] *= norm_factor;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn loss(labels: &[f32], norm: bool) -> (LambdaRankNdcg, RankingDataset) {
        let dataset =
            RankingDataset::new(labels.to_vec(), None, vec![0, labels.len()]).unwrap();
        let config = RankingConfig {
            norm,
            ..RankingConfig::default()
        };
        let loss = LambdaRankNdcg::new(&config, &dataset).unwrap();
        (loss, dataset)
    }

    fn run(loss: &LambdaRankNdcg, labels: &[f32], scores: &[f32]) -> (Vec<f32>, Vec<f32>) {
        let mut lambdas = vec![0.0; labels.len()];
        let mut hessians = vec![0.0; labels.len()];
        loss.query_gradients(0, labels, scores, None, &mut lambdas, &mut hessians);
        (lambdas, hessians)
    }

    #[test]
    fn equal_labels_produce_zero_gradients() {
        let labels = [1.0f32, 1.0, 1.0, 1.0];
        let (loss, _) = loss(&labels, true);
        let (lambdas, hessians) = run(&loss, &labels, &[0.9, -0.3, 0.1, 2.0]);
        assert_eq!(lambdas, vec![0.0; 4]);
        assert_eq!(hessians, vec![0.0; 4]);
    }

    #[test]
    fn lambdas_are_antisymmetric_without_normalization() {
        let labels = [2.0f32, 1.0, 0.0, 1.0];
        let (loss, _) = loss(&labels, false);
        let (lambdas, hessians) = run(&loss, &labels, &[0.1, 0.7, -0.2, 0.4]);
        // Each pair contributes +p to the high item and -p to the low item.
        let sum: f32 = lambdas.iter().sum();
        assert_abs_diff_eq!(sum, 0.0, epsilon = 1e-6);
        // Hessians accumulate positively on both sides.
        assert!(hessians.iter().all(|&h| h >= 0.0));
        assert!(hessians.iter().any(|&h| h > 0.0));
    }

    #[test]
    fn highest_label_item_gets_negative_lambda() {
        let labels = [2.0f32, 1.0, 0.0];
        let (loss, _) = loss(&labels, false);
        let (lambdas, _) = run(&loss, &labels, &[0.5, 0.3, 0.1]);
        // The top-label item is only ever the high side of a pair, and
        // pairwise lambdas on the high side are negative.
        assert!(lambdas[0] < 0.0);
        // The zero-label item is only ever the low side.
        assert!(lambdas[2] > 0.0);
    }

    #[test]
    fn sentinel_items_are_excluded() {
        let labels = [2.0f32, 1.0, 0.0];
        let (loss, _) = loss(&labels, true);
        let (expect_l, expect_h) = run(&loss, &labels, &[0.5, 0.3, 0.1]);

        let padded_labels = [2.0f32, 1.0, 0.0, 0.0];
        let (padded_loss, _) = self::loss(&padded_labels, true);
        let (got_l, got_h) = run(
            &padded_loss,
            &padded_labels,
            &[0.5, 0.3, 0.1, SENTINEL_SCORE],
        );

        // The padding item contributes nothing and receives nothing; the
        // real items are unaffected by its presence.
        assert_eq!(got_l[3], 0.0);
        assert_eq!(got_h[3], 0.0);
        for i in 0..3 {
            assert_abs_diff_eq!(got_l[i], expect_l[i], epsilon = 1e-6);
            assert_abs_diff_eq!(got_h[i], expect_h[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn zero_max_dcg_query_contributes_nothing() {
        // All labels zero: max DCG is zero and stays zero, and no pair has
        // differing labels anyway.
        let labels = [0.0f32, 0.0];
        let (loss, _) = loss(&labels, true);
        assert_eq!(loss.inverse_max_dcgs[0], 0.0);
        let (lambdas, hessians) = run(&loss, &labels, &[1.0, -1.0]);
        assert_eq!(lambdas, vec![0.0; 2]);
        assert_eq!(hessians, vec![0.0; 2]);
    }

    #[test]
    fn rejects_invalid_sigmoid() {
        let dataset = RankingDataset::new(vec![1.0, 0.0], None, vec![0, 2]).unwrap();
        let config = RankingConfig {
            sigmoid: -2.0,
            ..RankingConfig::default()
        };
        assert!(LambdaRankNdcg::new(&config, &dataset).is_err());
    }
}
