//! Candidate-pair subsampling for the pairwise objective.
//!
//! The pairwise loss is O(cnt^2) per query. For large queries the sampler
//! replaces each item's full set of lower-label partners with a bounded
//! uniform subset, and reports a reweighting factor per item so the sampled
//! pairwise sum stays an unbiased estimate of the exact sum in expectation.
//!
//! The eligible-candidate map is built once at initialization and is
//! immutable afterwards. Per-call state lives in [`PairScratch`], owned by
//! the worker and reused across queries to avoid reallocation.

use rand::Rng;

use crate::data::RankingDataset;

/// Per-worker scratch for sampled candidate lists.
///
/// Slots beyond the current query size may hold stale data from a previous
/// query; only indices `0..cnt` are valid after a [`CandidateSampler::sample`]
/// call that returned `true`.
#[derive(Debug, Default)]
pub struct PairScratch {
    /// Sampled partner positions per item, in-query coordinates.
    pairs: Vec<Vec<u32>>,
    /// Reweighting factor per item: eligible count over sampled count.
    factors: Vec<f64>,
}

impl PairScratch {
    /// Sampled partners of the item at in-query position `item`.
    #[inline]
    pub fn pairs(&self, item: usize) -> &[u32] {
        &self.pairs[item]
    }

    /// Reweighting factor of the item at in-query position `item`.
    #[inline]
    pub fn factor(&self, item: usize) -> f64 {
        self.factors[item]
    }

    fn ensure_len(&mut self, cnt: usize) {
        if self.pairs.len() < cnt {
            self.pairs.resize_with(cnt, Vec::new);
        }
        if self.factors.len() < cnt {
            self.factors.resize(cnt, 1.0);
        }
    }
}

/// Precomputed eligible lower-label candidates for every item.
///
/// For item `i`, the eligible candidates are the in-query positions `j`
/// with `label[j] < label[i]`. The map is stored flattened with per-item
/// boundary offsets, mirroring the query-boundary representation.
#[derive(Debug, Clone)]
pub struct CandidateSampler {
    /// Flattened candidate positions for all items.
    candidates: Vec<u32>,
    /// Per-item offsets into `candidates`, length = n_items + 1.
    boundaries: Vec<usize>,
    /// Subsampling target per item; 0 disables sampling.
    sample_cnt: usize,
}

impl CandidateSampler {
    /// Build the eligible-candidate map for a dataset.
    pub fn new(dataset: &RankingDataset, sample_cnt: usize) -> Self {
        let mut boundaries = Vec::with_capacity(dataset.n_items() + 1);
        boundaries.push(0);
        let mut candidates = Vec::new();
        for q in 0..dataset.n_queries() {
            let labels = &dataset.labels()[dataset.query_range(q)];
            for i in 0..labels.len() {
                for j in 0..labels.len() {
                    if i != j && labels[j] < labels[i] {
                        candidates.push(j as u32);
                    }
                }
                boundaries.push(candidates.len());
            }
        }
        Self {
            candidates,
            boundaries,
            sample_cnt,
        }
    }

    /// Number of eligible lower-label partners of the item at flat
    /// position `item`.
    #[inline]
    pub fn eligible_count(&self, item: usize) -> usize {
        self.boundaries[item + 1] - self.boundaries[item]
    }

    /// Draw per-item candidate subsets for the query at
    /// `offset..offset + cnt`.
    ///
    /// Returns `false` when sampling is disabled or the query is at or
    /// below the sampling target; the scratch is untouched and the exact
    /// pairwise path must be used. Otherwise fills `scratch` for items
    /// `0..cnt` and returns `true`.
    ///
    /// Items whose eligible count is at or below the target keep all of
    /// their candidates with factor 1; larger items get exactly
    /// `sample_cnt` distinct candidates drawn uniformly without
    /// replacement and factor `eligible / sample_cnt`.
    pub fn sample<R: Rng>(
        &self,
        offset: usize,
        cnt: usize,
        rng: &mut R,
        scratch: &mut PairScratch,
    ) -> bool {
        if self.sample_cnt == 0 || cnt <= self.sample_cnt {
            return false;
        }
        scratch.ensure_len(cnt);
        for i in 0..cnt {
            let start = self.boundaries[offset + i];
            let end = self.boundaries[offset + i + 1];
            let eligible = end - start;
            let out = &mut scratch.pairs[i];
            out.clear();
            if eligible <= self.sample_cnt {
                out.extend_from_slice(&self.candidates[start..end]);
                scratch.factors[i] = 1.0;
            } else {
                sample_positions(eligible, self.sample_cnt, rng, out);
                for pos in out.iter_mut() {
                    *pos = self.candidates[start + *pos as usize];
                }
                scratch.factors[i] = eligible as f64 / self.sample_cnt as f64;
            }
        }
        true
    }
}

/// Draw exactly `k` distinct positions from `0..n`, uniformly without
/// replacement, in increasing order (selection sampling).
///
/// Requires `k <= n`. Position `i` is kept with probability
/// `remaining / (n - i)`, which yields every k-subset with equal
/// probability and always terminates with exactly `k` draws.
fn sample_positions<R: Rng>(n: usize, k: usize, rng: &mut R, out: &mut Vec<u32>) {
    debug_assert!(k <= n);
    for i in 0..n {
        let remaining = k - out.len();
        if remaining == 0 {
            break;
        }
        let prob = remaining as f64 / (n - i) as f64;
        if rng.gen::<f64>() < prob {
            out.push(i as u32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn dataset(labels: &[f32], boundaries: &[usize]) -> RankingDataset {
        RankingDataset::new(labels.to_vec(), None, boundaries.to_vec()).unwrap()
    }

    #[test]
    fn candidate_map_is_per_query() {
        // Query 0: labels [2, 0, 1]; query 1: labels [1, 1].
        let ds = dataset(&[2.0, 0.0, 1.0, 1.0, 1.0], &[0, 3, 5]);
        let sampler = CandidateSampler::new(&ds, 2);

        // Item 0 (label 2) dominates positions 1 and 2.
        assert_eq!(sampler.eligible_count(0), 2);
        // Item 1 (label 0) dominates nothing.
        assert_eq!(sampler.eligible_count(1), 0);
        // Item 2 (label 1) dominates position 1 only.
        assert_eq!(sampler.eligible_count(2), 1);
        // Equal labels in query 1 produce no candidates.
        assert_eq!(sampler.eligible_count(3), 0);
        assert_eq!(sampler.eligible_count(4), 0);
    }

    #[test]
    fn small_queries_skip_sampling() {
        let ds = dataset(&[2.0, 0.0, 1.0], &[0, 3]);
        let sampler = CandidateSampler::new(&ds, 3);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut scratch = PairScratch::default();
        assert!(!sampler.sample(0, 3, &mut rng, &mut scratch));

        let disabled = CandidateSampler::new(&ds, 0);
        assert!(!disabled.sample(0, 3, &mut rng, &mut scratch));
    }

    #[test]
    fn sampled_items_get_exact_count_and_factor() {
        // One query of 6 items; item 0 (label 3) dominates the other 5.
        let ds = dataset(&[3.0, 0.0, 1.0, 0.0, 2.0, 1.0], &[0, 6]);
        let sampler = CandidateSampler::new(&ds, 2);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut scratch = PairScratch::default();
        assert!(sampler.sample(0, 6, &mut rng, &mut scratch));

        let pairs = scratch.pairs(0);
        assert_eq!(pairs.len(), 2);
        // Distinct positions, all with strictly lower labels.
        assert_ne!(pairs[0], pairs[1]);
        for &p in pairs {
            assert!(p != 0 && (p as usize) < 6);
        }
        assert_eq!(scratch.factor(0), 5.0 / 2.0);

        // Item 1 (label 0) has no candidates: kept in full, factor 1.
        assert!(scratch.pairs(1).is_empty());
        assert_eq!(scratch.factor(1), 1.0);

        // Item 4 (label 2) dominates 4 items (positions 1, 2, 3, 5): sampled.
        assert_eq!(scratch.pairs(4).len(), 2);
        assert_eq!(scratch.factor(4), 4.0 / 2.0);
    }

    #[test]
    fn selection_sampling_is_uniform_and_exact() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let mut counts = [0usize; 10];
        let draws = 20_000;
        let mut out = Vec::new();
        for _ in 0..draws {
            out.clear();
            sample_positions(10, 3, &mut rng, &mut out);
            assert_eq!(out.len(), 3);
            assert!(out.windows(2).all(|w| w[0] < w[1]));
            for &p in &out {
                counts[p as usize] += 1;
            }
        }
        // Each position is kept with probability 3/10.
        let expected = draws as f64 * 0.3;
        for &c in &counts {
            assert!((c as f64 - expected).abs() < expected * 0.1);
        }
    }

    #[test]
    fn scratch_reuse_across_query_sizes() {
        let ds = dataset(&[3.0, 0.0, 1.0, 0.0, 2.0, 1.0, 1.0, 0.0], &[0, 6, 8]);
        let sampler = CandidateSampler::new(&ds, 2);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut scratch = PairScratch::default();

        assert!(sampler.sample(0, 6, &mut rng, &mut scratch));
        // The second query is at the threshold: exact path, scratch stale
        // but unused.
        assert!(!sampler.sample(6, 2, &mut rng, &mut scratch));
        // Re-sampling the first query refreshes the used slots.
        assert!(sampler.sample(0, 6, &mut rng, &mut scratch));
        assert_eq!(scratch.pairs(0).len(), 2);
    }
}
