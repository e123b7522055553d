//! Query-parallel ranking objective.
//!
//! [`RankingObjective`] owns the validated dataset and every cache built at
//! initialization (candidate map, sigmoid table, inverse max-DCG), then
//! computes gradients once per boosting iteration: the flat item array is
//! partitioned along query boundaries into disjoint output ranges and the
//! queries fan out across rayon workers, one task per query.
//!
//! Randomness is deterministic: there is no shared generator. Each query
//! derives its own stream from the global seed and the query index, so
//! results do not depend on worker scheduling and sequential and parallel
//! execution agree bit-for-bit.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

use crate::buffer::GradientBuffer;
use crate::config::RankingConfig;
use crate::data::RankingDataset;
use crate::dcg;
use crate::error::Result;
use crate::loss::{LambdaRankNdcg, RankingLoss, XeNdcgLoss};
use crate::parallel::Parallelism;
use crate::sampling::{CandidateSampler, PairScratch};

/// Below this many queries per worker the fan-out is not worth it.
const MIN_QUERIES_PER_WORKER: usize = 4;

/// One query's slice of work: disjoint output ranges, no synchronization
/// needed on writes.
struct QueryTask<'a> {
    query: usize,
    start: usize,
    lambdas: &'a mut [f32],
    hessians: &'a mut [f32],
}

/// Gradient/hessian engine for learning-to-rank objectives.
///
/// # Example
///
/// ```
/// use rankboost::{GradientBuffer, RankingConfig, RankingDataset, RankingObjective};
///
/// let dataset = RankingDataset::new(
///     vec![2.0, 1.0, 0.0],
///     None,
///     vec![0, 3],
/// ).unwrap();
/// let objective =
///     RankingObjective::lambdarank(&RankingConfig::default(), dataset).unwrap();
///
/// let mut buffer = GradientBuffer::new(3);
/// objective.get_gradients(&[0.5, 0.3, 0.1], &mut buffer);
/// assert!(buffer.lambdas().iter().any(|&l| l != 0.0));
/// ```
#[derive(Debug)]
pub struct RankingObjective {
    loss: RankingLoss,
    dataset: RankingDataset,
    /// Candidate-pair sampler, present only for the pairwise loss with a
    /// positive sampling target.
    sampler: Option<CandidateSampler>,
    seed: u64,
    parallelism: Parallelism,
}

impl RankingObjective {
    /// Build a pairwise LambdaRank/NDCG objective.
    ///
    /// Validates the configuration and the dataset labels, then builds all
    /// immutable caches. Fails on a non-positive sigmoid, a zero truncation
    /// level, or invalid labels.
    pub fn lambdarank(config: &RankingConfig, dataset: RankingDataset) -> Result<Self> {
        dcg::check_labels(dataset.labels(), config.label_gain.len())?;
        let loss = RankingLoss::LambdaRank(LambdaRankNdcg::new(config, &dataset)?);
        let sampler = (config.pair_samples > 0)
            .then(|| CandidateSampler::new(&dataset, config.pair_samples));
        Ok(Self {
            loss,
            dataset,
            sampler,
            seed: config.seed,
            parallelism: Parallelism::default(),
        })
    }

    /// Build a listwise cross-entropy (XE-NDCG) objective.
    ///
    /// The listwise loss has no sampling support and no sigmoid parameter;
    /// only the labels are validated.
    pub fn xendcg(config: &RankingConfig, dataset: RankingDataset) -> Result<Self> {
        dcg::check_labels(dataset.labels(), config.label_gain.len())?;
        Ok(Self {
            loss: RankingLoss::XeNdcg(XeNdcgLoss),
            dataset,
            sampler: None,
            seed: config.seed,
            parallelism: Parallelism::default(),
        })
    }

    /// Override the parallelism hint (defaults to rayon's pool size).
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Loss name, e.g. `"lambdarank"`.
    pub fn name(&self) -> &'static str {
        self.loss.name()
    }

    /// The validated dataset this objective was built for.
    pub fn dataset(&self) -> &RankingDataset {
        &self.dataset
    }

    /// Compute lambdas and hessians for the current scores.
    ///
    /// The buffer is zero-filled first, so queries skipped by the listwise
    /// loss for numerical degeneracy come out as exact zeros rather than
    /// stale values from the previous iteration.
    ///
    /// # Panics
    ///
    /// Panics if `scores` or `buffer` length does not match the dataset.
    pub fn get_gradients(&self, scores: &[f32], buffer: &mut GradientBuffer) {
        let n_items = self.dataset.n_items();
        assert_eq!(scores.len(), n_items, "score length must match item count");
        assert_eq!(
            buffer.n_items(),
            n_items,
            "buffer length must match item count"
        );
        buffer.reset();

        let n_queries = self.dataset.n_queries();
        let (mut lambdas_rest, mut hessians_rest) = buffer.as_mut_slices();
        let mut tasks = Vec::with_capacity(n_queries);
        for query in 0..n_queries {
            let range = self.dataset.query_range(query);
            let (lambdas, tail) = std::mem::take(&mut lambdas_rest).split_at_mut(range.len());
            lambdas_rest = tail;
            let (hessians, tail) = std::mem::take(&mut hessians_rest).split_at_mut(range.len());
            hessians_rest = tail;
            tasks.push(QueryTask {
                query,
                start: range.start,
                lambdas,
                hessians,
            });
        }

        match self
            .parallelism
            .correct_for_queries(n_queries, MIN_QUERIES_PER_WORKER)
        {
            Parallelism::Sequential => {
                let mut scratch = PairScratch::default();
                for task in tasks {
                    self.run_query(scores, task, &mut scratch);
                }
            }
            Parallelism::Parallel(_) => {
                tasks
                    .into_par_iter()
                    .for_each_init(PairScratch::default, |scratch, task| {
                        self.run_query(scores, task, scratch)
                    });
            }
        }
    }

    fn run_query(&self, scores: &[f32], task: QueryTask<'_>, scratch: &mut PairScratch) {
        let QueryTask {
            query,
            start,
            lambdas,
            hessians,
        } = task;
        let cnt = lambdas.len();
        let range = start..start + cnt;
        let query_scores = &scores[range.clone()];
        let query_labels = &self.dataset.labels()[range.clone()];

        let mut rng = self.query_rng(query);
        let sampled = match &self.sampler {
            Some(sampler) if sampler.sample(start, cnt, &mut rng, scratch) => Some(&*scratch),
            _ => None,
        };
        self.loss.query_gradients(
            query,
            &mut rng,
            query_labels,
            query_scores,
            sampled,
            lambdas,
            hessians,
        );

        if let Some(weights) = self.dataset.weights() {
            let query_weights = &weights[range];
            for i in 0..cnt {
                lambdas[i] *= query_weights[i];
                hessians[i] *= query_weights[i];
            }
        }
    }

    /// Distinct deterministic random stream per query, independent of
    /// which worker runs it.
    fn query_rng(&self, query: usize) -> Xoshiro256PlusPlus {
        let stream = (query as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Xoshiro256PlusPlus::seed_from_u64(self.seed ^ stream)
    }
}
