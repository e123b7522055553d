//! rankboost: learning-to-rank gradient engine for gradient boosted trees.
//!
//! For each boosting iteration, given the current per-item scores, this
//! crate produces a first derivative ("lambda") and second derivative
//! ("hessian") per training item, which an external tree learner then fits
//! against. Two ranking losses are provided:
//!
//! - **LambdaRank/NDCG** (pairwise): gradients weighted by the NDCG change
//!   of swapping each mis-ordered pair, with a sigmoid lookup table and
//!   optional candidate-pair subsampling to bound the O(n^2) pairwise cost
//! - **XE-NDCG** (listwise): a softmax-based cross-entropy loss against a
//!   randomized relevance-derived target
//!
//! Queries are processed in parallel across a rayon worker pool with
//! per-worker scratch state and deterministic per-query random streams.
//!
//! # Example
//!
//! ```
//! use rankboost::{GradientBuffer, RankingConfig, RankingDataset, RankingObjective};
//!
//! // One query of three items with graded relevance labels.
//! let dataset = RankingDataset::new(vec![2.0, 1.0, 0.0], None, vec![0, 3]).unwrap();
//! let objective =
//!     RankingObjective::lambdarank(&RankingConfig::default(), dataset).unwrap();
//!
//! let mut buffer = GradientBuffer::new(3);
//! objective.get_gradients(&[0.5, 0.3, 0.1], &mut buffer);
//! ```

pub mod buffer;
pub mod config;
pub mod data;
pub mod dcg;
pub mod error;
pub mod loss;
pub mod objective;
pub mod parallel;
pub mod sampling;

pub use buffer::GradientBuffer;
pub use config::RankingConfig;
pub use data::{RankingDataset, SENTINEL_SCORE};
pub use dcg::DcgCalculator;
pub use error::{RankingError, Result};
pub use loss::{LambdaRankNdcg, RankingLoss, SigmoidTable, XeNdcgLoss};
pub use objective::RankingObjective;
pub use parallel::Parallelism;
pub use sampling::{CandidateSampler, PairScratch};
