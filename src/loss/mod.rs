//! Ranking loss functions.
//!
//! Two structurally different losses share the query-parallel dispatcher:
//!
//! - [`LambdaRankNdcg`]: pairwise LambdaRank optimizing NDCG, with a
//!   sigmoid lookup table and optional candidate-pair subsampling
//! - [`XeNdcgLoss`]: listwise cross-entropy against a randomized
//!   relevance-derived target
//!
//! The variant set is closed: [`RankingLoss`] is a tagged enum selected
//! once at objective construction, giving the per-query hot loop a single
//! static dispatch point instead of a virtual call.

mod lambdarank;
mod sigmoid;
mod xendcg;

pub use lambdarank::LambdaRankNdcg;
pub use sigmoid::SigmoidTable;
pub use xendcg::XeNdcgLoss;

use rand_xoshiro::Xoshiro256PlusPlus;

use crate::sampling::PairScratch;

/// Closed set of ranking losses.
#[derive(Debug, Clone)]
pub enum RankingLoss {
    /// Pairwise LambdaRank/NDCG.
    LambdaRank(LambdaRankNdcg),
    /// Listwise cross-entropy NDCG.
    XeNdcg(XeNdcgLoss),
}

impl RankingLoss {
    /// Loss name for logging and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LambdaRank(_) => "lambdarank",
            Self::XeNdcg(_) => "rank_xendcg",
        }
    }

    /// Dispatch one query's gradient computation.
    ///
    /// `sampled` is only meaningful for the pairwise loss; the listwise
    /// loss only consumes the random stream. Output slices must arrive
    /// zeroed.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn query_gradients(
        &self,
        query: usize,
        rng: &mut Xoshiro256PlusPlus,
        labels: &[f32],
        scores: &[f32],
        sampled: Option<&PairScratch>,
        lambdas: &mut [f32],
        hessians: &mut [f32],
    ) {
        match self {
            Self::LambdaRank(loss) => {
                loss.query_gradients(query, labels, scores, sampled, lambdas, hessians)
            }
            Self::XeNdcg(loss) => {
                loss.query_gradients(rng, labels, scores, lambdas, hessians)
            }
        }
    }
}
