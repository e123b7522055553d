//! Listwise cross-entropy ranking loss (XE-NDCG).
//!
//! Treats a query's score vector as a softmax distribution compared against
//! a randomized relevance-derived target, following
//! [arxiv.org/abs/1911.09798]. The gamma draws are intentionally fresh each
//! boosting round, so the computation is stochastic per call but fully
//! determined by the per-query random stream.
//!
//! Cost is quadratic in query size with no subsampling relief: the listwise
//! coupling is global across the query.

use rand::Rng;

/// Sums of phi terms below this magnitude mark a degenerate query.
const DEGENERATE_EPS: f64 = 1e-15;

/// Listwise cross-entropy NDCG loss.
///
/// Stateless: all per-query state is drawn or derived inside the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct XeNdcgLoss;

impl XeNdcgLoss {
    /// Compute lambdas and hessians for one query.
    ///
    /// The output slices must arrive zeroed: a degenerate query (softmax
    /// target sum numerically negligible) is skipped and its outputs remain
    /// zero for this iteration.
    pub(crate) fn query_gradients<R: Rng>(
        &self,
        rng: &mut R,
        labels: &[f32],
        scores: &[f32],
        lambdas: &mut [f32],
        hessians: &mut [f32],
    ) {
        let gammas: Vec<f64> = (0..scores.len()).map(|_| rng.gen::<f64>()).collect();
        self.query_gradients_with_gammas(&gammas, labels, scores, lambdas, hessians);
    }

    /// Core computation with explicit gamma draws.
    fn query_gradients_with_gammas(
        &self,
        gammas: &[f64],
        labels: &[f32],
        scores: &[f32],
        lambdas: &mut [f32],
        hessians: &mut [f32],
    ) {
        let cnt = scores.len();

        // Turn scores into a probability distribution.
        let rho = softmax(scores);

        let sum_labels: f64 = labels
            .iter()
            .zip(gammas)
            .map(|(&label, &gamma)| phi(label, gamma))
            .sum();
        if sum_labels.abs() < DEGENERATE_EPS {
            return;
        }

        // Second-order Taylor approximation of the listwise cross-entropy
        // against the randomized target distribution.
        let l1: Vec<f64> = (0..cnt)
            .map(|i| -phi(labels[i], gammas[i]) / sum_labels + rho[i])
            .collect();

        let mut l2 = vec![0.0f64; cnt];
        for i in 0..cnt {
            for j in 0..cnt {
                if i != j {
                    l2[i] += l1[j] / (1.0 - rho[j]);
                }
            }
        }

        let mut l3 = vec![0.0f64; cnt];
        for i in 0..cnt {
            for j in 0..cnt {
                if i != j {
                    l3[i] += rho[j] * l2[j] / (1.0 - rho[j]);
                }
            }
        }

        for i in 0..cnt {
            lambdas[i] = (l1[i] + rho[i] * l2[i] + rho[i] * l3[i]) as f32;
            hessians[i] = (rho[i] * (1.0 - rho[i])) as f32;
        }
    }
}

/// Randomized target term: `2^label - gamma`.
#[inline]
fn phi(label: f32, gamma: f64) -> f64 {
    2.0f64.powi(label as i32) - gamma
}

/// Numerically stable softmax over a score slice.
fn softmax(scores: &[f32]) -> Vec<f64> {
    let max = scores
        .iter()
        .fold(f64::NEG_INFINITY, |acc, &s| acc.max(s as f64));
    let mut out: Vec<f64> = scores.iter().map(|&s| (s as f64 - max).exp()).collect();
    let sum: f64 = out.iter().sum();
    for v in &mut out {
        *v /= sum;
    }
    out
}
