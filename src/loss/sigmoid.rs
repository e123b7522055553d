//! Precomputed lookup table for the logistic function.
//!
//! The pairwise loss evaluates a sigmoid once per candidate pair, which is
//! the hottest operation in the whole gradient computation. The table
//! replaces the transcendental call with an index into `2^20` precomputed
//! bins over a symmetric input domain derived from the steepness parameter.

/// Number of bins in the table.
const SIGMOID_BINS: usize = 1 << 20;

/// Numerator of the domain half-width before dividing by the steepness.
const SIGMOID_BOUND: f64 = 50.0;

/// Lookup table approximating `1 / (1 + exp(sigma * x))`.
///
/// Built once during objective initialization and shared read-only across
/// all workers. Inputs outside the domain saturate to the boundary bins.
#[derive(Debug, Clone)]
pub struct SigmoidTable {
    table: Vec<f64>,
    min_input: f64,
    max_input: f64,
    /// Converts an input offset from `min_input` into a bin index.
    idx_factor: f64,
}

impl SigmoidTable {
    /// Build the table for steepness `sigma`.
    ///
    /// The domain is `[-50 / (2 * sigma), +50 / (2 * sigma)]`; `sigma` must
    /// be validated as strictly positive by the caller.
    pub fn new(sigma: f64) -> Self {
        let min_input = -SIGMOID_BOUND / sigma / 2.0;
        let max_input = -min_input;
        let idx_factor = SIGMOID_BINS as f64 / (max_input - min_input);
        let table = (0..SIGMOID_BINS)
            .map(|i| {
                let x = i as f64 / idx_factor + min_input;
                1.0 / (1.0 + (x * sigma).exp())
            })
            .collect();
        Self {
            table,
            min_input,
            max_input,
            idx_factor,
        }
    }

    /// Approximate `1 / (1 + exp(sigma * x))`, saturating outside the
    /// table domain.
    #[inline]
    pub fn get(&self, x: f64) -> f64 {
        if x <= self.min_input {
            self.table[0]
        } else if x >= self.max_input {
            self.table[SIGMOID_BINS - 1]
        } else {
            let idx = ((x - self.min_input) * self.idx_factor) as usize;
            self.table[idx.min(SIGMOID_BINS - 1)]
        }
    }
}
