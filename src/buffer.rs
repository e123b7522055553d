//! Structure-of-Arrays buffer for per-item lambdas and hessians.
//!
//! Lambdas (first derivatives) and hessians (second derivatives) live in
//! separate contiguous arrays rather than interleaved pairs:
//!
//! 1. **Histogram building downstream**: the tree learner consumes
//!    gradient-only and hessian-only slices, which touch one array each
//! 2. **Auto-vectorization**: contiguous f32 arrays are SIMD-friendly
//! 3. **Disjoint per-query writes**: both arrays split cleanly along query
//!    boundaries for parallel gradient computation

/// Structure-of-Arrays output buffer for one boosting iteration.
///
/// The ranking objective is the sole writer; index `i` of both arrays
/// corresponds to item `i` of the dataset.
///
/// # Example
///
/// ```
/// use rankboost::GradientBuffer;
///
/// let mut buffer = GradientBuffer::new(100);
/// assert_eq!(buffer.n_items(), 100);
/// assert_eq!(buffer.get(0), (0.0, 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct GradientBuffer {
    /// First derivatives (lambdas).
    lambdas: Vec<f32>,
    /// Second derivatives.
    hessians: Vec<f32>,
}

impl GradientBuffer {
    /// Create a buffer of `n_items` zeroed lambda/hessian slots.
    ///
    /// # Panics
    ///
    /// Panics if `n_items` is zero.
    pub fn new(n_items: usize) -> Self {
        assert!(n_items > 0, "n_items must be positive");
        Self {
            lambdas: vec![0.0; n_items],
            hessians: vec![0.0; n_items],
        }
    }

    /// Number of items in the buffer.
    #[inline]
    pub fn n_items(&self) -> usize {
        self.lambdas.len()
    }

    /// Zero both arrays.
    #[inline]
    pub fn reset(&mut self) {
        self.lambdas.fill(0.0);
        self.hessians.fill(0.0);
    }

    /// All lambdas.
    #[inline]
    pub fn lambdas(&self) -> &[f32] {
        &self.lambdas
    }

    /// All hessians.
    #[inline]
    pub fn hessians(&self) -> &[f32] {
        &self.hessians
    }

    /// Lambda and hessian for item `i`.
    #[inline]
    pub fn get(&self, i: usize) -> (f32, f32) {
        (self.lambdas[i], self.hessians[i])
    }

    /// Mutable views of both arrays, for splitting into per-query ranges.
    #[inline]
    pub fn as_mut_slices(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.lambdas, &mut self.hessians)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_zeroed() {
        let buffer = GradientBuffer::new(3);
        assert_eq!(buffer.lambdas(), &[0.0; 3]);
        assert_eq!(buffer.hessians(), &[0.0; 3]);
    }

    #[test]
    fn reset_clears_writes() {
        let mut buffer = GradientBuffer::new(2);
        {
            let (lambdas, hessians) = buffer.as_mut_slices();
            lambdas[1] = -0.5;
            hessians[1] = 0.25;
        }
        assert_eq!(buffer.get(1), (-0.5, 0.25));
        buffer.reset();
        assert_eq!(buffer.get(1), (0.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "n_items must be positive")]
    fn zero_items_panics() {
        GradientBuffer::new(0);
    }
}
