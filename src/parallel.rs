//! Parallelism hint for the query dispatcher.
//!
//! The dispatcher fans queries out across a rayon worker pool, one task per
//! query. The hint can be corrected downward: for a handful of queries the
//! fan-out overhead dominates and sequential execution wins.

/// Parallelism strategy for gradient computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// Strictly sequential execution (no task spawning).
    Sequential,
    /// Parallel execution with up to `n` rayon workers.
    ///
    /// `Parallel(n)` with `n <= 1` behaves like `Sequential`.
    Parallel(usize),
}

impl Default for Parallelism {
    fn default() -> Self {
        Self::Parallel(rayon::current_num_threads())
    }
}

impl Parallelism {
    /// Create a hint from a thread count.
    ///
    /// - `0` uses rayon's current thread count
    /// - `1` is sequential
    /// - `n > 1` is parallel with n workers
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        match n_threads {
            0 => Self::Parallel(rayon::current_num_threads()),
            1 => Self::Sequential,
            n => Self::Parallel(n),
        }
    }

    /// Returns `true` if parallel execution is allowed.
    #[inline]
    pub fn allows_parallel(self) -> bool {
        matches!(self, Self::Parallel(n) if n > 1)
    }

    /// Downgrade to sequential when the query count is too small for the
    /// worker pool to pay off.
    #[inline]
    pub fn correct_for_queries(self, n_queries: usize, min_queries_per_worker: usize) -> Self {
        match self {
            Self::Sequential => Self::Sequential,
            Self::Parallel(n) => {
                let workers = n
                    .min(n_queries / min_queries_per_worker.max(1))
                    .max(1);
                if workers <= 1 {
                    Self::Sequential
                } else {
                    Self::Parallel(workers)
                }
            }
        }
    }
}
