//! Error types for ranking gradient computation.
//!
//! All failures surfaced by this crate are configuration or input-shape
//! errors detected at construction time. Steady-state gradient computation
//! is pure numeric code over already-validated inputs and cannot fail.

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, RankingError>;

/// Fatal configuration or input errors for ranking objectives.
///
/// Every variant is non-recoverable: training cannot proceed until the
/// offending configuration or dataset is fixed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankingError {
    #[error("sigmoid parameter {0} should be greater than zero")]
    InvalidSigmoid(f64),

    #[error("truncation level must be a positive rank depth")]
    InvalidTruncationLevel,

    #[error("ranking tasks require query boundary information")]
    MissingQueryBoundaries,

    #[error("query boundaries must start at 0 and end at {n_items}, got [{first}, {last}]")]
    BoundaryMismatch {
        n_items: usize,
        first: usize,
        last: usize,
    },

    #[error("query {query} is empty: boundaries must be strictly increasing")]
    EmptyQuery { query: usize },

    #[error("number of weights ({weights}) does not match number of items ({items})")]
    WeightLenMismatch { items: usize, weights: usize },

    #[error(
        "label {label} at item {index} must be a non-negative integer below {n_grades} \
         (the label-gain table size)"
    )]
    InvalidLabel {
        index: usize,
        label: f32,
        n_grades: usize,
    },
}
