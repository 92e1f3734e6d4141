//! Error types returned by the sampler and its configuration layer.

use thiserror::Error;

/// Errors raised while running a SAMC chain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamcError {
    /// The energy evaluator produced NaN for a point inside the domain.
    /// Iteration `0` refers to the initial point.
    #[error("energy evaluator returned NaN at iteration {iteration} for point {candidate:?}")]
    InvalidEnergyResult {
        /// Iteration in which the evaluation happened.
        iteration: usize,
        /// The offending point, converted to `f64`.
        candidate: Vec<f64>,
    },

    /// The configuration violates one of the sampler's structural invariants.
    #[error("degenerate configuration: {0}")]
    DegenerateConfiguration(#[from] ConfigError),
}

/// Reasons a [`SamcConfig`](crate::config::SamcConfig) is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("nv must be positive")]
    ZeroDimension,

    #[error("domain has {got} rows but nv = {expected}")]
    DomainRows { expected: usize, got: usize },

    #[error("domain matrix must have 2 columns, got {0}")]
    DomainColumns(usize),

    #[error("domain row {index} is invalid: low ({low}) must be less than high ({high})")]
    InvalidDomain { index: usize, low: f64, high: f64 },

    #[error("partition needs at least 2 breakpoints, got {0}")]
    TooFewBreakpoints(usize),

    #[error("partition breakpoints must be strictly increasing (violated at index {index})")]
    UnsortedPartition { index: usize },

    #[error("vecpi has length {got} but the partition defines {expected} bins")]
    VecpiLength { expected: usize, got: usize },

    #[error("vecpi entries must be positive and sum to 1 (sum = {sum})")]
    InvalidVecpi { sum: f64 },

    #[error("trange has {got} rows but the partition defines {expected} bins")]
    TrangeRows { expected: usize, got: usize },

    #[error("trange matrix must have 2 columns, got {0}")]
    TrangeColumns(usize),

    #[error("trange row {index} is invalid: low ({low}) exceeds high ({high})")]
    InvalidTrange { index: usize, low: f64, high: f64 },

    #[error("stepsize has {got} entries; expected 1 or nv = {expected}")]
    StepsizeLength { expected: usize, got: usize },

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("xi must lie in (0.5, 1], got {0}")]
    InvalidXi(f64),

    #[error("niter must be positive")]
    ZeroIterations,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SamcError>;

/// Lossy conversion used when attaching values to error variants.
pub(crate) fn as_f64<T: num_traits::Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}
