use thiserror::Error;

/// Rejected input at [`ProblemData`](crate::ProblemData) construction.
///
/// Input is never repaired silently: the caller must fix it and retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedInputError {
    #[error("Requirement '{category}' covers unknown lot '{lot}'")]
    UnknownLot { category: String, lot: String },
    #[error("Duplicate lot id: {0}")]
    DuplicateLot(String),
    #[error("Duplicate requirement category: {0}")]
    DuplicateCategory(String),
    #[error("Invalid value for {field}: {value} (must be finite and non-negative)")]
    InvalidNumber { field: String, value: f64 },
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),
}

/// Faults raised while solving or sweeping.
///
/// Infeasibility is not a fault; it is reported through the status of the
/// returned solution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error(transparent)]
    Malformed(#[from] MalformedInputError),
    #[error("Primal optimum {primal} and dual optimum {dual} differ by more than {tolerance}")]
    DualityMismatch { primal: f64, dual: f64, tolerance: f64 },
    #[error("Solver reported an unbounded {problem} problem")]
    UnexpectedUnbounded { problem: &'static str },
    #[error("Status mismatch: primal is {primal}, dual is {dual}")]
    StatusMismatch { primal: &'static str, dual: &'static str },
    #[error("Iteration limit of {0} reached")]
    IterationLimit(usize),
    #[error("Unknown lot: {0}")]
    UnknownLot(String),
    #[error("Invalid price range: {0}")]
    InvalidPriceRange(String),
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),
}
