use thiserror::Error;

/// Error types for stencil construction and application
#[derive(Debug, Error)]
pub enum StencilError {
    /// Window size must be odd and at least 1
    #[error("Invalid window size: {0}. Window size must be odd and at least 1")]
    InvalidWindowSize(usize),
    /// Derivative order must be less than window size
    #[error("Invalid derivative order: {order}. Must be less than window size ({window_size})")]
    InvalidDerivativeOrder { order: usize, window_size: usize },
    /// Sample spacing must be finite and strictly positive
    #[error("Invalid sample spacing: {0}. Spacing must be finite and positive")]
    InvalidSpacing(f64),
    /// Condition threshold must be finite and at least 1
    #[error("Invalid condition threshold: {0}. Threshold must be finite and at least 1")]
    InvalidConditionThreshold(f64),
    /// Input data is too short for the specified window size
    #[error("Insufficient data: {0} points. Need at least {1} points for window size {1}")]
    InsufficientData(usize, usize),
    /// LU factorization hit an exactly zero pivot
    #[error("Taylor system for window size {0} is numerically singular")]
    SingularSystem(usize),
    /// The solve completed but produced NaN or infinite weights
    #[error("Solve for window size {0} produced non-finite weights")]
    NonFiniteWeights(usize),
    /// Requested CSV column does not exist in the header
    #[error("Column not found: {0}")]
    MissingColumn(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for stencil operations
pub type Result<T> = std::result::Result<T, StencilError>;
