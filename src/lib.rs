//! # Central Stencil
//!
//! Weights for centered finite-difference stencils, derived by solving the
//! Taylor matching conditions over a symmetric window of equally spaced
//! samples.
//!
//! For a window of `nop` samples at offsets `-(nop-1)/2 ..= (nop-1)/2` and a
//! derivative order `n < nop`, the weights `w` solve
//!
//! ```text
//! sum_i w_i * offset_i^k = n!  if k == n
//!                        = 0   otherwise,   for k = 0 .. nop-1
//! ```
//!
//! so that `sum_i w_i f(x + offset_i h) / h^n` approximates `f^(n)(x)` with
//! the highest accuracy the window allows.
//!
//! ## Features
//!
//! - Direct LU solve of the Taylor system on an equilibrated matrix
//! - Condition-number diagnostics with a logged warning for wide windows
//! - Caching of frequently used stencils
//! - Differentiation of sampled signals with boundary handling
//! - CSV import of samples and export of stencil weights
//!
//! ## Example
//!
//! ```rust
//! use central_stencil::compute_stencil;
//!
//! let weights = compute_stencil(5, 1).expect("Invalid parameters");
//! // [1/12, -2/3, 0, 2/3, -1/12]
//! assert!((weights[3] - 2.0 / 3.0).abs() < 1e-12);
//! ```

mod coefficients;
mod config;
mod csv_utils;
mod differentiator;
mod error;
mod stencil;

pub use coefficients::{
    compute_stencil, compute_stencil_with_spacing, solve_stencil, taylor_matrix, taylor_rhs,
    StencilCache,
};
pub use config::{BoundaryMode, StencilConfig, DEFAULT_CONDITION_THRESHOLD};
pub use csv_utils::{
    read_column_by_index_from_reader, read_column_from_reader, read_csv_column,
    read_csv_column_by_index, write_stencil_csv,
};
pub use differentiator::Differentiator;
pub use error::{Result, StencilError};
pub use stencil::{Confidence, Stencil};

/// Differentiates uniformly sampled data with a centered stencil and
/// mirrored boundaries.
///
/// # Arguments
///
/// * `data` - The input signal data
/// * `window_size` - Number of samples in the stencil (must be odd)
/// * `derivative_order` - Order of the derivative (must be less than window_size)
/// * `spacing` - Distance between consecutive samples
///
/// # Example
///
/// ```rust
/// use central_stencil::differentiate;
///
/// let data: Vec<f64> = (0..10).map(|i| (i as f64 * 0.5).powi(2)).collect();
/// let slope = differentiate(&data, 3, 1, 0.5).unwrap();
/// assert!((slope[4] - 4.0).abs() < 1e-12);
/// ```
pub fn differentiate(
    data: &[f64],
    window_size: usize,
    derivative_order: usize,
    spacing: f64,
) -> Result<Vec<f64>> {
    Differentiator::new(window_size, derivative_order)?
        .with_spacing(spacing)?
        .apply(data)
}
