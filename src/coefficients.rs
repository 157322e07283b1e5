use std::collections::hash_map::Entry;

use ahash::AHashMap;
use nalgebra::{DMatrix, DVector};

use crate::config::{validate_window, StencilConfig};
use crate::error::{Result, StencilError};
use crate::stencil::{Confidence, Stencil};

/// Relative residual above which a solve is reported as degraded even when
/// the condition number looks acceptable.
const RESIDUAL_TOLERANCE: f64 = 1e-8;

fn factorial(n: usize) -> f64 {
    (1..=n).fold(1.0, |acc, x| acc * x as f64)
}

/// `n! / scale^n`, accumulated term by term so neither factor overflows on
/// its own.
fn scaled_factorial(n: usize, scale: f64) -> f64 {
    (1..=n).fold(1.0, |acc, k| acc * k as f64 / scale)
}

/// Fills `matrix[(r, c)] = (offset(c) / scale)^r` for a centered window.
fn power_matrix(window_size: usize, scale: f64) -> DMatrix<f64> {
    let half_window = (window_size / 2) as isize;
    let mut matrix = DMatrix::<f64>::zeros(window_size, window_size);

    for col in 0..window_size {
        let x = (col as isize - half_window) as f64 / scale;
        for row in 0..window_size {
            // powi(0) is 1 for every x, including 0
            matrix[(row, col)] = x.powi(row as i32);
        }
    }

    matrix
}

/// Builds the Taylor matching matrix for a centered window of `window_size`
/// samples.
///
/// Entry `(row, col)` is `offset(col)^row` with `offset(col) = col - window_size / 2`,
/// so row `r` holds the coefficient of the `dx^r / r!` term in the Taylor
/// expansion of each sample about the center.
pub fn taylor_matrix(window_size: usize) -> Result<DMatrix<f64>> {
    validate_window(window_size, 0)?;
    Ok(power_matrix(window_size, 1.0))
}

/// Right-hand side selecting the `derivative_order`-th Taylor term:
/// zero everywhere except `n!` at index `n`.
pub fn taylor_rhs(window_size: usize, derivative_order: usize) -> Result<DVector<f64>> {
    validate_window(window_size, derivative_order)?;
    let mut rhs = DVector::<f64>::zeros(window_size);
    rhs[derivative_order] = factorial(derivative_order);
    Ok(rhs)
}

/// 2-norm condition number from the singular values. Infinite when the
/// smallest singular value underflows to zero.
fn condition_number(matrix: &DMatrix<f64>) -> f64 {
    let singular_values = matrix.singular_values();
    let max_sv = singular_values.iter().fold(0.0_f64, |max, &v| max.max(v));
    let min_sv = singular_values.iter().fold(f64::INFINITY, |min, &v| min.min(v));

    if min_sv <= 0.0 || !min_sv.is_finite() {
        return f64::INFINITY;
    }
    max_sv / min_sv
}

/// Solves the Taylor matching system described by `config` and returns the
/// stencil together with its conditioning diagnostics.
///
/// The system is solved with offsets divided by the half-width, which
/// scales row `r` by `m^-r` and `rhs[n]` by `m^-n`. The weights are the same
/// as for the unscaled system but the LU factorization sees a matrix whose
/// entries stay in `[-1, 1]`.
///
/// An ill-conditioned system is not an error: the weights are returned with
/// [`Confidence::Degraded`] and a warning is logged.
pub fn solve_stencil(config: &StencilConfig) -> Result<Stencil> {
    config.validate()?;

    let window_size = config.window_size;
    let derivative = config.derivative_order;
    let scale = config.half_width().max(1) as f64;

    let matrix = power_matrix(window_size, scale);
    let mut rhs = DVector::<f64>::zeros(window_size);
    rhs[derivative] = scaled_factorial(derivative, scale);

    let weights = matrix
        .clone()
        .lu()
        .solve(&rhs)
        .ok_or(StencilError::SingularSystem(window_size))?;

    if weights.iter().any(|w| !w.is_finite()) {
        return Err(StencilError::NonFiniteWeights(window_size));
    }

    let residual = (&matrix * &weights - &rhs).amax() / rhs.amax();
    let condition = condition_number(&matrix);

    let confidence = if condition > config.condition_threshold
        || !residual.is_finite()
        || residual > RESIDUAL_TOLERANCE
    {
        log::warn!(
            "ill-conditioned {}-point stencil for derivative {}: cond={:.3e} (threshold {:.3e}), residual={:.3e}",
            window_size,
            derivative,
            condition,
            config.condition_threshold,
            residual
        );
        Confidence::Degraded
    } else {
        Confidence::Nominal
    };

    log::debug!(
        "solved {}-point stencil for derivative {}: cond={:.3e}, residual={:.3e}",
        window_size,
        derivative,
        condition,
        residual
    );

    Ok(Stencil::from_solution(
        window_size,
        derivative,
        config.spacing,
        weights.iter().copied().collect(),
        condition,
        residual,
        confidence,
    ))
}

/// Computes centered finite-difference weights for unit sample spacing.
///
/// # Arguments
///
/// * `window_size` - Number of samples in the window (must be odd)
/// * `derivative_order` - Order of derivative to approximate (0 for interpolation, must be < window_size)
///
/// # Returns
///
/// `window_size` weights; weight `i` multiplies the sample at offset
/// `i - window_size / 2`.
///
/// # Example
///
/// ```rust
/// use central_stencil::compute_stencil;
///
/// let weights = compute_stencil(3, 2).unwrap();
/// assert!((weights[1] + 2.0).abs() < 1e-12);
/// ```
pub fn compute_stencil(window_size: usize, derivative_order: usize) -> Result<Vec<f64>> {
    let config = StencilConfig::new(window_size, derivative_order)?;
    Ok(solve_stencil(&config)?.into_weights())
}

/// Computes weights for sample spacing `spacing`, i.e. the unit-spacing
/// weights divided by `spacing^derivative_order`.
pub fn compute_stencil_with_spacing(
    window_size: usize,
    derivative_order: usize,
    spacing: f64,
) -> Result<Vec<f64>> {
    let config = StencilConfig::new(window_size, derivative_order)?.with_spacing(spacing);
    Ok(solve_stencil(&config)?.into_weights())
}

/// Memoizes unit-spacing stencils by `(window_size, derivative_order)`.
#[derive(Debug, Default)]
pub struct StencilCache {
    stencils: AHashMap<(usize, usize), Vec<f64>>,
}

impl StencilCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets weights from the cache or computes them if not cached
    pub fn get(&mut self, window_size: usize, derivative_order: usize) -> Result<&[f64]> {
        match self.stencils.entry((window_size, derivative_order)) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_slice()),
            Entry::Vacant(entry) => {
                let weights = compute_stencil(window_size, derivative_order)?;
                Ok(entry.insert(weights).as_slice())
            }
        }
    }

    /// Precomputes the classical low-order stencils
    pub fn precompute_common(&mut self) -> Result<()> {
        let common_configs = [
            (3, 1), // central first derivative
            (3, 2), // central second derivative
            (5, 0), // 5-point interpolation
            (5, 1), // 4th-order first derivative
            (5, 2), // 4th-order second derivative
            (7, 1),
            (7, 2),
        ];

        for (window_size, derivative) in common_configs {
            self.get(window_size, derivative)?;
        }

        Ok(())
    }

    /// Returns true if the stencil is already cached
    pub fn contains(&self, window_size: usize, derivative_order: usize) -> bool {
        self.stencils.contains_key(&(window_size, derivative_order))
    }

    /// Number of cached stencils
    pub fn len(&self) -> usize {
        self.stencils.len()
    }

    /// Returns true if nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.stencils.is_empty()
    }

    /// Drops every cached stencil
    pub fn clear(&mut self) {
        self.stencils.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_weights(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_three_point_stencils() {
        assert_weights(&compute_stencil(3, 2).unwrap(), &[1.0, -2.0, 1.0]);
        assert_weights(&compute_stencil(3, 1).unwrap(), &[-0.5, 0.0, 0.5]);
        assert_weights(&compute_stencil(3, 0).unwrap(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_single_point() {
        assert_weights(&compute_stencil(1, 0).unwrap(), &[1.0]);
    }

    #[test]
    fn test_five_point_stencils() {
        assert_weights(
            &compute_stencil(5, 1).unwrap(),
            &[1.0 / 12.0, -2.0 / 3.0, 0.0, 2.0 / 3.0, -1.0 / 12.0],
        );
        assert_weights(
            &compute_stencil(5, 2).unwrap(),
            &[-1.0 / 12.0, 4.0 / 3.0, -5.0 / 2.0, 4.0 / 3.0, -1.0 / 12.0],
        );
        assert_weights(&compute_stencil(5, 4).unwrap(), &[1.0, -4.0, 6.0, -4.0, 1.0]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(compute_stencil(4, 1), Err(StencilError::InvalidWindowSize(4))));
        assert!(matches!(compute_stencil(0, 0), Err(StencilError::InvalidWindowSize(0))));
        assert!(matches!(
            compute_stencil(5, 5),
            Err(StencilError::InvalidDerivativeOrder { order: 5, window_size: 5 })
        ));
        assert!(matches!(
            compute_stencil(1, 1),
            Err(StencilError::InvalidDerivativeOrder { .. })
        ));
    }

    #[test]
    fn test_taylor_matrix_entries() {
        let matrix = taylor_matrix(5).unwrap();
        assert_eq!(matrix.nrows(), 5);
        assert_eq!(matrix.ncols(), 5);
        // row 0 is all ones, including the 0^0 entry
        for col in 0..5 {
            assert_eq!(matrix[(0, col)], 1.0);
        }
        assert_eq!(matrix[(1, 0)], -2.0);
        assert_eq!(matrix[(3, 0)], -8.0);
        assert_eq!(matrix[(4, 4)], 16.0);
        assert_eq!(matrix[(2, 2)], 0.0);
        assert!(taylor_matrix(6).is_err());
    }

    #[test]
    fn test_taylor_rhs() {
        let rhs = taylor_rhs(7, 3).unwrap();
        assert_eq!(rhs.len(), 7);
        assert_eq!(rhs[3], 6.0);
        assert_eq!(rhs.iter().filter(|v| **v != 0.0).count(), 1);
        assert!(taylor_rhs(3, 3).is_err());
    }

    #[test]
    fn test_solution_satisfies_unscaled_system() {
        let window_size = 9;
        let derivative = 3;
        let weights = DVector::from_vec(compute_stencil(window_size, derivative).unwrap());
        let matrix = taylor_matrix(window_size).unwrap();
        let rhs = taylor_rhs(window_size, derivative).unwrap();
        let product = &matrix * &weights;
        for i in 0..window_size {
            let tolerance = 1e-9 * matrix.row(i).abs().sum();
            assert_abs_diff_eq!(product[i], rhs[i], epsilon = tolerance);
        }
    }

    #[test]
    fn test_spacing() {
        let unit = compute_stencil(5, 2).unwrap();
        let scaled = compute_stencil_with_spacing(5, 2, 0.1).unwrap();
        for (u, s) in unit.iter().zip(scaled.iter()) {
            assert_abs_diff_eq!(u / 0.01, s, epsilon = 1e-9);
        }
        assert!(matches!(
            compute_stencil_with_spacing(5, 2, 0.0),
            Err(StencilError::InvalidSpacing(_))
        ));
    }

    #[test]
    fn test_diagnostics_for_small_window() {
        let config = StencilConfig::new(5, 1).unwrap();
        let stencil = solve_stencil(&config).unwrap();
        assert!(stencil.is_well_conditioned());
        assert!(stencil.condition_number() >= 1.0);
        assert!(stencil.residual() < 1e-12);
    }

    #[test]
    fn test_low_threshold_flags_degraded() {
        let config = StencilConfig::new(3, 1).unwrap().with_condition_threshold(1.0);
        let stencil = solve_stencil(&config).unwrap();
        assert_eq!(stencil.confidence(), Confidence::Degraded);
        // weights are still returned
        assert_abs_diff_eq!(stencil.weights()[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_large_window_is_flagged() {
        let config = StencilConfig::new(41, 2).unwrap();
        let stencil = solve_stencil(&config).unwrap();
        assert!(!stencil.is_well_conditioned());
        assert_eq!(stencil.weights().len(), 41);
    }

    #[test]
    fn test_scaled_factorial_stays_finite() {
        assert_abs_diff_eq!(scaled_factorial(0, 3.0), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(scaled_factorial(4, 2.0), 1.5, epsilon = 1e-15);
        assert_abs_diff_eq!(
            scaled_factorial(6, 3.0),
            factorial(6) / 3.0_f64.powi(6),
            epsilon = 1e-15
        );

        // 81^162 overflows f64 while 162!/81^162 does not
        assert!(81.0_f64.powi(162).is_infinite());
        let value = scaled_factorial(162, 81.0);
        assert!(value.is_finite() && value > 0.0);
    }

    #[test]
    fn test_stencil_cache() {
        let mut cache = StencilCache::new();
        assert!(cache.is_empty());

        let first = cache.get(5, 2).unwrap().to_vec();
        let second = cache.get(5, 2).unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(first, compute_stencil(5, 2).unwrap());
        assert!(cache.contains(5, 2));
        assert_eq!(cache.len(), 1);

        assert!(cache.get(4, 2).is_err());
        assert_eq!(cache.len(), 1);

        cache.precompute_common().unwrap();
        assert_eq!(cache.len(), 7);
        cache.clear();
        assert!(cache.is_empty());
    }
}
