use crate::coefficients::solve_stencil;
use crate::config::{BoundaryMode, StencilConfig};
use crate::error::{Result, StencilError};
use crate::stencil::Stencil;

/// Applies a centered stencil to a uniformly sampled signal.
///
/// Interior points use the stencil directly. Near the edges the missing
/// samples are synthesized according to the configured [`BoundaryMode`];
/// the stencil itself is always centered.
#[derive(Debug, Clone)]
pub struct Differentiator {
    config: StencilConfig,
    stencil: Stencil,
}

impl Differentiator {
    /// Creates a differentiator with unit spacing and mirrored boundaries.
    ///
    /// # Example
    ///
    /// ```rust
    /// use central_stencil::Differentiator;
    ///
    /// let diff = Differentiator::new(5, 1).expect("Valid parameters");
    /// let slope = diff.apply(&[0.0, 2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
    /// assert!((slope[2] - 2.0).abs() < 1e-12);
    /// ```
    pub fn new(window_size: usize, derivative_order: usize) -> Result<Self> {
        Self::with_config(StencilConfig::new(window_size, derivative_order)?)
    }

    /// Creates a differentiator from a full configuration, solving its stencil.
    pub fn with_config(config: StencilConfig) -> Result<Self> {
        let stencil = solve_stencil(&config)?;
        Ok(Self { config, stencil })
    }

    /// Sets the sample spacing, rescaling the stencil weights.
    pub fn with_spacing(self, spacing: f64) -> Result<Self> {
        Self::with_config(self.config.with_spacing(spacing))
    }

    /// Sets the boundary handling mode
    pub fn with_boundary_mode(mut self, mode: BoundaryMode) -> Self {
        self.config.boundary_mode = mode;
        self
    }

    pub fn config(&self) -> &StencilConfig {
        &self.config
    }

    pub fn stencil(&self) -> &Stencil {
        &self.stencil
    }

    /// Returns the derivative (or interpolated value for order 0) at every
    /// sample of `data`.
    pub fn apply(&self, data: &[f64]) -> Result<Vec<f64>> {
        let window_size = self.config.window_size;
        if data.len() < window_size {
            return Err(StencilError::InsufficientData(data.len(), window_size));
        }

        let n = data.len();
        let half_window = self.config.half_width();
        let mut result = vec![0.0; n];

        for (center, out) in result.iter_mut().enumerate() {
            *out = match self.stencil.apply_at(data, center) {
                Some(value) => value,
                None => self.edge_value(data, center, half_window),
            };
        }

        Ok(result)
    }

    fn edge_value(&self, data: &[f64], center: usize, half_window: usize) -> f64 {
        let n = data.len() as isize;
        self.stencil
            .weights()
            .iter()
            .enumerate()
            .map(|(j, &w)| {
                let idx = center as isize + j as isize - half_window as isize;
                let value = if idx >= 0 && idx < n {
                    data[idx as usize]
                } else {
                    self.boundary_value(data, idx)
                };
                w * value
            })
            .sum()
    }

    /// Synthesizes the sample at an out-of-range index
    fn boundary_value(&self, data: &[f64], requested_idx: isize) -> f64 {
        let n = data.len();

        match self.config.boundary_mode {
            BoundaryMode::Constant => {
                if requested_idx < 0 {
                    data[0]
                } else {
                    data[n - 1]
                }
            }
            BoundaryMode::Mirror => {
                if requested_idx < 0 {
                    let abs_idx = requested_idx.unsigned_abs();
                    data[abs_idx.min(n - 1)]
                } else {
                    let overflow = requested_idx as usize - (n - 1);
                    data[(n - 1).saturating_sub(overflow)]
                }
            }
            BoundaryMode::Wrap => data[requested_idx.rem_euclid(n as isize) as usize],
            BoundaryMode::Zero => 0.0,
            BoundaryMode::Interp => {
                if n < 2 {
                    return data[0];
                }
                if requested_idx < 0 {
                    let left_slope = data[1] - data[0];
                    data[0] + left_slope * requested_idx as f64
                } else {
                    let right_slope = data[n - 1] - data[n - 2];
                    let dist = (requested_idx - (n as isize - 1)) as f64;
                    data[n - 1] + right_slope * dist
                }
            }
        }
    }
}
