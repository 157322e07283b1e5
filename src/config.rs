use crate::error::{Result, StencilError};

/// Condition number above which a solved stencil is flagged as degraded.
///
/// Measured on the equilibrated system (offsets scaled into `[-1, 1]`), this
/// is crossed between 21 and 25 points.
pub const DEFAULT_CONDITION_THRESHOLD: f64 = 1e10;

/// Strategies for synthesizing samples that fall outside the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryMode {
    /// Pad with constant values (first/last data point)
    Constant,
    /// Reflect about the edge sample, not repeating it
    Mirror,
    /// Wrap around (periodic signal)
    Wrap,
    /// Pad with zeros
    Zero,
    /// Linear extrapolation from the two outermost samples
    Interp,
}

/// Configuration for building and applying a centered stencil.
#[derive(Debug, Clone, PartialEq)]
pub struct StencilConfig {
    /// Number of samples in the window (must be odd)
    pub window_size: usize,
    /// Order of the derivative to approximate (0 for interpolation)
    pub derivative_order: usize,
    /// Distance between neighbouring samples
    pub spacing: f64,
    /// Condition number beyond which results are reported as degraded
    pub condition_threshold: f64,
    /// Boundary handling strategy used when applying the stencil to a signal
    pub boundary_mode: BoundaryMode,
}

impl StencilConfig {
    /// Creates a new configuration with unit spacing, validating the window
    /// and derivative order.
    pub fn new(window_size: usize, derivative_order: usize) -> Result<Self> {
        validate_window(window_size, derivative_order)?;

        Ok(Self {
            window_size,
            derivative_order,
            spacing: 1.0,
            condition_threshold: DEFAULT_CONDITION_THRESHOLD,
            boundary_mode: BoundaryMode::Mirror,
        })
    }

    /// Sets the sample spacing
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Sets the condition threshold for the instability diagnostic
    pub fn with_condition_threshold(mut self, threshold: f64) -> Self {
        self.condition_threshold = threshold;
        self
    }

    /// Sets the boundary handling mode
    pub fn with_boundary_mode(mut self, mode: BoundaryMode) -> Self {
        self.boundary_mode = mode;
        self
    }

    /// Half the window width, i.e. the largest absolute offset.
    pub fn half_width(&self) -> usize {
        self.window_size / 2
    }

    /// Re-checks every field; the builder setters do not validate.
    pub fn validate(&self) -> Result<()> {
        validate_window(self.window_size, self.derivative_order)?;

        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(StencilError::InvalidSpacing(self.spacing));
        }
        if !self.condition_threshold.is_finite() || self.condition_threshold < 1.0 {
            return Err(StencilError::InvalidConditionThreshold(self.condition_threshold));
        }

        Ok(())
    }
}

pub(crate) fn validate_window(window_size: usize, derivative_order: usize) -> Result<()> {
    if window_size % 2 == 0 {
        return Err(StencilError::InvalidWindowSize(window_size));
    }
    if derivative_order >= window_size {
        return Err(StencilError::InvalidDerivativeOrder {
            order: derivative_order,
            window_size,
        });
    }
    Ok(())
}
