/// How much trust the solver places in a computed stencil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// Condition number within the configured threshold
    Nominal,
    /// System was ill-conditioned; weights may carry significant rounding error
    Degraded,
}

/// Weights of a centered finite-difference stencil together with the
/// diagnostics of the solve that produced them.
///
/// Weight `i` multiplies the sample at offset `i - window_size / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stencil {
    window_size: usize,
    derivative_order: usize,
    spacing: f64,
    unit_weights: Vec<f64>,
    weights: Vec<f64>,
    condition_number: f64,
    residual: f64,
    confidence: Confidence,
}

impl Stencil {
    pub(crate) fn from_solution(
        window_size: usize,
        derivative_order: usize,
        spacing: f64,
        unit_weights: Vec<f64>,
        condition_number: f64,
        residual: f64,
        confidence: Confidence,
    ) -> Self {
        let scale = spacing.powi(derivative_order as i32);
        let weights = unit_weights.iter().map(|w| w / scale).collect();
        Self {
            window_size,
            derivative_order,
            spacing,
            unit_weights,
            weights,
            condition_number,
            residual,
            confidence,
        }
    }

    /// Number of samples in the window
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Order of the approximated derivative
    pub fn derivative_order(&self) -> usize {
        self.derivative_order
    }

    /// Sample spacing the weights were scaled for
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Largest absolute offset
    pub fn half_width(&self) -> usize {
        self.window_size / 2
    }

    /// Weights in physical units, already divided by `spacing^n`.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Consumes the stencil, keeping only the physical-unit weights.
    pub fn into_weights(self) -> Vec<f64> {
        self.weights
    }

    /// Weights for unit spacing, as returned by the linear solve.
    pub fn unit_weights(&self) -> &[f64] {
        &self.unit_weights
    }

    /// Sample offsets `-(m)..=m` in units of the spacing.
    pub fn offsets(&self) -> Vec<isize> {
        let m = self.half_width() as isize;
        (-m..=m).collect()
    }

    /// Iterates over `(offset, weight)` pairs in offset order.
    pub fn iter(&self) -> impl Iterator<Item = (isize, f64)> + '_ {
        let m = self.half_width() as isize;
        self.weights
            .iter()
            .enumerate()
            .map(move |(i, &w)| (i as isize - m, w))
    }

    /// 2-norm condition number of the system that was solved.
    pub fn condition_number(&self) -> f64 {
        self.condition_number
    }

    /// Relative max-norm residual of the solve.
    pub fn residual(&self) -> f64 {
        self.residual
    }

    /// Diagnostic verdict of the solve
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// Returns true unless the solve was flagged as degraded
    pub fn is_well_conditioned(&self) -> bool {
        self.confidence == Confidence::Nominal
    }

    /// Order `p` of the leading truncation error `O(h^p)`.
    ///
    /// Returns `None` for interpolation, where the centered stencil is the
    /// unit impulse and therefore exact.
    pub fn accuracy_order(&self) -> Option<usize> {
        if self.derivative_order == 0 {
            return None;
        }
        let p = self.window_size - self.derivative_order;
        Some(if p % 2 == 0 { p } else { p + 1 })
    }

    /// Evaluates `sum_i w_i * f(offset_i)`.
    ///
    /// `f` receives the offset in sample units, so spacing is only applied
    /// through the weights.
    pub fn apply<F>(&self, f: F) -> f64
    where
        F: Fn(isize) -> f64,
    {
        self.iter().fold(0.0, |acc, (offset, w)| acc + w * f(offset))
    }

    /// Applies the stencil to `samples` centered on index `center`.
    ///
    /// Returns `None` when the window would reach outside the slice.
    pub fn apply_at(&self, samples: &[f64], center: usize) -> Option<f64> {
        let m = self.half_width();
        if center < m || center + m >= samples.len() {
            return None;
        }
        let window = &samples[center - m..=center + m];
        Some(
            window
                .iter()
                .zip(self.weights.iter())
                .map(|(s, w)| s * w)
                .sum(),
        )
    }
}
