use crate::error::SolveError;

/// Pivot rule used by the simplex engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SolverBackend {
    /// Largest reduced cost enters. Switches to Bland's rule after a run of
    /// degenerate pivots.
    #[default]
    Dantzig,
    /// Lowest eligible index enters. Slower, never cycles.
    Bland,
}

/// Explicit solver settings passed to every solve and sweep call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig {
    /// Tolerance for every feasibility and equality comparison
    pub tolerance: f64,
    /// Pivot rule
    pub backend: SolverBackend,
    /// Maximum simplex iterations per phase
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            backend: SolverBackend::default(),
            max_iterations: 10_000,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn validate(&self) -> Result<(), SolveError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(SolveError::InvalidConfig(format!(
                "tolerance must be finite and positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(SolveError::InvalidConfig("max_iterations must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Absolute tolerance for comparing quantities of the given magnitude
    pub fn tolerance_for(&self, magnitude: f64) -> f64 {
        self.tolerance * magnitude.abs().max(1.0)
    }

    /// Pivot tolerance for the tableau, tighter than the reporting tolerance
    pub(crate) fn pivot_tolerance(&self) -> f64 {
        (self.tolerance * 1e-3).max(1e-12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.tolerance, 1e-6);
        assert_eq!(config.backend, SolverBackend::Dantzig);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        for tol in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = SolverConfig::new().with_tolerance(tol);
            assert!(matches!(config.validate(), Err(SolveError::InvalidConfig(_))), "tol = {}", tol);
        }
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let config = SolverConfig::new().with_max_iterations(0);
        assert!(config.validate().is_err());
    }
}
