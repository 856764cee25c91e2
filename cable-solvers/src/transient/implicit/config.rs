/// Configuration for the adaptive implicit driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// First step size attempted (ms).
    pub dt_init: f64,

    /// Smallest step size before the driver gives up (ms).
    pub dt_min: f64,

    /// Largest step size the driver will grow to (ms).
    pub dt_max: f64,

    /// Relative tolerance on each state's local error estimate.
    pub rel_tol: f64,

    /// Absolute tolerance on each state's local error estimate.
    pub abs_tol: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dt_init: 0.025,
            dt_min: 1e-9,
            dt_max: 10.0,
            rel_tol: 1e-6,
            abs_tol: 1e-9,
        }
    }
}

impl Config {
    /// Validates the step-size ladder and tolerances.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated requirement.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.dt_min.is_finite() || self.dt_min <= 0.0 {
            return Err("dt_min must be finite and positive");
        }
        if !self.dt_init.is_finite() || self.dt_init < self.dt_min {
            return Err("dt_init must be finite and at least dt_min");
        }
        if !self.dt_max.is_finite() || self.dt_max < self.dt_init {
            return Err("dt_max must be finite and at least dt_init");
        }
        if !self.rel_tol.is_finite() || self.rel_tol < 0.0 {
            return Err("rel_tol must be finite and non-negative");
        }
        if !self.abs_tol.is_finite() || self.abs_tol <= 0.0 {
            return Err("abs_tol must be finite and positive");
        }
        Ok(())
    }
}
