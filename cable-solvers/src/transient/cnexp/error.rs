use thiserror::Error;

/// Errors that can occur in the fixed-step driver.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    #[error("step size must be finite and positive, got {dt} ms")]
    InvalidStep { dt: f64 },
}
