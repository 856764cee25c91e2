use thiserror::Error;

/// Errors that can occur in the implicit driver.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error("step size underflow at t = {time} ms (next dt = {dt} ms)")]
    StepUnderflow { time: f64, dt: f64 },
}
