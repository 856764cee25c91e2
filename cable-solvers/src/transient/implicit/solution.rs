use cable_core::Sample;

/// Indicates how the driver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the end time.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The result of an adaptive implicit run.
#[derive(Debug, Clone)]
pub struct Solution {
    /// How the driver terminated.
    pub status: Status,

    /// History of samples from each accepted step (including the initial
    /// state).
    pub history: Vec<Sample>,

    /// Number of accepted steps.
    pub steps: usize,
}
