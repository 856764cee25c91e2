use cable_core::Sample;

/// Event emitted by the fixed-step driver for each sample.
///
/// Step 0 is the initial state before any integration.
/// Steps 1..N are emitted after each integration step.
#[derive(Debug, Clone)]
pub struct Event {
    /// The step number (0 for initial, 1..N for integration steps).
    pub step: usize,

    /// The mechanism's state at this step.
    pub sample: Sample,
}
