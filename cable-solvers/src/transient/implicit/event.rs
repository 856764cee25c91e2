use cable_core::Sample;

/// Event emitted by the implicit driver for each accepted step.
///
/// Step 0 is the initial state before any integration.
#[derive(Debug, Clone)]
pub struct Event {
    /// The step number (0 for initial, 1.. for accepted steps).
    pub step: usize,

    /// Size of the accepted step (ms); zero for the initial event.
    pub dt: f64,

    /// The mechanism's state after this step.
    pub sample: Sample,
}
