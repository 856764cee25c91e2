use serde::{Deserialize, Serialize};

use crate::mechanism::Mechanism;

/// A captured instant of a mechanism's dynamic state.
///
/// Solvers collect these into a run history; hosts may persist them for
/// checkpointing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Simulation time (ms).
    pub time: f64,

    /// Dynamic state values, in the mechanism's declared order.
    pub states: Vec<f64>,
}

impl Sample {
    /// Captures the current state of `mechanism` at `time`.
    pub fn capture<M: Mechanism + ?Sized>(mechanism: &M, time: f64) -> Self {
        Self {
            time,
            states: (0..mechanism.state_count())
                .map(|index| mechanism.state(index))
                .collect(),
        }
    }
}
