//! Fixed-step driver for mechanisms with their own update method.
//!
//! Per step, the driver evaluates the stimulus at the step's start time,
//! then calls the mechanism's `advance`, which pulls its inputs from the
//! bus, applies its update over `dt`, and pushes any owned concentration
//! back out:
//!
//! ```text
//! for each step:
//!     voltage = stimulus(t, bus)
//!     mechanism.advance(Context { voltage, bus }, dt)
//! ```
//!
//! Inputs are held fixed across a step, which is exactly the contract a
//! closed-form exponential update needs.
//!
//! # Example
//!
//! ```ignore
//! use cable_solvers::transient::cnexp;
//!
//! let solution = cnexp::solve_unobserved(&mut pool, &mut bus, |_, _| -65.0, 0.01, 1000)?;
//!
//! for sample in &solution.history {
//!     println!("t={} ms: {:?}", sample.time, sample.states);
//! }
//! ```

mod action;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use cable_core::{Context, IonBus, Mechanism, Observer, Sample};

/// Drives a mechanism through `steps` fixed steps of size `dt` (ms).
///
/// The driver does not call `init`; initialization is an explicit host
/// step, so a run can continue from whatever state the mechanism holds.
///
/// # Observer
///
/// The observer receives an [`Event`] per sample, starting with step 0
/// (the state before any integration), and may return
/// [`Action::StopEarly`] to terminate the run.
///
/// # Errors
///
/// Returns [`Error::InvalidStep`] if `dt` is not finite and positive.
pub fn solve<M, S, Obs>(
    mechanism: &mut M,
    bus: &mut IonBus,
    mut stimulus: S,
    dt: f64,
    steps: usize,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    M: Mechanism + ?Sized,
    S: FnMut(f64, &mut IonBus) -> f64,
    Obs: Observer<Event, Action>,
{
    if !dt.is_finite() || dt <= 0.0 {
        return Err(Error::InvalidStep { dt });
    }

    let mut history = Vec::with_capacity(steps + 1);
    history.push(Sample::capture(mechanism, 0.0));

    let event = Event {
        step: 0,
        sample: history[0].clone(),
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(Solution {
            status: Status::StoppedByObserver,
            history,
            steps: 0,
        });
    }

    for step in 1..=steps {
        let start = (step - 1) as f64 * dt;
        let voltage = stimulus(start, &mut *bus);
        mechanism.advance(
            Context {
                voltage,
                bus: &mut *bus,
            },
            dt,
        );

        let sample = Sample::capture(mechanism, step as f64 * dt);
        history.push(sample.clone());

        let event = Event { step, sample };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution {
                status: Status::StoppedByObserver,
                history,
                steps: step,
            });
        }
    }

    Ok(Solution {
        status: Status::Complete,
        history,
        steps,
    })
}

/// Drives a mechanism without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// Returns [`Error::InvalidStep`] if `dt` is not finite and positive.
pub fn solve_unobserved<M, S>(
    mechanism: &mut M,
    bus: &mut IonBus,
    stimulus: S,
    dt: f64,
    steps: usize,
) -> Result<Solution, Error>
where
    M: Mechanism + ?Sized,
    S: FnMut(f64, &mut IonBus) -> f64,
{
    solve(mechanism, bus, stimulus, dt, steps, ())
}
