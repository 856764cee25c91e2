//! Adaptive implicit driver built on the derivative/Jacobian-solve pair.
//!
//! Instead of asking a mechanism to advance itself, this driver uses the
//! two primitives an implicit solver needs per state and step:
//!
//! 1. `ode_derivative` — the explicit rate at the current state
//! 2. `ode_jacobian_solve` — that rate divided by `1 - dt·J`, the
//!    linearized correction of a backward Euler step
//!
//! The accepted update is `state += dt · corrected_rate`. The difference
//! between the corrected and explicit rates scales with the step's local
//! error, so the driver uses it to reject and halve steps that exceed the
//! configured tolerance and to grow the step when the estimate is
//! comfortably small.
//!
//! # Example
//!
//! ```ignore
//! use cable_solvers::transient::implicit;
//!
//! let solution = implicit::solve(
//!     &mut pool,
//!     &mut bus,
//!     |_, _| -65.0,
//!     implicit::Config::default(),
//!     100.0,
//!     (),
//! )?;
//! ```

mod action;
mod config;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use config::Config;
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use cable_core::{Context, ImplicitOde, IonBus, Observer, Sample};

/// Integrates a mechanism from time 0 to `t_end` (ms) with adaptive steps.
///
/// The driver does not call `init`; initialization is an explicit host
/// step. The final step is clamped so the run lands on `t_end`.
///
/// # Observer
///
/// The observer receives an [`Event`] per accepted step, starting with
/// step 0 (the state before any integration), and may return
/// [`Action::StopEarly`] to terminate the run.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] if the configuration or `t_end` is
/// invalid, and [`Error::StepUnderflow`] if meeting the tolerance would
/// require a step below `dt_min`.
pub fn solve<M, S, Obs>(
    mechanism: &mut M,
    bus: &mut IonBus,
    mut stimulus: S,
    config: Config,
    t_end: f64,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    M: ImplicitOde + ?Sized,
    S: FnMut(f64, &mut IonBus) -> f64,
    Obs: Observer<Event, Action>,
{
    config
        .validate()
        .map_err(|reason| Error::InvalidConfig { reason })?;
    if !t_end.is_finite() || t_end <= 0.0 {
        return Err(Error::InvalidConfig {
            reason: "t_end must be finite and positive",
        });
    }

    let states = mechanism.state_count();
    let mut history = vec![Sample::capture(mechanism, 0.0)];

    let event = Event {
        step: 0,
        dt: 0.0,
        sample: history[0].clone(),
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(Solution {
            status: Status::StoppedByObserver,
            history,
            steps: 0,
        });
    }

    let mut time = 0.0;
    let mut dt = config.dt_init;
    let mut step = 0;
    let mut explicit = vec![0.0; states];

    while time < t_end {
        let attempt = dt.min(t_end - time);

        let voltage = stimulus(time, &mut *bus);

        // Explicit rates at the current state.
        mechanism.ode_derivative(Context {
            voltage,
            bus: &mut *bus,
        });
        for (index, rate) in explicit.iter_mut().enumerate() {
            *rate = mechanism.rate(index);
        }

        // Linearized implicit correction for this step size.
        mechanism.ode_jacobian_solve(
            Context {
                voltage,
                bus: &mut *bus,
            },
            attempt,
        );

        // The correction magnitude scales with the local error.
        let mut worst: f64 = 0.0;
        for index in 0..states {
            let error = (attempt * (mechanism.rate(index) - explicit[index])).abs();
            let tolerance = config.abs_tol + config.rel_tol * mechanism.state(index).abs();
            worst = worst.max(error / tolerance);
        }

        if worst > 1.0 {
            dt = attempt / 2.0;
            if dt < config.dt_min {
                return Err(Error::StepUnderflow { time, dt });
            }
            continue;
        }

        for index in 0..states {
            let next = mechanism.state(index) + attempt * mechanism.rate(index);
            mechanism.set_state(index, next, &mut *bus);
        }
        time += attempt;
        step += 1;

        let sample = Sample::capture(mechanism, time);
        history.push(sample.clone());

        let event = Event {
            step,
            dt: attempt,
            sample,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution {
                status: Status::StoppedByObserver,
                history,
                steps: step,
            });
        }

        dt = if worst < 0.25 {
            (attempt * 2.0).min(config.dt_max)
        } else {
            attempt
        };
    }

    Ok(Solution {
        status: Status::Complete,
        history,
        steps: step,
    })
}
