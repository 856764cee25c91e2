//! Solver drivers for Cable mechanisms.
//!
//! These drivers stand in for the host engine's scheduling loop: per step
//! they evaluate a stimulus (which may update bus currents and supplies the
//! membrane voltage), invoke a mechanism through one of its two solver
//! interfaces, and emit an event to an observer.

pub mod transient;
