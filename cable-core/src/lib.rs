//! Core traits and types for the Cable framework.
//!
//! This crate defines the shared abstractions that mechanisms, solvers, and
//! host engines build on:
//!
//! - [`IonBus`] — host-owned, per-compartment ion slots with a read/write
//!   capability split and exactly-one-writer concentration ownership
//! - [`Mechanism`] — a per-compartment state-update unit with a fixed-step
//!   update method
//! - [`ImplicitOde`] — the derivative and Jacobian-solve pair an implicit
//!   solver needs from a mechanism
//! - [`Observer`] — receives solver events and optionally returns control
//!   actions
//! - [`constraint`] — type-level numeric constraints used to validate
//!   configuration at construction time

pub mod bus;
pub mod constraint;
mod mechanism;
mod observer;
mod sample;

pub use bus::{CompartmentId, IonBus, SpeciesId};
pub use mechanism::{Context, ImplicitOde, IonAccess, IonDependency, Mechanism};
pub use observer::Observer;
pub use sample::Sample;
