//! Membrane mechanisms for the Cable framework.
//!
//! Each mechanism implements [`cable_core::Mechanism`] and, where an
//! implicit solver path exists, [`cable_core::ImplicitOde`]. Mechanisms are
//! attached to a compartment at model-build time, which is when their
//! configuration is validated and their ion-bus handles are claimed.

pub mod calcium;
