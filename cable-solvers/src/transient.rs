//! Time-domain drivers for mechanisms.
//!
//! Two paths mirror the two solver interfaces a mechanism exposes:
//!
//! - [`cnexp`] — fixed-step driving of the mechanism's own `advance`
//!   method, exact for mechanisms with closed-form updates
//! - [`implicit`] — adaptive implicit driving of the derivative and
//!   Jacobian-solve pair

pub mod cnexp;
pub mod implicit;

#[cfg(test)]
pub(crate) mod test_utils;
