//! Type-level numeric constraints with zero runtime cost.
//!
//! This module lets you express numeric constraints like "non-negative" or
//! "strictly positive" at the type level, with zero runtime overhead after
//! construction.
//!
//! With these types, configuration surfaces can trust that values always
//! satisfy the required numeric invariants, so downstream arithmetic never
//! needs to re-check for zero divisors or negative magnitudes.
//!
//! # Provided Constraints
//!
//! - [`NonNegative`]: zero or greater
//! - [`NonZero`]: not equal to zero
//! - [`StrictlyPositive`]: greater than zero
//!
//! Each marker can be used with the generic [`Constrained<T, C>`] wrapper,
//! where `C` is the marker type implementing [`Constraint<T>`].
//! Each also provides an associated `new()` constructor for convenience.
//!
//! # Extending
//!
//! You can define custom numeric invariants by implementing [`Constraint<T>`]
//! for your own zero-sized marker types.

mod non_negative;
mod non_zero;
mod strictly_positive;

use std::marker::PhantomData;

use thiserror::Error;

pub use non_negative::NonNegative;
pub use non_zero::NonZero;
pub use strictly_positive::StrictlyPositive;

/// A trait for enforcing numeric invariants at construction time.
///
/// Implement this trait for any marker type representing a numeric
/// constraint, such as [`NonNegative`] or [`StrictlyPositive`].
pub trait Constraint<T> {
    /// Checks that the given value satisfies this constraint.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] if the value does not satisfy the
    /// constraint.
    fn check(value: &T) -> Result<(), ConstraintError>;
}

/// An error returned when a [`Constraint`] is violated.
///
/// This enum is marked `#[non_exhaustive]` and may include additional
/// variants in future releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConstraintError {
    #[error("value must not be negative")]
    Negative,
    #[error("value must not be zero")]
    Zero,
    #[error("value is not a number")]
    NotANumber,
}

/// A wrapper enforcing a numeric constraint at construction time.
///
/// Combine this with one of the provided marker types (such as
/// [`StrictlyPositive`]) or your own [`Constraint<T>`] implementation.
///
/// # Example
///
/// ```
/// use cable_core::constraint::{Constrained, StrictlyPositive};
///
/// let tau = Constrained::<_, StrictlyPositive>::new(1000.0).unwrap();
/// assert_eq!(tau.into_inner(), 1000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Constrained<T, C: Constraint<T>> {
    value: T,
    _marker: PhantomData<C>,
}

impl<T, C: Constraint<T>> Constrained<T, C> {
    /// Constructs a new constrained value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not satisfy the constraint.
    pub fn new(value: T) -> Result<Self, ConstraintError> {
        C::check(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// Consumes the wrapper and returns the inner value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Returns a reference to the inner unconstrained value.
impl<T, C: Constraint<T>> AsRef<T> for Constrained<T, C> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constrained_rejects_violations_at_construction() {
        assert!(Constrained::<_, StrictlyPositive>::new(0.5).is_ok());
        assert_eq!(
            Constrained::<f64, StrictlyPositive>::new(0.0).unwrap_err(),
            ConstraintError::Zero
        );
        assert_eq!(
            Constrained::<f64, NonNegative>::new(-1.0).unwrap_err(),
            ConstraintError::Negative
        );
    }

    #[test]
    fn nan_is_not_a_number() {
        assert_eq!(
            Constrained::<f64, NonZero>::new(f64::NAN).unwrap_err(),
            ConstraintError::NotANumber
        );
        assert_eq!(
            Constrained::<f64, StrictlyPositive>::new(f64::NAN).unwrap_err(),
            ConstraintError::NotANumber
        );
    }

    #[test]
    fn as_ref_exposes_the_inner_value() {
        let x = Constrained::<_, NonNegative>::new(3).unwrap();
        assert_eq!(x.as_ref(), &3);
    }
}
