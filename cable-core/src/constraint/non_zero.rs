use std::cmp::Ordering;

use num_traits::Zero;

use super::{Constrained, Constraint, ConstraintError};

/// Marker constraint for values that are not equal to zero.
///
/// Either sign is allowed; ion valences, for example, may be negative but
/// never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonZero;

impl NonZero {
    /// Constructs a value constrained to be non-zero.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstraintError`] if `value` is zero or not a number.
    pub fn new<T: PartialOrd + Zero>(value: T) -> Result<Constrained<T, Self>, ConstraintError> {
        Constrained::new(value)
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for NonZero {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match value.partial_cmp(&T::zero()) {
            None => Err(ConstraintError::NotANumber),
            Some(Ordering::Equal) => Err(ConstraintError::Zero),
            Some(_) => Ok(()),
        }
    }
}
