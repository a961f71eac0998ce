//! Precondition checks
//!
//! Every check returns the validated value so it can be used inline:
//!
//! ```rust
//! # use castkit_guard::{check_range, RangeBound, GuardError};
//! # fn run(max_parallel: usize) -> Result<usize, GuardError> {
//! let max_parallel = check_range(max_parallel, "max_parallel", RangeBound::at_least(1))?;
//! # Ok(max_parallel)
//! # }
//! ```

use crate::error::GuardError;
use crate::range::RangeBound;
use std::fmt::Display;

/// Validate that a value is present
///
/// # Errors
/// - `GuardError::Null` if `value` is `None`
#[inline]
pub fn check_not_null<T>(value: Option<T>, name: &str) -> Result<T, GuardError> {
    value.ok_or_else(|| GuardError::null(name))
}

/// Check whether value lies within `range`
#[inline]
#[must_use]
pub fn is_in_range<T: PartialOrd + Copy>(value: T, range: &RangeBound<T>) -> bool {
    range.contains(value)
}

/// Validate that value lies within `range`
///
/// # Errors
/// - `GuardError::OutOfRange` with a message such as
///   `"max_parallel must be greater than or equal to 1."`
pub fn check_range<T>(value: T, name: &str, range: RangeBound<T>) -> Result<T, GuardError>
where
    T: PartialOrd + Copy + Display,
{
    if is_in_range(value, &range) {
        Ok(value)
    } else {
        Err(GuardError::out_of_range(
            name,
            value.to_string(),
            range.describe(name),
        ))
    }
}
