//! Range bounds for numeric validation

use std::fmt::Display;

/// Optional lower and upper bounds, each inclusive or exclusive
///
/// A missing bound never rejects a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBound<T> {
    min: Option<T>,
    min_inclusive: bool,
    max: Option<T>,
    max_inclusive: bool,
}

impl<T> Default for RangeBound<T> {
    fn default() -> Self {
        Self {
            min: None,
            min_inclusive: true,
            max: None,
            max_inclusive: true,
        }
    }
}

impl<T: PartialOrd + Copy> RangeBound<T> {
    /// Range accepting every value
    #[inline]
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// `value >= min`
    #[inline]
    #[must_use]
    pub fn at_least(min: T) -> Self {
        Self::default().with_min(min, true)
    }

    /// `value > min`
    #[inline]
    #[must_use]
    pub fn greater_than(min: T) -> Self {
        Self::default().with_min(min, false)
    }

    /// `value <= max`
    #[inline]
    #[must_use]
    pub fn at_most(max: T) -> Self {
        Self::default().with_max(max, true)
    }

    /// `value < max`
    #[inline]
    #[must_use]
    pub fn less_than(max: T) -> Self {
        Self::default().with_max(max, false)
    }

    /// `min <= value <= max`
    #[inline]
    #[must_use]
    pub fn between(min: T, max: T) -> Self {
        Self::default().with_min(min, true).with_max(max, true)
    }

    /// With lower bound
    #[inline]
    #[must_use]
    pub fn with_min(mut self, min: T, inclusive: bool) -> Self {
        self.min = Some(min);
        self.min_inclusive = inclusive;
        self
    }

    /// With upper bound
    #[inline]
    #[must_use]
    pub fn with_max(mut self, max: T, inclusive: bool) -> Self {
        self.max = Some(max);
        self.max_inclusive = inclusive;
        self
    }

    /// Check whether value satisfies both bounds
    #[must_use]
    pub fn contains(&self, value: T) -> bool {
        let min_valid = match self.min {
            None => true,
            Some(min) if self.min_inclusive => value >= min,
            Some(min) => value > min,
        };
        let max_valid = match self.max {
            None => true,
            Some(max) if self.max_inclusive => value <= max,
            Some(max) => value < max,
        };
        min_valid && max_valid
    }
}

impl<T: Display> RangeBound<T> {
    /// Human-readable constraint for parameter `name`
    ///
    /// Produces e.g. `"value must be between 10 and 20."` or
    /// `"value must be greater than 10 and less than 20."`.
    #[must_use]
    pub fn describe(&self, name: &str) -> String {
        if let (Some(min), true, Some(max), true) =
            (&self.min, self.min_inclusive, &self.max, self.max_inclusive)
        {
            return format!("{name} must be between {min} and {max}.");
        }

        let lower = self.min.as_ref().map(|min| {
            if self.min_inclusive {
                format!("greater than or equal to {min}")
            } else {
                format!("greater than {min}")
            }
        });
        let upper = self.max.as_ref().map(|max| {
            if self.max_inclusive {
                format!("less than or equal to {max}")
            } else {
                format!("less than {max}")
            }
        });

        match (lower, upper) {
            (Some(lower), Some(upper)) => format!("{name} must be {lower} and {upper}."),
            (Some(bound), None) | (None, Some(bound)) => format!("{name} must be {bound}."),
            (None, None) => format!("{name} is unbounded."),
        }
    }
}
