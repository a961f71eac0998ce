//! Error types for argument validation

/// Argument validation failure
///
/// Every variant carries the name of the parameter that failed, so callers
/// can report which input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// Value was absent
    #[error("{name} cannot be null")]
    Null {
        /// Parameter name
        name: String,
    },

    /// Value fell outside its allowed range
    #[error("{message}")]
    OutOfRange {
        /// Parameter name
        name: String,
        /// Rejected value, rendered with `Display`
        value: String,
        /// Full message naming the violated bound
        message: String,
    },
}

impl GuardError {
    /// Create null error for parameter
    #[inline]
    pub fn null(name: impl Into<String>) -> Self {
        Self::Null { name: name.into() }
    }

    /// Create out-of-range error for parameter
    #[inline]
    pub fn out_of_range(
        name: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::OutOfRange {
            name: name.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Name of the rejected parameter
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Null { name } | Self::OutOfRange { name, .. } => name,
        }
    }

    /// Check if the value was missing rather than invalid
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null { .. })
    }
}
