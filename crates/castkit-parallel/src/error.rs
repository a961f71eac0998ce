//! Error types for the runner

use castkit_guard::GuardError;

/// Failure of a bounded run
///
/// `E` is the error type of the per-item operation.
#[derive(Debug, thiserror::Error)]
pub enum RunError<E> {
    /// Rejected before any operation started
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] GuardError),

    /// An operation or its callback failed; every admitted sibling still ran
    /// to completion
    #[error("operation failed for item {index}: {error} ({completed} completed, {suppressed} later failures suppressed)")]
    Operation {
        /// Source position of the first failure in completion order
        index: usize,
        /// Error returned by the operation or its callback
        error: E,
        /// Items whose operation and callback succeeded
        completed: usize,
        /// Failures that settled after the reported one
        suppressed: usize,
    },

    /// Cancellation stopped admissions before every item ran
    #[error("run cancelled after {completed} items completed")]
    Cancelled {
        /// Items whose operation succeeded
        completed: usize,
    },
}

impl<E> RunError<E> {
    /// Check if any operation was attempted
    ///
    /// `false` means argument validation failed and nothing ran.
    #[inline]
    #[must_use]
    pub fn attempted(&self) -> bool {
        !matches!(self, Self::InvalidArgument(_))
    }

    /// Check if some items succeeded before the run failed
    #[inline]
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.completed() > 0
    }

    /// Number of items whose operation succeeded
    #[inline]
    #[must_use]
    pub fn completed(&self) -> usize {
        match self {
            Self::InvalidArgument(_) => 0,
            Self::Operation { completed, .. } | Self::Cancelled { completed } => *completed,
        }
    }

    /// Check if the run was cancelled
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The operation's error, if an operation failed
    #[must_use]
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            Self::Operation { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Malformed TOML
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed configuration failed validation
    #[error("invalid config: {0}")]
    Invalid(#[from] GuardError),
}
