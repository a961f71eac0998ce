//! Error types for collections and projected views

use crate::cursor::CursorError;
use crate::projection::CastError;
use castkit_guard::GuardError;

/// Collection and view errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    /// Argument rejected before any side effect
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] GuardError),

    /// Element is not convertible to the requested type
    #[error("invalid cast: {0}")]
    InvalidCast(#[from] CastError),

    /// Indexed access past the end
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Cursor misuse
    #[error("cursor error: {0}")]
    Cursor(#[from] CursorError),
}

impl CollectionError {
    /// Create out-of-range error
    #[inline]
    #[must_use]
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Check if error is a failed element cast
    #[inline]
    #[must_use]
    pub fn is_invalid_cast(&self) -> bool {
        matches!(self, Self::InvalidCast(_))
    }

    /// Check if error was raised by argument validation
    #[inline]
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Index of the element that failed to cast, if known
    #[inline]
    #[must_use]
    pub fn cast_index(&self) -> Option<usize> {
        match self {
            Self::InvalidCast(cast) => cast.index,
            _ => None,
        }
    }
}
