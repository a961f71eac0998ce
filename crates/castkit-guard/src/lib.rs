//! castkit Guard
//!
//! Argument validation used at every public entry point of the workspace.
//! Each check either hands the value back or fails with a [`GuardError`]
//! naming the offending parameter, before any work begins.
//!
//! # Example
//!
//! ```rust
//! use castkit_guard::{check_not_null, check_range, RangeBound};
//!
//! let max_parallel = check_range(4usize, "max_parallel", RangeBound::at_least(1)).unwrap();
//! assert_eq!(max_parallel, 4);
//!
//! let err = check_not_null::<u32>(None, "backing").unwrap_err();
//! assert_eq!(err.name(), "backing");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod check;
mod error;
mod range;

pub use check::{check_not_null, check_range, is_in_range};
pub use error::GuardError;
pub use range::RangeBound;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
