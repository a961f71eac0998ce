//! castkit Parallel - bounded-concurrency task running
//!
//! Maps an asynchronous operation over a collection with at most
//! `max_parallel` operations in flight:
//! - Unordered runs with optional per-item completion callbacks
//! - Ordered runs that return results in source order
//! - Optional cancellation that stops new admissions
//!
//! # Example
//!
//! ```rust
//! use castkit_parallel::{ParallelRunner, RunnerConfig};
//!
//! # async fn example() -> Result<(), castkit_parallel::RunError<String>> {
//! let runner = ParallelRunner::new(RunnerConfig::new().with_max_parallel(4));
//!
//! let lengths = runner
//!     .run_ordered(vec!["a", "bb", "ccc"], |s| async move { Ok::<_, String>(s.len()) })
//!     .await?;
//! assert_eq!(lengths, vec![1, 2, 3]);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod runner;

pub use config::{CancellationFlag, RunnerConfig, DEFAULT_MAX_PARALLEL};
pub use error::{ConfigError, RunError};
pub use runner::{
    for_each_async, for_each_async_with, for_each_async_with_result, for_each_ordered,
    ParallelRunner,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for bounded runs
    pub use crate::{for_each_async, for_each_ordered, ParallelRunner, RunError, RunnerConfig};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
