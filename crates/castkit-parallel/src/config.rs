//! Runner configuration

use crate::error::ConfigError;
use castkit_guard::{check_range, GuardError, RangeBound};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Admission limit used when none is configured
pub const DEFAULT_MAX_PARALLEL: usize = 10;

/// Shared flag that stops a run from admitting further items
///
/// Clones observe the same flag. Operations already running are not
/// interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create flag in the not-cancelled state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop further admissions
    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Maximum operations in flight at once
    pub max_parallel: usize,
    /// Optional cancellation flag (runtime only)
    #[serde(skip)]
    pub cancellation: Option<CancellationFlag>,
}

impl RunnerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With admission limit
    #[inline]
    #[must_use]
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel;
        self
    }

    /// With cancellation flag
    #[inline]
    #[must_use]
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    /// `GuardError::OutOfRange` if `max_parallel` is zero or exceeds the
    /// semaphore capacity
    pub fn validate(&self) -> Result<(), GuardError> {
        check_max_parallel(self.max_parallel).map(|_| ())
    }

    /// Parse and validate configuration from TOML
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed TOML
    /// - `ConfigError::Invalid` if validation fails
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_parallel: DEFAULT_MAX_PARALLEL,
            cancellation: None,
        }
    }
}

pub(crate) fn check_max_parallel(max_parallel: usize) -> Result<usize, GuardError> {
    check_range(
        max_parallel,
        "max_parallel",
        RangeBound::between(1, Semaphore::MAX_PERMITS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limit_is_ten() {
        let config = RunnerConfig::default();
        assert_eq!(config.max_parallel, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_limit_rejected() {
        let err = RunnerConfig::new().with_max_parallel(0).validate().unwrap_err();
        assert_eq!(err.name(), "max_parallel");
    }

    #[test]
    fn from_toml() {
        let config = RunnerConfig::from_toml_str("max_parallel = 4").unwrap();
        assert_eq!(config.max_parallel, 4);
        assert!(config.cancellation.is_none());

        let config = RunnerConfig::from_toml_str("").unwrap();
        assert_eq!(config.max_parallel, DEFAULT_MAX_PARALLEL);
    }

    #[test]
    fn from_toml_errors() {
        assert!(matches!(
            RunnerConfig::from_toml_str("max_parallel = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RunnerConfig::from_toml_str("max_parallel = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn cancellation_shared_between_clones() {
        let flag = CancellationFlag::new();
        let config = RunnerConfig::new().with_cancellation(flag.clone());

        flag.cancel();
        assert!(config.cancellation.unwrap().is_cancelled());
    }
}
