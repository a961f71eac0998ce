//! Testing utilities for castkit workspace
//!
//! Shared fixtures: a two-level element hierarchy with its projections,
//! an admission tracker for concurrency caps, and latency helpers.

#![allow(missing_docs)]

use castkit_collections::{AnyArc, CastError, Projection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

/// Base of the fixture hierarchy
pub trait Element: Send + Sync + 'static {
    fn value(&self) -> i32;

    fn into_any(self: Arc<Self>) -> AnyArc;
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaseElement {
    pub value: i32,
}

impl Element for BaseElement {
    fn value(&self) -> i32 {
        self.value
    }

    fn into_any(self: Arc<Self>) -> AnyArc {
        self
    }
}

/// Derived element exposing its value as text
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedElement {
    value: i32,
}

impl DerivedElement {
    /// Unparseable labels store 0
    pub fn from_label(label: &str) -> Self {
        Self {
            value: label.parse().unwrap_or(0),
        }
    }

    pub fn label(&self) -> String {
        self.value.to_string()
    }
}

impl Element for DerivedElement {
    fn value(&self) -> i32 {
        self.value
    }

    fn into_any(self: Arc<Self>) -> AnyArc {
        self
    }
}

pub fn base(value: i32) -> Arc<dyn Element> {
    Arc::new(BaseElement { value })
}

pub fn derived(label: &str) -> Arc<dyn Element> {
    Arc::new(DerivedElement::from_label(label))
}

/// Projects `Arc<dyn Element>` onto `Arc<DerivedElement>`
#[derive(Debug, Clone, Copy, Default)]
pub struct AsDerived;

impl Projection for AsDerived {
    type From = Arc<dyn Element>;
    type To = Arc<DerivedElement>;

    fn project(value: &Arc<dyn Element>) -> Result<Arc<DerivedElement>, CastError> {
        Arc::clone(value)
            .into_any()
            .downcast::<DerivedElement>()
            .map_err(|_| CastError::expected::<DerivedElement>())
    }

    fn unproject(value: Arc<DerivedElement>) -> Result<Arc<dyn Element>, CastError> {
        Ok(value)
    }
}

/// Projects `Arc<DerivedElement>` onto `Arc<dyn Element>`
#[derive(Debug, Clone, Copy, Default)]
pub struct AsElement;

impl Projection for AsElement {
    type From = Arc<DerivedElement>;
    type To = Arc<dyn Element>;

    fn project(value: &Arc<DerivedElement>) -> Result<Arc<dyn Element>, CastError> {
        Ok(Arc::clone(value) as Arc<dyn Element>)
    }

    fn unproject(value: Arc<dyn Element>) -> Result<Arc<DerivedElement>, CastError> {
        AsDerived::project(&value)
    }
}

/// Tracks how many operations are admitted at once
#[derive(Debug, Default)]
pub struct AdmissionTracker {
    current: AtomicUsize,
    peak: AtomicUsize,
    total: AtomicUsize,
}

impl AdmissionTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record an admission; the returned guard records the release
    pub fn enter(self: &Arc<Self>) -> AdmissionGuard {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
        AdmissionGuard {
            tracker: Arc::clone(self),
        }
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct AdmissionGuard {
    tracker: Arc<AdmissionTracker>,
}

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        self.tracker.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// `0..n` as a vector
pub fn int_list(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// Sleep for `millis` on the tokio clock
pub async fn simulated_work(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

/// Current-thread runtime with paused time for latency-driven tests
pub fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

/// Install a test tracing subscriber once per process
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
