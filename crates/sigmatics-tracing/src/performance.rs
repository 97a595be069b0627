//! Timing guards for compiler hot paths.
//!
//! ```rust
//! use sigmatics_tracing::performance::PerformanceSpan;
//!
//! {
//!     let _span = PerformanceSpan::new("normalize", Some(100));
//!     // ... work ...
//! } // logged only if it took at least 100µs
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

const NO_THRESHOLD: u64 = u64::MAX;

static DEFAULT_THRESHOLD_US: AtomicU64 = AtomicU64::new(NO_THRESHOLD);

/// Set the threshold applied to spans created without an explicit one.
pub fn set_default_threshold(threshold_us: Option<u64>) {
    DEFAULT_THRESHOLD_US.store(threshold_us.unwrap_or(NO_THRESHOLD), Ordering::Relaxed);
}

/// Threshold applied to spans created without an explicit one.
pub fn default_threshold() -> Option<u64> {
    match DEFAULT_THRESHOLD_US.load(Ordering::Relaxed) {
        NO_THRESHOLD => None,
        value => Some(value),
    }
}

/// RAII guard measuring the lifetime of an operation.
///
/// The completion event is emitted at drop, at debug level, inside a
/// `perf` span carrying the operation name.
pub struct PerformanceSpan {
    name: String,
    threshold_us: Option<u64>,
    start_time: Instant,
    span: tracing::Span,
}

impl PerformanceSpan {
    /// Start timing `name`; `threshold_us` falls back to [`default_threshold`].
    pub fn new(name: impl Into<String>, threshold_us: Option<u64>) -> Self {
        let name = name.into();
        let span = tracing::debug_span!("perf", name = %name);
        Self {
            name,
            threshold_us: threshold_us.or_else(default_threshold),
            start_time: Instant::now(),
            span,
        }
    }

    /// Name of the measured operation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Microseconds since the span was created.
    pub fn elapsed_us(&self) -> u64 {
        self.start_time.elapsed().as_micros() as u64
    }

    /// Enter this span's context.
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for PerformanceSpan {
    fn drop(&mut self) {
        let elapsed_us = self.elapsed_us();
        if self.threshold_us.map_or(true, |t| elapsed_us >= t) {
            let _entered = self.span.enter();
            tracing::debug!(duration_us = elapsed_us, "performance_span_complete");
        }
    }
}

/// Record the size of an executed plan.
pub fn record_execution(backend: &str, op_count: usize, duration_us: u64) {
    tracing::debug!(
        event = "execution",
        backend = backend,
        op_count = op_count,
        duration_us = duration_us,
        "plan_execution"
    );
}
