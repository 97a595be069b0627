//! Convenience macros for performance instrumentation.

/// Create a [`crate::performance::PerformanceSpan`] with optional fields.
///
/// ```text
/// perf_span!("name")
/// perf_span!("name", field1 = value1, field2 = value2)
/// ```
///
/// ```rust
/// use sigmatics_tracing::perf_span;
///
/// {
///     let _span = perf_span!("execute_class_plan", ops = 3);
/// }
/// ```
#[macro_export]
macro_rules! perf_span {
    ($name:expr) => {{
        $crate::performance::PerformanceSpan::new($name, None)
    }};
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {{
        tracing::trace!(name = $name, $($field = $value),+, "perf_span_start");
        $crate::performance::PerformanceSpan::new($name, None)
    }};
}

/// Emit a debug-level event tagged with `event = name`.
///
/// ```rust
/// use sigmatics_tracing::perf_event;
///
/// perf_event!("cache_hit", entries = 4);
/// ```
#[macro_export]
macro_rules! perf_event {
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {
        tracing::debug!(
            event = $name,
            $($field = $value),+
        );
    };
}
