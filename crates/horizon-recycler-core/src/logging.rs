//! Logging facilities for Horizon Recycler.
//!
//! Horizon Recycler uses the `tracing` crate for instrumentation. The library
//! never installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_recycler=trace")
//!         .init();
//! }
//! ```
//!
//! Every event carries one of the [`targets`] below, so output can be
//! filtered per subsystem.

/// Span names used throughout Horizon Recycler for tracing.
pub mod span_names {
    /// Signal emission span.
    pub const SIGNAL: &str = "horizon_recycler::signal";
    /// View holder creation span.
    pub const CREATE_HOLDER: &str = "horizon_recycler::create_holder";
    /// View holder binding span.
    pub const BIND_HOLDER: &str = "horizon_recycler::bind_holder";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_recycler_core::signal";
    /// Observable item store target.
    pub const STORE: &str = "horizon_recycler::store";
    /// View type registry target.
    pub const REGISTRY: &str = "horizon_recycler::registry";
    /// Scroll aggregation target.
    pub const SCROLL: &str = "horizon_recycler::scroll";
    /// Adapter lifecycle and host invalidation target.
    pub const ADAPTER: &str = "horizon_recycler::adapter";
    /// Performance spans target.
    pub const PERF: &str = "horizon_recycler::perf";
}

/// A guard for performance tracing spans.
///
/// Creates a tracing span that is entered on creation and exited on drop.
///
/// # Example
///
/// ```
/// use horizon_recycler_core::logging::{PerfSpan, span_names};
///
/// fn expensive_operation() {
///     let _span = PerfSpan::new(span_names::BIND_HOLDER);
///     // ... do work ...
/// } // Span automatically closed here
/// ```
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::trace_span!(target: targets::PERF, "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
