//! Logging facilities for Hello Lattice.
//!
//! Hello Lattice uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! The constants in [`targets`] can be used in `tracing` directives to filter
//! logs by subsystem, e.g. `RUST_LOG=hello_core::property=debug`.

/// Target names for log filtering.
pub mod targets {
    /// Core library target.
    pub const CORE: &str = "hello_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "hello_core::signal";
    /// Property system target.
    pub const PROPERTY: &str = "hello_core::property";
    /// Display model target.
    pub const MODEL: &str = "hello_core::model";
    /// Conversion strategies target.
    pub const CONVERT: &str = "hello_core::convert";
    /// Culture and collation target.
    pub const CULTURE: &str = "hello_core::culture";
    /// Lookup service target.
    pub const SERVICE: &str = "hello_core::service";
    /// Async runtime and bounded retrieval target.
    pub const RUNTIME: &str = "hello_core::runtime";
}

/// Performance tracing span guard.
///
/// Creates a tracing span on construction that is exited on drop.
///
/// # Example
///
/// ```
/// use hello_core::logging::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("startup");
///     // ... timed work ...
/// }
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "hello_core::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_share_core_prefix() {
        for target in [
            targets::SIGNAL,
            targets::PROPERTY,
            targets::MODEL,
            targets::CONVERT,
            targets::CULTURE,
            targets::SERVICE,
            targets::RUNTIME,
        ] {
            assert!(target.starts_with(targets::CORE));
        }
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
    }
}
