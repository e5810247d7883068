//! Tracing, logging, and process-level failure reporting (shared setup).

/// Output format for process logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines for local development.
    Pretty,
    /// One JSON object per line for log shipping.
    Json,
}

/// Initialize process-wide observability (tracing/logging).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}

/// Install a process-level panic hook that reports through the logger.
///
/// Panics inside request handlers are captured by the routing layer and
/// never reach this hook; it exists for panics on detached tasks and other
/// code running outside a request, which would otherwise only surface on
/// stderr.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
        ::tracing::error!(
            panic = %info,
            location = location.as_deref().unwrap_or("unknown"),
            "uncaught panic outside the request path"
        );
        default_hook(info);
    }));
}

/// Tracing configuration (filters, formats).
pub mod tracing;

/// Metrics setup and exporters.
pub mod metrics {}
