/*!
 * Operation Tracing
 * Structured spans around filesystem calls using the tracing crate
 *
 * Features:
 * - Trace ID per call for log correlation
 * - JSON or compact human-readable output
 * - Slow call warnings with the elapsed time attached
 */

use std::time::Instant;
use tracing::{debug, span, warn, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::core::limits::SLOW_OPERATION_THRESHOLD;

/// Install the global subscriber
///
/// `RUST_LOG` selects the level (default: info). With `json` set, events are
/// written as JSON lines with span context. A second call is a no-op.
pub fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        debug!(json, "Tracing initialized");
    }
}

pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one filesystem call on one path
///
/// Dropping the span logs its duration; calls slower than
/// [`SLOW_OPERATION_THRESHOLD`] are reported at warn level.
pub struct OperationSpan {
    span: Span,
    start: Instant,
    operation: &'static str,
    path: String,
    trace_id: String,
}

impl OperationSpan {
    pub fn new(operation: &'static str, path: &str) -> Self {
        let trace_id = generate_trace_id();
        let span = span!(
            Level::DEBUG,
            "fs_operation",
            trace_id = %trace_id,
            operation = operation,
            path = path,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
            bytes = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            operation,
            path: path.to_string(),
            trace_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn record_result(&self, success: bool) {
        self.span.record("result", if success { "success" } else { "error" });
    }

    pub fn record_error(&self, error: &dyn std::fmt::Display) {
        self.span.record("error", tracing::field::display(error));
        self.span.record("result", "error");
    }

    pub fn record_bytes(&self, bytes: usize) {
        self.span.record("bytes", bytes);
    }

    /// Record the outcome of `result` and hand it back
    pub fn finish<T, E: std::fmt::Display>(&self, result: Result<T, E>) -> Result<T, E> {
        match &result {
            Ok(_) => self.record_result(true),
            Err(e) => self.record_error(e),
        }
        result
    }
}

impl Drop for OperationSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration > SLOW_OPERATION_THRESHOLD {
            warn!(
                trace_id = %self.trace_id,
                operation = self.operation,
                path = %self.path,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow filesystem call"
            );
        } else {
            debug!(
                trace_id = %self.trace_id,
                operation = self.operation,
                path = %self.path,
                duration_us = duration.as_micros() as u64,
                "filesystem call completed"
            );
        }
    }
}

#[inline]
pub fn span_operation(operation: &'static str, path: &str) -> OperationSpan {
    OperationSpan::new(operation, path)
}
