/*!
 * Monitoring
 * Subscriber setup and per-call tracing spans
 */

mod tracer;

pub use tracer::{generate_trace_id, init_tracing, span_operation, OperationSpan};
