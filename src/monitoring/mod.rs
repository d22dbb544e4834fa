/*!
 * Monitoring
 * Structured tracing and the end-of-run report
 */

mod report;
mod tracer;

pub use report::{RaceReport, EXIT_DOUBLE_FREE, EXIT_EXHAUSTED, EXIT_SETUP_FAILED};
pub use tracer::{attempt_span, generate_run_id, init_tracing, SyscallSpan};
