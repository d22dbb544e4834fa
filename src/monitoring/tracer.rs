/*!
 * Structured Tracing
 * Tracing setup and spans for attempts and kernel calls
 *
 * Environment variables:
 * - RUST_LOG: log level (default: info)
 * - AIO_RACE_TRACE_JSON: JSON output (default: false)
 */

use std::time::{Duration, Instant};
use tracing::{debug, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Kernel calls slower than this are reported
const SLOW_SYSCALL: Duration = Duration::from_millis(10);

/// Initialize structured tracing; later calls are no-ops
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("AIO_RACE_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let initialized = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
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
                    .with_thread_names(true)
                    .compact(),
            )
            .try_init()
    };

    if initialized.is_ok() {
        debug!(json = use_json, "Structured tracing initialized");
    }
}

/// Unique id correlating every line of one run
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one race attempt
pub fn attempt_span(attempt: u32) -> Span {
    span!(Level::DEBUG, "attempt", attempt)
}

/// Times one kernel call and reports it when it is slow
pub struct SyscallSpan {
    span: Span,
    start: Instant,
    name: &'static str,
}

impl SyscallSpan {
    pub fn new(name: &'static str) -> Self {
        let span = span!(
            Level::TRACE,
            "syscall",
            syscall = name,
            duration_us = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            name,
        }
    }
}

impl Drop for SyscallSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration > SLOW_SYSCALL {
            warn!(
                syscall = self.name,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow syscall detected"
            );
        }
    }
}
