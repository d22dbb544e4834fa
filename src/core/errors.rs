/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 *
 * Delete outcomes are deliberately absent: they are classified data
 * (`DeleteStatus`), not failures.
 */

use miette::Diagnostic;
use thiserror::Error;

/// Failures at the kernel boundary
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("AIO submission rejected by kernel (code {code:#x})")]
    #[diagnostic(
        code(gateway::submission_failed),
        help("Check the command word and that every descriptor handle is accepted for it.")
    )]
    Submission { code: i32 },

    #[error("AIO wait failed (code {code:#x})")]
    #[diagnostic(
        code(gateway::wait_failed),
        help("Identifiers may have been released already, or the wait timed out.")
    )]
    Wait { code: i32 },

    #[error("Request batch is empty")]
    #[diagnostic(code(gateway::empty_batch))]
    EmptyBatch,

    #[error("Request batch of {len} exceeds kernel maximum {max}")]
    #[diagnostic(
        code(gateway::batch_too_large),
        help("Lower the request count below the kernel batch limit.")
    )]
    BatchTooLarge { len: usize, max: usize },

    #[error("Native AIO syscalls are not available on this platform")]
    #[diagnostic(
        code(gateway::unsupported_platform),
        help("Use the emulated backend (AIO_RACE_BACKEND=emulated) off-target.")
    )]
    UnsupportedPlatform,

    #[error("Blocking syscall task failed: {0}")]
    #[diagnostic(code(gateway::runtime))]
    Runtime(String),
}

impl GatewayError {
    /// Whether the failure aborts only the current attempt
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Submission { .. } | Self::Wait { .. } | Self::Runtime(_)
        )
    }
}

/// Failures of a single race attempt
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum AttemptError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Kernel returned {got} identifiers for a batch of {expected}")]
    #[diagnostic(code(attempt::batch_mismatch))]
    BatchMismatch { expected: usize, got: usize },

    #[error("Batch index {index} is not a live identifier")]
    #[diagnostic(code(attempt::target_unavailable))]
    TargetUnavailable { index: usize },

    #[error("Racer thread failed: {0}")]
    #[diagnostic(code(attempt::racer_failed))]
    RacerFailed(String),
}

impl AttemptError {
    /// Whether the driver may move on to the next attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Gateway(e) => e.is_transient(),
            Self::BatchMismatch { .. } | Self::RacerFailed(_) => true,
            Self::TargetUnavailable { .. } => false,
        }
    }
}

/// Invalid engine configuration
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    #[diagnostic(code(config::invalid_value))]
    InvalidValue { key: &'static str, value: String },

    #[error("max_attempts must be at least 1")]
    #[diagnostic(code(config::zero_attempts))]
    ZeroAttempts,

    #[error("request_count {count} outside 1..={max}")]
    #[diagnostic(
        code(config::request_count),
        help("A batch needs at least one request and at most the kernel batch limit.")
    )]
    RequestCount { count: usize, max: usize },

    #[error("target_index {index} out of range for a batch of {count}")]
    #[diagnostic(code(config::target_out_of_range))]
    TargetOutOfRange { index: usize, count: usize },
}

pub type GatewayResult<T> = Result<T, GatewayError>;
pub type AttemptResult<T> = Result<T, AttemptError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
