/*!
 * Run Report
 */

use super::tracer::generate_run_id;
use crate::config::RaceConfig;
use crate::core::types::AttemptIndex;
use crate::race::{DriverOutcome, RaceErrorPair};
use serde::Serialize;

pub const EXIT_DOUBLE_FREE: i32 = 0;
pub const EXIT_EXHAUSTED: i32 = 1;
pub const EXIT_SETUP_FAILED: i32 = 2;

/// Outcome of a run plus what led to it
#[derive(Debug, Clone, Serialize)]
pub struct RaceReport {
    pub run_id: String,
    #[serde(flatten)]
    pub outcome: DriverOutcome,
    /// Attempts issued, aborted ones included
    pub attempts: AttemptIndex,
    /// Attempts classified RETRY
    pub retried: u32,
    /// Attempts abandoned on a submit or wait failure
    pub aborted: u32,
    pub last_pair: Option<RaceErrorPair>,
    pub config: RaceConfig,
}

impl RaceReport {
    pub fn new(config: RaceConfig) -> Self {
        Self {
            run_id: generate_run_id(),
            outcome: DriverOutcome::Exhausted { issued: 0 },
            attempts: 0,
            retried: 0,
            aborted: 0,
            last_pair: None,
            config,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome.succeeded()
    }

    /// Human-readable one-line summary
    pub fn status_line(&self) -> String {
        match &self.outcome {
            DriverOutcome::DoubleFree { attempt } => {
                format!("Double free achieved on attempt {attempt}")
            }
            DriverOutcome::Exhausted { issued } => {
                format!("Double free not achieved after {issued} attempts")
            }
            DriverOutcome::Stopped { attempt, error } => {
                format!("Race stopped on attempt {attempt}: {error}")
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            DriverOutcome::DoubleFree { .. } => EXIT_DOUBLE_FREE,
            DriverOutcome::Exhausted { .. } => EXIT_EXHAUSTED,
            DriverOutcome::Stopped { .. } => EXIT_SETUP_FAILED,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
