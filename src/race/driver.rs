/*!
 * Retry Driver
 *
 * Bounded retry loop around the coordinator. The first SUCCESS ends the run.
 */

use super::classifier::Verdict;
use super::coordinator::RaceCoordinator;
use crate::core::types::AttemptIndex;
use crate::monitoring::{attempt_span, RaceReport};
use crate::syscalls::SyscallGateway;
use serde::Serialize;
use tracing::{debug, info, warn, Instrument};

/// Terminal result of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DriverOutcome {
    DoubleFree { attempt: AttemptIndex },
    /// Every permitted attempt ran without a double free
    Exhausted { issued: AttemptIndex },
    /// An attempt failed in a way retrying cannot fix
    Stopped { attempt: AttemptIndex, error: String },
}

impl DriverOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::DoubleFree { .. })
    }
}

pub struct RetryDriver<G> {
    coordinator: RaceCoordinator<G>,
}

impl<G> RetryDriver<G>
where
    G: SyscallGateway + 'static,
{
    pub fn new(coordinator: RaceCoordinator<G>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &RaceCoordinator<G> {
        &self.coordinator
    }

    /// Attempt the race up to `max_attempts` times
    pub async fn run(&self) -> RaceReport {
        let config = self.coordinator.config();
        let mut report = RaceReport::new(config.clone());

        for attempt in 1..=config.max_attempts {
            report.attempts = attempt;

            let result = self
                .coordinator
                .run_attempt(attempt)
                .instrument(attempt_span(attempt))
                .await;

            match result {
                Ok(record) => {
                    report.last_pair = Some(record.pair);
                    match record.verdict {
                        Verdict::Success => {
                            info!(
                                attempt,
                                both_accepted = record.pair.both_accepted(),
                                "Double free achieved"
                            );
                            report.outcome = DriverOutcome::DoubleFree { attempt };
                            return report;
                        }
                        Verdict::Retry => {
                            report.retried += 1;
                        }
                    }
                }
                Err(e) if e.is_retryable() => {
                    debug!(attempt, error = %e, "Attempt aborted");
                    report.aborted += 1;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Attempt cannot be retried, stopping");
                    report.aborted += 1;
                    report.outcome = DriverOutcome::Stopped {
                        attempt,
                        error: e.to_string(),
                    };
                    return report;
                }
            }
        }

        info!(attempts = report.attempts, "Double free not achieved");
        report.outcome = DriverOutcome::Exhausted {
            issued: report.attempts,
        };
        report
    }
}
