/*!
 * Race Orchestration
 *
 * Submit a batch, wait for it, delete one identifier from two threads at
 * once and classify what the kernel reported to each.
 */

mod affinity;
mod classifier;
mod coordinator;
mod dispatch;
mod driver;
mod ledger;

pub use affinity::pin_current_thread;
pub use classifier::{classify, RaceErrorPair, Verdict};
pub use coordinator::{AttemptRecord, AttemptState, RaceCoordinator};
pub use dispatch::race_delete;
pub use driver::{DriverOutcome, RetryDriver};
pub use ledger::{IdState, IdentifierLedger};
