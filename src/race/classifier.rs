/*!
 * Outcome Classifier
 */

use crate::aio::{DeleteStatus, ErrorSlot};
use serde::Serialize;

/// Slots written by the two racing deletes: index 0 racer, index 1 main
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RaceErrorPair {
    pub racer: DeleteStatus,
    pub main: DeleteStatus,
}

impl RaceErrorPair {
    pub fn new(racer: DeleteStatus, main: DeleteStatus) -> Self {
        Self { racer, main }
    }

    pub fn from_slots(slots: [ErrorSlot; 2]) -> Self {
        Self::new(slots[0].status(), slots[1].status())
    }

    pub fn slots(&self) -> [ErrorSlot; 2] {
        [self.racer.into(), self.main.into()]
    }

    /// Both deletes released a reference for the single one held
    pub fn both_accepted(&self) -> bool {
        self.racer.is_accepted() && self.main.is_accepted()
    }
}

/// Verdict for one race attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Both deletes observed the same outcome: double free
    Success,
    /// Second delete saw the first's release; try again
    Retry,
}

/// Success iff both racing deletes observed the same outcome
#[inline]
pub fn classify(pair: &RaceErrorPair) -> Verdict {
    if pair.racer == pair.main {
        Verdict::Success
    } else {
        Verdict::Retry
    }
}
