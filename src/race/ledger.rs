/*!
 * Identifier Ledger
 *
 * Per-attempt record of which identifiers the kernel still holds for us.
 * An identifier deleted twice on purpose is `Raced`, kept apart from an
 * ordinary `Released` one so it is never handed out again.
 */

use crate::aio::{ErrorSlot, RequestId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdState {
    Live,
    Released,
    Raced,
}

#[derive(Debug, Clone)]
pub struct IdentifierLedger {
    entries: Vec<(RequestId, IdState)>,
}

impl IdentifierLedger {
    pub fn new(ids: Vec<RequestId>) -> Self {
        Self {
            entries: ids.into_iter().map(|id| (id, IdState::Live)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<IdState> {
        self.entries.get(index).map(|(_, state)| *state)
    }

    /// Take the identifier at `index` as the race target
    ///
    /// Only a live identifier can be raced; once claimed it is `Raced`
    /// for the rest of the attempt.
    pub fn claim_race_target(&mut self, index: usize) -> Option<RequestId> {
        match self.entries.get_mut(index) {
            Some((id, state @ IdState::Live)) => {
                *state = IdState::Raced;
                Some(*id)
            }
            _ => None,
        }
    }

    /// Identifiers still held, in batch order
    pub fn live(&self) -> Vec<RequestId> {
        self.entries
            .iter()
            .filter(|(_, state)| *state == IdState::Live)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Record an ordinary delete; only accepted slots release their identifier
    pub fn record_release(&mut self, ids: &[RequestId], slots: &[ErrorSlot]) {
        for (id, slot) in ids.iter().zip(slots) {
            if !slot.status().is_accepted() {
                continue;
            }
            if let Some((_, state)) = self
                .entries
                .iter_mut()
                .find(|(entry, state)| entry == id && *state == IdState::Live)
            {
                *state = IdState::Released;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::limits::KERNEL_ERROR_ESRCH;

    fn ledger() -> IdentifierLedger {
        IdentifierLedger::new(vec![RequestId(10), RequestId(11), RequestId(12)])
    }

    #[test]
    fn test_target_claimed_once() {
        let mut ledger = ledger();
        assert_eq!(ledger.claim_race_target(0), Some(RequestId(10)));
        assert_eq!(ledger.state(0), Some(IdState::Raced));
        assert_eq!(ledger.claim_race_target(0), None);
        assert_eq!(ledger.claim_race_target(7), None);
        assert_eq!(ledger.live(), vec![RequestId(11), RequestId(12)]);
    }

    #[test]
    fn test_release_only_on_accept() {
        let mut ledger = ledger();
        ledger.record_release(
            &[RequestId(11), RequestId(12)],
            &[ErrorSlot::EMPTY, ErrorSlot(KERNEL_ERROR_ESRCH)],
        );
        assert_eq!(ledger.state(1), Some(IdState::Released));
        assert_eq!(ledger.state(2), Some(IdState::Live));
        assert_eq!(ledger.claim_race_target(1), None);
        assert_eq!(ledger.len(), 3);
        assert!(!ledger.is_empty());
    }

    #[test]
    fn test_raced_identifier_not_released_by_cleanup() {
        let mut ledger = ledger();
        ledger.claim_race_target(0);
        ledger.record_release(&[RequestId(10)], &[ErrorSlot::EMPTY]);
        assert_eq!(ledger.state(0), Some(IdState::Raced));
    }
}
