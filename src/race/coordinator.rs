/*!
 * Race Coordinator
 *
 * Drives one attempt through INIT → SUBMITTED → AWAITED → RACING → CLASSIFIED.
 * Every attempt owns a fresh batch, its identifiers and its error slots.
 */

use super::classifier::{classify, RaceErrorPair, Verdict};
use super::dispatch::race_delete;
use super::ledger::IdentifierLedger;
use crate::aio::{placeholder_batch, ErrorSlot, RequestId};
use crate::config::RaceConfig;
use crate::core::errors::{
    AttemptError, AttemptResult, ConfigResult, GatewayError, GatewayResult,
};
use crate::core::types::AttemptIndex;
use crate::monitoring::SyscallSpan;
use crate::syscalls::SyscallGateway;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AttemptState {
    Init,
    Submitted,
    Awaited,
    Racing,
    Classified,
}

/// Result of an attempt that reached CLASSIFIED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub attempt: AttemptIndex,
    pub target: RequestId,
    pub pair: RaceErrorPair,
    pub verdict: Verdict,
}

pub struct RaceCoordinator<G> {
    gateway: Arc<G>,
    config: RaceConfig,
}

impl<G> RaceCoordinator<G>
where
    G: SyscallGateway + 'static,
{
    /// Rejects a config that `RaceConfig::validate` would reject
    pub fn new(gateway: Arc<G>, config: RaceConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { gateway, config })
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Run one attempt; submit and wait failures abort it
    pub async fn run_attempt(&self, attempt: AttemptIndex) -> AttemptResult<AttemptRecord> {
        let mut state = AttemptState::Init;
        let count = self.config.request_count;

        let batch = placeholder_batch(count);
        let (command, priority) = (self.config.command, self.config.priority);
        let ids = self
            .blocking("submit", move |gw| gw.submit(command, &batch, priority))
            .await?;
        advance(&mut state, AttemptState::Submitted);

        if ids.len() != count {
            let got = ids.len();
            self.release(ids).await;
            return Err(AttemptError::BatchMismatch {
                expected: count,
                got,
            });
        }
        let mut ledger = IdentifierLedger::new(ids);

        let live = ledger.live();
        let (mode, timeout) = (self.config.wait_mode, self.config.wait_timeout_usec);
        if let Err(e) = self
            .blocking("wait", move |gw| gw.wait(&live, mode, timeout))
            .await
        {
            self.release(ledger.live()).await;
            return Err(e.into());
        }
        advance(&mut state, AttemptState::Awaited);

        let index = self.config.target_index;
        let Some(target) = ledger.claim_race_target(index) else {
            self.release(ledger.live()).await;
            return Err(AttemptError::TargetUnavailable { index });
        };
        advance(&mut state, AttemptState::Racing);

        let raced = race_delete(Arc::clone(&self.gateway), target, self.config.pin_cores).await;
        let pair = match raced {
            Ok(pair) => pair,
            Err(e) => {
                if self.config.cleanup {
                    self.release(ledger.live()).await;
                }
                return Err(e);
            }
        };

        let verdict = classify(&pair);
        advance(&mut state, AttemptState::Classified);
        debug!(
            attempt,
            %target,
            racer = %pair.racer,
            main = %pair.main,
            ?verdict,
            "Race classified"
        );

        if self.config.cleanup {
            let leftover = ledger.live();
            let slots = self.release(leftover.clone()).await;
            ledger.record_release(&leftover, &slots);
        }

        Ok(AttemptRecord {
            attempt,
            target,
            pair,
            verdict,
        })
    }

    /// Ordinary delete of identifiers we still hold; outcomes are logged only
    async fn release(&self, ids: Vec<RequestId>) -> Vec<ErrorSlot> {
        if ids.is_empty() {
            return Vec::new();
        }

        let count = ids.len();
        let released = self
            .blocking("delete", move |gw| {
                let mut slots = vec![ErrorSlot::EMPTY; ids.len()];
                gw.delete(&ids, &mut slots);
                Ok(slots)
            })
            .await;

        match released {
            Ok(slots) => {
                for slot in slots.iter().filter(|s| !s.status().is_accepted()) {
                    warn!(status = %slot.status(), "Cleanup delete not accepted");
                }
                trace!(count, "Released leftover identifiers");
                slots
            }
            Err(e) => {
                warn!(error = %e, "Cleanup delete did not run");
                Vec::new()
            }
        }
    }

    /// Run a blocking gateway call on the blocking pool
    async fn blocking<T, F>(&self, name: &'static str, call: F) -> GatewayResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&G) -> GatewayResult<T> + Send + 'static,
    {
        let _span = SyscallSpan::new(name);
        let gateway = Arc::clone(&self.gateway);
        tokio::task::spawn_blocking(move || call(gateway.as_ref()))
            .await
            .map_err(|e| GatewayError::Runtime(e.to_string()))?
    }
}

fn advance(state: &mut AttemptState, next: AttemptState) {
    debug_assert!(next > *state, "attempt state moved from {state:?} to {next:?}");
    trace!(from = ?*state, to = ?next, "Attempt state");
    *state = next;
}
