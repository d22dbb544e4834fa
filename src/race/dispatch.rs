/*!
 * Duplicate-Delete Dispatch
 *
 * Two blocking-pool threads delete the same identifier. Both are spawned
 * before either is awaited and meet at a barrier right before entering the
 * kernel, so nothing on our side orders the two deletes.
 */

use super::affinity::pin_current_thread;
use super::classifier::RaceErrorPair;
use crate::aio::{ErrorSlot, RequestId};
use crate::config::CorePair;
use crate::core::errors::{AttemptError, AttemptResult};
use crate::syscalls::SyscallGateway;
use futures::future::join;
use std::sync::{Arc, Barrier};
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// Delete `target` from two threads at once and collect both slots
pub async fn race_delete<G>(
    gateway: Arc<G>,
    target: RequestId,
    pin: Option<CorePair>,
) -> AttemptResult<RaceErrorPair>
where
    G: SyscallGateway + 'static,
{
    let barrier = Arc::new(Barrier::new(2));

    let racer = spawn_delete(
        Arc::clone(&gateway),
        Arc::clone(&barrier),
        target,
        pin.map(|p| p.racer),
        "racer",
    );
    let main = spawn_delete(gateway, barrier, target, pin.map(|p| p.main), "main");

    let (racer, main) = join(racer, main).await;
    let racer = racer.map_err(|e| AttemptError::RacerFailed(e.to_string()))?;
    let main = main.map_err(|e| AttemptError::RacerFailed(e.to_string()))?;

    Ok(RaceErrorPair::from_slots([racer, main]))
}

fn spawn_delete<G>(
    gateway: Arc<G>,
    barrier: Arc<Barrier>,
    target: RequestId,
    core: Option<usize>,
    role: &'static str,
) -> JoinHandle<ErrorSlot>
where
    G: SyscallGateway + 'static,
{
    tokio::task::spawn_blocking(move || {
        if let Some(core) = core {
            if !pin_current_thread(core) {
                warn!(role, core, "Could not pin delete thread");
            }
        }

        barrier.wait();
        let mut slot = [ErrorSlot::EMPTY];
        gateway.delete(&[target], &mut slot);

        trace!(role, %target, status = %slot[0].status(), "Delete returned");
        slot[0]
    })
}
