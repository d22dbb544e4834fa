/*!
 * Scripted Gateway
 * Replays per-attempt delete codes for the racing pair
 */

use aio_race::core::errors::GatewayResult;
use aio_race::{AioRequest, CommandWord, ErrorSlot, Priority, RequestId, SyscallGateway, WaitMode};
use parking_lot::Mutex;

/// Codes for the first and second racing delete of attempt `n` (1-based)
pub type Script = Box<dyn Fn(u32) -> (i32, i32) + Send + Sync>;

#[derive(Debug, Default)]
pub struct Calls {
    pub submits: u32,
    pub batch_sizes: Vec<usize>,
    pub returned_ids: Vec<usize>,
    pub waits: Vec<(Vec<RequestId>, WaitMode)>,
    pub race_deletes: u32,
    pub cleanup_deletes: u32,
}

struct State {
    calls: Calls,
    next_id: i32,
    target: Option<RequestId>,
    target_hits: u32,
}

pub struct ScriptedGateway {
    target_index: usize,
    script: Script,
    state: Mutex<State>,
}

impl ScriptedGateway {
    pub fn new(target_index: usize, script: Script) -> Self {
        Self {
            target_index,
            script,
            state: Mutex::new(State {
                calls: Calls::default(),
                next_id: 0x100,
                target: None,
                target_hits: 0,
            }),
        }
    }

    pub fn inspect<F: FnOnce(&Calls) -> R, R>(&self, f: F) -> R {
        f(&self.state.lock().calls)
    }
}

impl SyscallGateway for ScriptedGateway {
    fn submit(
        &self,
        _command: CommandWord,
        batch: &[AioRequest],
        _priority: Priority,
    ) -> GatewayResult<Vec<RequestId>> {
        let mut state = self.state.lock();
        let ids: Vec<RequestId> = (0..batch.len())
            .map(|i| RequestId(state.next_id + i as i32))
            .collect();
        state.next_id += batch.len() as i32;
        state.target = ids.get(self.target_index).copied();
        state.target_hits = 0;

        state.calls.submits += 1;
        state.calls.batch_sizes.push(batch.len());
        state.calls.returned_ids.push(ids.len());
        Ok(ids)
    }

    fn wait(
        &self,
        ids: &[RequestId],
        mode: WaitMode,
        _timeout_usec: u32,
    ) -> GatewayResult<Vec<ErrorSlot>> {
        self.state.lock().calls.waits.push((ids.to_vec(), mode));
        Ok(vec![ErrorSlot::EMPTY; ids.len()])
    }

    fn delete(&self, ids: &[RequestId], slots: &mut [ErrorSlot]) {
        let mut state = self.state.lock();
        if ids.len() == 1 && Some(ids[0]) == state.target {
            let (first, second) = (self.script)(state.calls.submits);
            slots[0] = ErrorSlot(if state.target_hits == 0 { first } else { second });
            state.target_hits += 1;
            state.calls.race_deletes += 1;
        } else {
            slots.fill(ErrorSlot::EMPTY);
            state.calls.cleanup_deletes += 1;
        }
    }
}
