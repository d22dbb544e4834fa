/*!
 * Emulated AIO Kernel
 *
 * In-process request table with the kernel's submit/wait/delete contract.
 * Requests complete on a worker thread fed through a channel; waits block on
 * a condition variable. Delete either separates its liveness check from the
 * reference release (the modeled defect) or serializes both, selectable per
 * instance. Over-releases are counted so callers can verify a double free
 * actually happened.
 */

use crate::aio::{AioRequest, CommandWord, DeleteStatus, ErrorSlot, Priority, RequestId, WaitMode};
use crate::core::errors::{GatewayError, GatewayResult};
use crate::core::limits::*;
use crate::core::types::RawFd;
use crate::syscalls::traits::SyscallGateway;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// How the emulated kernel releases a request reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Liveness check and release are separate steps; two concurrent deletes
    /// of one identifier can both pass the check
    Unsynchronized { window_spins: u32 },
    /// Check and release happen under one lock; a second delete always
    /// observes the identifier as gone
    Serialized,
}

impl Default for DeletePolicy {
    fn default() -> Self {
        Self::Unsynchronized {
            window_spins: EMULATED_RELEASE_WINDOW_SPINS,
        }
    }
}

struct Entry {
    refs: AtomicI64,
    completed: AtomicBool,
    result: AtomicI64,
}

impl Entry {
    fn new() -> Self {
        Self {
            refs: AtomicI64::new(1),
            completed: AtomicBool::new(false),
            result: AtomicI64::new(0),
        }
    }
}

struct Table {
    entries: HashMap<i32, Arc<Entry>>,
    next_id: i32,
}

struct Shared {
    table: Mutex<Table>,
    completed: Condvar,
    latency: Duration,
}

struct Job {
    entry: Arc<Entry>,
    fd: RawFd,
    nbyte: u32,
}

/// In-process AIO request table
pub struct EmulatedKernel {
    shared: Arc<Shared>,
    jobs: Option<flume::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    policy: DeletePolicy,
    serial: Mutex<()>,
    over_releases: AtomicU64,
}

impl EmulatedKernel {
    pub fn new() -> Self {
        Self::build(DeletePolicy::default(), Duration::ZERO)
    }

    pub fn with_policy(policy: DeletePolicy) -> Self {
        Self::build(policy, Duration::ZERO)
    }

    /// Each request takes `latency` to complete on the worker thread
    pub fn with_completion_latency(policy: DeletePolicy, latency: Duration) -> Self {
        Self::build(policy, latency)
    }

    fn build(policy: DeletePolicy, latency: Duration) -> Self {
        let shared = Arc::new(Shared {
            table: Mutex::new(Table {
                entries: HashMap::new(),
                next_id: 1,
            }),
            completed: Condvar::new(),
            latency,
        });

        let (tx, rx) = flume::unbounded::<Job>();
        let worker_shared = Arc::clone(&shared);
        let spawned = std::thread::Builder::new()
            .name("aio-emu-worker".into())
            .spawn(move || {
                for job in rx.iter() {
                    complete(&worker_shared, job);
                }
            });

        let (jobs, worker) = match spawned {
            Ok(handle) => (Some(tx), Some(handle)),
            Err(e) => {
                warn!(error = %e, "Could not spawn completion worker, completing inline");
                (None, None)
            }
        };

        debug!(?policy, ?latency, "Emulated AIO kernel ready");
        Self {
            shared,
            jobs,
            worker,
            policy,
            serial: Mutex::new(()),
            over_releases: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> DeletePolicy {
        self.policy
    }

    /// Deletes that released a reference which was no longer held
    pub fn over_releases(&self) -> u64 {
        self.over_releases.load(Ordering::Acquire)
    }

    /// Identifiers the table still tracks
    pub fn live_requests(&self) -> usize {
        self.shared.table.lock().entries.len()
    }

    /// Completion result of a tracked request
    pub fn completion(&self, id: RequestId) -> Option<i64> {
        let table = self.shared.table.lock();
        let entry = table.entries.get(&id.0)?;
        entry
            .completed
            .load(Ordering::Acquire)
            .then(|| entry.result.load(Ordering::Acquire))
    }

    fn dispatch(&self, job: Job) {
        match &self.jobs {
            Some(tx) => {
                if let Err(flume::SendError(job)) = tx.send(job) {
                    complete(&self.shared, job);
                }
            }
            None => complete(&self.shared, job),
        }
    }

    fn release(&self, id: RequestId) -> DeleteStatus {
        match self.policy {
            DeletePolicy::Serialized => {
                let _serial = self.serial.lock();
                self.release_reference(id, 0)
            }
            DeletePolicy::Unsynchronized { window_spins } => {
                self.release_reference(id, window_spins)
            }
        }
    }

    fn release_reference(&self, id: RequestId, window_spins: u32) -> DeleteStatus {
        let entry = self.shared.table.lock().entries.get(&id.0).cloned();
        let Some(entry) = entry else {
            return DeleteStatus::NoSuchIdentifier;
        };

        if entry.refs.load(Ordering::Acquire) <= 0 {
            return DeleteStatus::NoSuchIdentifier;
        }

        for _ in 0..window_spins {
            std::hint::spin_loop();
        }

        let prev = entry.refs.fetch_sub(1, Ordering::AcqRel);
        if prev <= 0 {
            self.over_releases.fetch_add(1, Ordering::AcqRel);
            debug!(%id, refs = prev - 1, "Reference released past zero");
        }

        if prev <= 1 {
            let mut table = self.shared.table.lock();
            if table
                .entries
                .get(&id.0)
                .is_some_and(|current| Arc::ptr_eq(current, &entry))
            {
                table.entries.remove(&id.0);
            }
        }

        DeleteStatus::Accepted
    }
}

impl Default for EmulatedKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EmulatedKernel {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn complete(shared: &Shared, job: Job) {
    if !shared.latency.is_zero() {
        std::thread::sleep(shared.latency);
    }

    let result = if job.fd < 0 {
        -i64::from(ERRNO_EBADF)
    } else {
        i64::from(job.nbyte)
    };
    job.entry.result.store(result, Ordering::Release);

    {
        let _table = shared.table.lock();
        job.entry.completed.store(true, Ordering::Release);
    }
    shared.completed.notify_all();
}

impl SyscallGateway for EmulatedKernel {
    fn submit(
        &self,
        command: CommandWord,
        batch: &[AioRequest],
        priority: Priority,
    ) -> GatewayResult<Vec<RequestId>> {
        if batch.is_empty() {
            return Err(GatewayError::EmptyBatch);
        }
        if batch.len() > MAX_BATCH_REQUESTS {
            return Err(GatewayError::BatchTooLarge {
                len: batch.len(),
                max: MAX_BATCH_REQUESTS,
            });
        }

        let malformed = command.op().is_none()
            || (batch.len() > 1 && !command.is_multi())
            || batch.iter().any(|req| !req.is_consistent());
        if malformed {
            return Err(GatewayError::Submission {
                code: kernel_error(ERRNO_EINVAL),
            });
        }

        let mut ids = Vec::with_capacity(batch.len());
        let mut jobs = Vec::with_capacity(batch.len());
        {
            let mut table = self.shared.table.lock();
            for req in batch {
                let id = table.next_id;
                table.next_id = table.next_id.wrapping_add(1).max(1);

                let entry = Arc::new(Entry::new());
                table.entries.insert(id, Arc::clone(&entry));
                ids.push(RequestId(id));
                jobs.push(Job {
                    entry,
                    fd: req.fd,
                    nbyte: req.nbyte,
                });
            }
        }

        for job in jobs {
            self.dispatch(job);
        }

        trace!(%command, ?priority, count = ids.len(), "Batch submitted");
        Ok(ids)
    }

    fn wait(
        &self,
        ids: &[RequestId],
        mode: WaitMode,
        timeout_usec: u32,
    ) -> GatewayResult<Vec<ErrorSlot>> {
        if ids.is_empty() {
            return Err(GatewayError::Wait {
                code: kernel_error(ERRNO_EINVAL),
            });
        }

        let deadline = (timeout_usec > 0)
            .then(|| Instant::now() + Duration::from_micros(u64::from(timeout_usec)));
        let mut expired = false;
        let mut table = self.shared.table.lock();

        loop {
            let mut entries = Vec::with_capacity(ids.len());
            for id in ids {
                match table.entries.get(&id.0) {
                    Some(entry) => entries.push(Arc::clone(entry)),
                    None => return Err(GatewayError::Wait { code: KERNEL_ERROR_ESRCH }),
                }
            }

            let done = entries
                .iter()
                .filter(|entry| entry.completed.load(Ordering::Acquire))
                .count();
            let satisfied = match mode {
                WaitMode::And => done == entries.len(),
                WaitMode::Or => done > 0,
            };

            if satisfied {
                return Ok(entries
                    .iter()
                    .map(|entry| {
                        if entry.completed.load(Ordering::Acquire) {
                            ErrorSlot::EMPTY
                        } else {
                            ErrorSlot(kernel_error(ERRNO_EINPROGRESS))
                        }
                    })
                    .collect());
            }

            if expired {
                return Err(GatewayError::Wait {
                    code: kernel_error(ERRNO_ETIMEDOUT),
                });
            }

            match deadline {
                None => self.shared.completed.wait(&mut table),
                Some(deadline) => {
                    expired = self
                        .shared
                        .completed
                        .wait_until(&mut table, deadline)
                        .timed_out();
                }
            }
        }
    }

    fn delete(&self, ids: &[RequestId], slots: &mut [ErrorSlot]) {
        for (id, slot) in ids.iter().zip(slots.iter_mut()) {
            *slot = ErrorSlot::from(self.release(*id));
        }
    }
}
