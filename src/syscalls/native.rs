/*!
 * Native AIO Gateway
 *
 * Raw syscalls into the target kernel's AIO interface. Only FreeBSD-family
 * targets expose it; elsewhere the gateway cannot be opened.
 */

use crate::aio::{AioRequest, CommandWord, ErrorSlot, Priority, RequestId, WaitMode};
use crate::core::errors::{GatewayError, GatewayResult};
#[cfg(target_os = "freebsd")]
use crate::core::limits::MAX_BATCH_REQUESTS;
use crate::core::limits::{kernel_error, ERRNO_ENOSYS};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Syscall numbers of the AIO entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyscallTable {
    pub submit: i32,
    pub wait: i32,
    pub delete: i32,
}

impl Default for SyscallTable {
    fn default() -> Self {
        Self {
            submit: 0x29d,
            wait: 0x297,
            delete: 0x296,
        }
    }
}

/// Kernel result cell the AIO subsystem writes on completion
#[repr(C)]
#[derive(Debug, Default)]
struct RawResult {
    return_value: i64,
    state: u32,
}

/// Gateway-owned storage that must outlive an in-flight request
struct InFlight {
    _buf: Option<Box<[u8]>>,
    result: Box<RawResult>,
}

/// Raw-syscall gateway
pub struct NativeGateway {
    table: SyscallTable,
    inflight: Mutex<HashMap<i32, InFlight>>,
}

impl NativeGateway {
    pub fn open() -> GatewayResult<Self> {
        Self::with_table(SyscallTable::default())
    }

    #[cfg(target_os = "freebsd")]
    pub fn with_table(table: SyscallTable) -> GatewayResult<Self> {
        tracing::info!(?table, "Native AIO gateway opened");
        Ok(Self {
            table,
            inflight: Mutex::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "freebsd"))]
    pub fn with_table(_table: SyscallTable) -> GatewayResult<Self> {
        Err(GatewayError::UnsupportedPlatform)
    }

    pub fn table(&self) -> SyscallTable {
        self.table
    }

    /// Completion result of a request this gateway submitted and has not
    /// released
    pub fn completion(&self, id: RequestId) -> Option<i64> {
        self.inflight
            .lock()
            .get(&id.0)
            .map(|slot| slot.result.return_value)
    }

    fn forget(&self, ids: &[RequestId], slots: &[ErrorSlot]) {
        let mut inflight = self.inflight.lock();
        for (id, slot) in ids.iter().zip(slots) {
            if slot.status().is_accepted() {
                inflight.remove(&id.0);
            }
        }
    }
}

#[cfg(target_os = "freebsd")]
mod raw {
    use super::RawResult;

    /// Request layout consumed by the submit syscall
    #[repr(C)]
    pub(super) struct RawRequest {
        pub offset: i64,
        pub nbyte: usize,
        pub buf: *mut u8,
        pub result: *mut RawResult,
        pub fd: i32,
    }

    pub(super) fn last_errno() -> i32 {
        nix::errno::Errno::last() as i32
    }
}

#[cfg(target_os = "freebsd")]
impl crate::syscalls::traits::SyscallGateway for NativeGateway {
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

        let mut storage: Vec<InFlight> = batch
            .iter()
            .map(|req| InFlight {
                _buf: req.buf.as_ref().map(|b| b.clone().into_boxed_slice()),
                result: Box::default(),
            })
            .collect();

        let mut raw_reqs: Vec<raw::RawRequest> = batch
            .iter()
            .zip(storage.iter_mut())
            .map(|(req, slot)| raw::RawRequest {
                offset: req.offset as i64,
                nbyte: req.nbyte as usize,
                buf: slot
                    ._buf
                    .as_mut()
                    .map_or(std::ptr::null_mut(), |b| b.as_mut_ptr()),
                result: &mut *slot.result as *mut RawResult,
                fd: req.fd,
            })
            .collect();
        let mut ids = vec![RequestId(0); batch.len()];

        // SAFETY: raw_reqs and ids are live for the call and sized to the
        // batch. Buffers and result cells are boxed and kept in `inflight`
        // until the kernel accepts a delete, so their addresses stay valid
        // while the kernel completes the requests asynchronously.
        let ret = unsafe {
            libc::syscall(
                self.table.submit,
                command.raw(),
                raw_reqs.as_mut_ptr(),
                raw_reqs.len() as libc::c_int,
                priority.raw(),
                ids.as_mut_ptr() as *mut i32,
            )
        };
        if ret < 0 {
            return Err(GatewayError::Submission {
                code: kernel_error(raw::last_errno()),
            });
        }

        let mut inflight = self.inflight.lock();
        for (id, slot) in ids.iter().zip(storage) {
            inflight.insert(id.0, slot);
        }
        Ok(ids)
    }

    fn wait(
        &self,
        ids: &[RequestId],
        mode: WaitMode,
        timeout_usec: u32,
    ) -> GatewayResult<Vec<ErrorSlot>> {
        let mut slots = vec![ErrorSlot::EMPTY; ids.len()];
        let mut usec = timeout_usec;
        let timeout = if timeout_usec == 0 {
            std::ptr::null_mut()
        } else {
            &mut usec as *mut u32
        };

        // SAFETY: ids and slots have equal length and are repr(transparent)
        // over i32; timeout is null or points at a live local.
        let ret = unsafe {
            libc::syscall(
                self.table.wait,
                ids.as_ptr() as *const i32,
                ids.len() as libc::c_int,
                slots.as_mut_ptr() as *mut i32,
                mode.raw(),
                timeout,
            )
        };
        if ret < 0 {
            return Err(GatewayError::Wait {
                code: kernel_error(raw::last_errno()),
            });
        }
        Ok(slots)
    }

    fn delete(&self, ids: &[RequestId], slots: &mut [ErrorSlot]) {
        let count = ids.len().min(slots.len());

        // SAFETY: both pointers cover `count` repr(transparent) i32 cells.
        let ret = unsafe {
            libc::syscall(
                self.table.delete,
                ids.as_ptr() as *const i32,
                count as libc::c_int,
                slots.as_mut_ptr() as *mut i32,
            )
        };
        if ret < 0 {
            let code = kernel_error(raw::last_errno());
            slots[..count].fill(ErrorSlot(code));
        }
        self.forget(&ids[..count], &slots[..count]);
    }
}

#[cfg(not(target_os = "freebsd"))]
impl crate::syscalls::traits::SyscallGateway for NativeGateway {
    fn submit(
        &self,
        _command: CommandWord,
        _batch: &[AioRequest],
        _priority: Priority,
    ) -> GatewayResult<Vec<RequestId>> {
        Err(GatewayError::UnsupportedPlatform)
    }

    fn wait(
        &self,
        _ids: &[RequestId],
        _mode: WaitMode,
        _timeout_usec: u32,
    ) -> GatewayResult<Vec<ErrorSlot>> {
        Err(GatewayError::UnsupportedPlatform)
    }

    fn delete(&self, ids: &[RequestId], slots: &mut [ErrorSlot]) {
        let count = ids.len().min(slots.len());
        slots[..count].fill(ErrorSlot(kernel_error(ERRNO_ENOSYS)));
        self.forget(&ids[..count], &slots[..count]);
    }
}
