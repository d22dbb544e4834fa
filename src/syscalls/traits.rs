/*!
 * Syscall Traits
 * Kernel AIO boundary abstraction
 */

use crate::aio::{AioRequest, CommandWord, ErrorSlot, Priority, RequestId, WaitMode};
use crate::core::errors::GatewayResult;

/// Kernel AIO operations used by the race engine
///
/// Implementations must be callable from several threads at once: the two
/// racing deletes enter `delete` concurrently with the same identifier.
#[cfg_attr(test, mockall::automock)]
pub trait SyscallGateway: Send + Sync {
    /// Submit `batch` under `command` at `priority`, returning one identifier
    /// per request in batch order
    fn submit(
        &self,
        command: CommandWord,
        batch: &[AioRequest],
        priority: Priority,
    ) -> GatewayResult<Vec<RequestId>>;

    /// Block until `mode` is satisfied for `ids`; `timeout_usec == 0` blocks
    /// indefinitely. Returns one slot per identifier.
    fn wait(
        &self,
        ids: &[RequestId],
        mode: WaitMode,
        timeout_usec: u32,
    ) -> GatewayResult<Vec<ErrorSlot>>;

    /// Release `ids`, writing one slot per identifier
    ///
    /// Never fails: an identifier that is already gone is reported through
    /// its slot, which is exactly what the race observes.
    fn delete(&self, ids: &[RequestId], slots: &mut [ErrorSlot]);
}
