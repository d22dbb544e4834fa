/*!
 * Syscall Gateway
 *
 * The only points of contact with the kernel AIO interface: submit a batch,
 * wait on identifiers, delete identifiers. Two backends:
 * - `NativeGateway`: raw syscalls on the target kernel
 * - `EmulatedKernel`: in-process AIO table for off-target runs and tests
 */

mod emulated;
mod native;
pub mod traits;

pub use emulated::{DeletePolicy, EmulatedKernel};
pub use native::{NativeGateway, SyscallTable};
pub use traits::SyscallGateway;

#[cfg(test)]
pub use traits::MockSyscallGateway;
