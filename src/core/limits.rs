/*!
 * System Limits and Constants
 *
 * Centralized location for the kernel AIO interface constants and the
 * compiled-in defaults of the race engine.
 *
 * - Values mirroring the kernel ABI are marked with [KERNEL-ABI]
 * - Timing-sensitive values are marked with [RACE]
 */

// =============================================================================
// AIO COMMAND WORD
// =============================================================================

/// Read operation kind [KERNEL-ABI]
pub const AIO_CMD_READ: u32 = 0x001;

/// Write operation kind [KERNEL-ABI]
pub const AIO_CMD_WRITE: u32 = 0x002;

/// Operation kind occupies the low 12 bits [KERNEL-ABI]
pub const AIO_CMD_MASK: u32 = 0xfff;

/// Batch (multi-request) submission flag [KERNEL-ABI]
pub const AIO_CMD_MULTI: u32 = 0x1000;

// =============================================================================
// PRIORITIES AND WAIT MODES
// =============================================================================

/// [KERNEL-ABI]
pub const AIO_PRIORITY_LOW: u32 = 1;
/// [KERNEL-ABI]
pub const AIO_PRIORITY_MID: u32 = 2;
/// [KERNEL-ABI]
pub const AIO_PRIORITY_HIGH: u32 = 3;

/// Block until every identifier completes [KERNEL-ABI]
pub const AIO_WAIT_AND: u32 = 0x01;

/// Block until at least one identifier completes [KERNEL-ABI]
pub const AIO_WAIT_OR: u32 = 0x02;

// =============================================================================
// BATCH LIMITS
// =============================================================================

/// Maximum requests accepted by a single submit call [KERNEL-ABI]
pub const MAX_BATCH_REQUESTS: usize = 0x80;

/// Placeholder descriptor handle: the kernel schedules it but performs no I/O
pub const PLACEHOLDER_FD: i32 = -1;

// =============================================================================
// ENGINE DEFAULTS
// =============================================================================

/// Race attempts before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Requests per submitted batch
pub const DEFAULT_REQUEST_COUNT: usize = 3;

/// Batch index whose identifier is deleted twice
pub const DEFAULT_TARGET_INDEX: usize = 0;

/// Wait timeout in microseconds, 0 blocks indefinitely
pub const DEFAULT_WAIT_TIMEOUT_USEC: u32 = 0;

/// Spin iterations between the emulated kernel's liveness check and its
/// reference release [RACE]
pub const EMULATED_RELEASE_WINDOW_SPINS: u32 = 256;

// =============================================================================
// KERNEL ERROR CODES
// =============================================================================

/// Base of the kernel's packed error space; low bits carry the errno [KERNEL-ABI]
pub const KERNEL_ERROR_BASE: u32 = 0x8002_0000;

/// errno values, FreeBSD numbering [KERNEL-ABI]
pub const ERRNO_ESRCH: i32 = 3;
pub const ERRNO_EBADF: i32 = 9;
pub const ERRNO_EINVAL: i32 = 22;
pub const ERRNO_ENOSYS: i32 = 78;
pub const ERRNO_EINPROGRESS: i32 = 36;
pub const ERRNO_ETIMEDOUT: i32 = 60;

/// Pack an errno into the kernel's error space
#[inline]
pub const fn kernel_error(errno: i32) -> i32 {
    (KERNEL_ERROR_BASE | (errno as u32 & 0xffff)) as i32
}

/// "No such request": reported when deleting an identifier the kernel no longer tracks
pub const KERNEL_ERROR_ESRCH: i32 = kernel_error(ERRNO_ESRCH);
