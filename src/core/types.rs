/*!
 * Core Types
 * Common types used across the engine
 */

use serde::Serialize;
use std::fmt;

/// File descriptor as seen by the kernel AIO interface (-1 = unset)
pub type RawFd = i32;

/// Attempt index, 1-based
pub type AttemptIndex = u32;

/// Opaque kernel-assigned AIO request identifier
///
/// Unique only until the kernel accepts a delete for it. Layout matches the
/// kernel's submit id so slices can be handed to the syscall boundary as-is.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RequestId(pub i32);

impl RequestId {
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<i32> for RequestId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}
