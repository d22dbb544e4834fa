/*!
 * Delete Outcomes
 * Error slots written by the kernel's delete operation and their typed view
 */

use crate::core::limits::KERNEL_ERROR_ESRCH;
use serde::Serialize;
use std::fmt;

/// Raw per-identifier result cell, 0 = accepted
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ErrorSlot(pub i32);

impl ErrorSlot {
    pub const EMPTY: Self = Self(0);

    #[inline]
    pub const fn code(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn status(self) -> DeleteStatus {
        DeleteStatus::from_code(self.0)
    }
}

/// What the kernel reported for one delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum DeleteStatus {
    /// Reference released
    Accepted,
    /// The kernel no longer tracks the identifier
    NoSuchIdentifier,
    /// Any other kernel error code
    KernelError(i32),
}

impl DeleteStatus {
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Accepted,
            KERNEL_ERROR_ESRCH => Self::NoSuchIdentifier,
            other => Self::KernelError(other),
        }
    }

    pub const fn code(self) -> i32 {
        match self {
            Self::Accepted => 0,
            Self::NoSuchIdentifier => KERNEL_ERROR_ESRCH,
            Self::KernelError(code) => code,
        }
    }

    #[inline]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl From<ErrorSlot> for DeleteStatus {
    fn from(slot: ErrorSlot) -> Self {
        slot.status()
    }
}

impl From<DeleteStatus> for ErrorSlot {
    fn from(status: DeleteStatus) -> Self {
        Self(status.code())
    }
}

impl fmt::Display for DeleteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::NoSuchIdentifier => f.write_str("no such identifier"),
            Self::KernelError(code) => write!(f, "kernel error {code:#x}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::limits::{kernel_error, ERRNO_EINVAL};

    #[test]
    fn test_status_from_code() {
        assert_eq!(DeleteStatus::from_code(0), DeleteStatus::Accepted);
        assert_eq!(
            DeleteStatus::from_code(0x8002_0003u32 as i32),
            DeleteStatus::NoSuchIdentifier
        );
        let einval = kernel_error(ERRNO_EINVAL);
        assert_eq!(DeleteStatus::from_code(einval), DeleteStatus::KernelError(einval));
    }

    #[test]
    fn test_slot_status_preserves_code() {
        for code in [0, KERNEL_ERROR_ESRCH, -1, 42] {
            assert_eq!(ErrorSlot::from(ErrorSlot(code).status()).code(), code);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(DeleteStatus::NoSuchIdentifier.to_string(), "no such identifier");
        assert_eq!(DeleteStatus::KernelError(0x16).to_string(), "kernel error 0x16");
    }
}
