/*!
 * AIO Command Word
 * Operation kind, multiplicity flag, priority and wait mode
 */

use crate::core::limits::*;
use serde::Serialize;
use std::fmt;

/// Operation kind carried in the low bits of a command word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AioOp {
    Read,
    Write,
}

impl AioOp {
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Read => AIO_CMD_READ,
            Self::Write => AIO_CMD_WRITE,
        }
    }

    /// Decode an operation kind, ignoring any bits outside the operation mask
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits & AIO_CMD_MASK {
            AIO_CMD_READ => Some(Self::Read),
            AIO_CMD_WRITE => Some(Self::Write),
            _ => None,
        }
    }
}

/// Command word: operation kind OR multiplicity flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommandWord(u32);

impl CommandWord {
    pub const fn new(op: AioOp, multi: bool) -> Self {
        let flag = if multi { AIO_CMD_MULTI } else { 0 };
        Self(op.bits() | flag)
    }

    /// WRITE | MULTI, the command every race batch is submitted with
    pub const fn write_multi() -> Self {
        Self::new(AioOp::Write, true)
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Operation kind, recovered by masking
    #[inline]
    pub const fn op(self) -> Option<AioOp> {
        AioOp::from_bits(self.0)
    }

    #[inline]
    pub const fn is_multi(self) -> bool {
        self.0 & AIO_CMD_MULTI != 0
    }
}

impl Default for CommandWord {
    fn default() -> Self {
        Self::write_multi()
    }
}

impl From<CommandWord> for u32 {
    fn from(cmd: CommandWord) -> Self {
        cmd.0
    }
}

impl fmt::Display for CommandWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Kernel scheduling priority for submitted requests
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low = AIO_PRIORITY_LOW,
    Mid = AIO_PRIORITY_MID,
    /// Keeps scheduler jitter out of the race window
    #[default]
    High = AIO_PRIORITY_HIGH,
}

impl Priority {
    #[inline]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Completion condition for a multi-wait
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitMode {
    /// Every identifier has completed
    #[default]
    And = AIO_WAIT_AND,
    /// At least one identifier has completed
    Or = AIO_WAIT_OR,
}

impl WaitMode {
    #[inline]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}
