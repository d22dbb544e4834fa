/*!
 * AIO Request Descriptor
 */

use crate::core::limits::PLACEHOLDER_FD;
use crate::core::types::RawFd;

/// One I/O operation handed to the kernel in a submission batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AioRequest {
    pub fd: RawFd,
    pub offset: u64,
    pub nbyte: u32,
    pub buf: Option<Vec<u8>>,
    /// Written only by the gateway that observed completion
    pub result: Option<i64>,
}

impl AioRequest {
    /// Schedulable request that performs no I/O
    pub const fn placeholder() -> Self {
        Self {
            fd: PLACEHOLDER_FD,
            offset: 0,
            nbyte: 0,
            buf: None,
            result: None,
        }
    }

    /// Request transferring the whole of `buf`
    pub fn with_buffer(fd: RawFd, offset: u64, buf: Vec<u8>) -> Self {
        let nbyte = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        Self {
            fd,
            offset,
            nbyte,
            buf: Some(buf),
            result: None,
        }
    }

    /// `nbyte` never exceeds the attached buffer
    pub fn is_consistent(&self) -> bool {
        match &self.buf {
            Some(buf) => self.nbyte as usize <= buf.len(),
            None => self.nbyte == 0,
        }
    }

    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.fd == PLACEHOLDER_FD
    }
}

impl Default for AioRequest {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Fresh batch of `count` placeholder requests
pub fn placeholder_batch(count: usize) -> Vec<AioRequest> {
    (0..count).map(|_| AioRequest::placeholder()).collect()
}
