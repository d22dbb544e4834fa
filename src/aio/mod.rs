/*!
 * AIO Data Model
 * Request descriptors, command words and delete outcomes exchanged with the kernel
 */

mod command;
mod request;
mod status;

pub use command::{AioOp, CommandWord, Priority, WaitMode};
pub use request::{placeholder_batch, AioRequest};
pub use status::{DeleteStatus, ErrorSlot};

pub use crate::core::types::RequestId;
