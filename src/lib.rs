/*!
 * AIO Race Engine Library
 * Duplicate-delete race against the kernel AIO request table
 */

pub mod aio;
pub mod config;
pub mod core;
pub mod monitoring;
pub mod race;
pub mod syscalls;

// Re-exports
pub use crate::aio::{
    AioOp, AioRequest, CommandWord, DeleteStatus, ErrorSlot, Priority, RequestId, WaitMode,
};
pub use crate::config::{Backend, CorePair, RaceConfig};
pub use crate::core::errors::{AttemptError, ConfigError, GatewayError};
pub use crate::monitoring::{init_tracing, RaceReport};
pub use crate::race::{
    classify, DriverOutcome, RaceCoordinator, RaceErrorPair, RetryDriver, Verdict,
};
pub use crate::syscalls::{DeletePolicy, EmulatedKernel, NativeGateway, SyscallGateway};

use std::sync::Arc;

/// Validate `config`, then run the retry loop against `gateway`
pub async fn run_race<G>(
    gateway: Arc<G>,
    config: RaceConfig,
) -> Result<RaceReport, ConfigError>
where
    G: SyscallGateway + 'static,
{
    let coordinator = RaceCoordinator::new(gateway, config)?;
    Ok(RetryDriver::new(coordinator).run().await)
}
