/*!
 * Race Engine Configuration
 *
 * Compiled-in defaults, optionally overridden from the environment:
 * - AIO_RACE_MAX_ATTEMPTS: retry bound
 * - AIO_RACE_REQUEST_COUNT: requests per submitted batch
 * - AIO_RACE_TARGET_INDEX: batch index raced
 * - AIO_RACE_BACKEND: `native` or `emulated`
 * - AIO_RACE_PIN_CORES: `racer,main` CPU indices
 */

use crate::aio::{CommandWord, Priority, WaitMode};
use crate::core::errors::{ConfigError, ConfigResult};
use crate::core::limits::*;
use serde::Serialize;
use std::str::FromStr;

/// Kernel boundary implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Raw syscalls on the target kernel
    #[default]
    Native,
    /// In-process AIO table
    Emulated,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "emulated" | "emulator" => Ok(Self::Emulated),
            _ => Err(ConfigError::InvalidValue {
                key: "AIO_RACE_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

/// CPU indices the racer and main deletes are pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorePair {
    pub racer: usize,
    pub main: usize,
}

impl FromStr for CorePair {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue {
            key: "AIO_RACE_PIN_CORES",
            value: s.to_string(),
        };
        let (racer, main) = s.split_once(',').ok_or_else(invalid)?;
        Ok(Self {
            racer: racer.trim().parse().map_err(|_| invalid())?,
            main: main.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// Immutable engine parameters, passed explicitly to the coordinator and driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaceConfig {
    /// Caps the retry loop
    pub max_attempts: u32,
    /// Size of each submission batch
    pub request_count: usize,
    /// Which request in the batch is raced
    pub target_index: usize,
    pub command: CommandWord,
    pub priority: Priority,
    pub wait_mode: WaitMode,
    /// 0 blocks indefinitely
    pub wait_timeout_usec: u32,
    pub pin_cores: Option<CorePair>,
    /// Release non-target identifiers after a classified or failed race
    ///
    /// An attempt that fails before the race (short id list, wait error,
    /// unavailable target) always releases its batch, whatever this says.
    pub cleanup: bool,
    pub backend: Backend,
}

impl RaceConfig {
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            request_count: DEFAULT_REQUEST_COUNT,
            target_index: DEFAULT_TARGET_INDEX,
            command: CommandWord::write_multi(),
            priority: Priority::High,
            wait_mode: WaitMode::And,
            wait_timeout_usec: DEFAULT_WAIT_TIMEOUT_USEC,
            pin_cores: None,
            cleanup: true,
            backend: Backend::default(),
        }
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> ConfigResult<Self> {
        Self::new().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("AIO_RACE_MAX_ATTEMPTS") {
            self.max_attempts = parse_value("AIO_RACE_MAX_ATTEMPTS", &v)?;
        }
        if let Some(v) = lookup("AIO_RACE_REQUEST_COUNT") {
            self.request_count = parse_value("AIO_RACE_REQUEST_COUNT", &v)?;
        }
        if let Some(v) = lookup("AIO_RACE_TARGET_INDEX") {
            self.target_index = parse_value("AIO_RACE_TARGET_INDEX", &v)?;
        }
        if let Some(v) = lookup("AIO_RACE_BACKEND") {
            self.backend = v.parse()?;
        }
        if let Some(v) = lookup("AIO_RACE_PIN_CORES") {
            self.pin_cores = Some(v.parse()?);
        }
        Ok(self)
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_request_count(mut self, request_count: usize) -> Self {
        self.request_count = request_count;
        self
    }

    pub fn with_target_index(mut self, target_index: usize) -> Self {
        self.target_index = target_index;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_wait_timeout(mut self, timeout_usec: u32) -> Self {
        self.wait_timeout_usec = timeout_usec;
        self
    }

    pub fn with_pin_cores(mut self, racer: usize, main: usize) -> Self {
        self.pin_cores = Some(CorePair { racer, main });
        self
    }

    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.request_count == 0 || self.request_count > MAX_BATCH_REQUESTS {
            return Err(ConfigError::RequestCount {
                count: self.request_count,
                max: MAX_BATCH_REQUESTS,
            });
        }
        if self.target_index >= self.request_count {
            return Err(ConfigError::TargetOutOfRange {
                index: self.target_index,
                count: self.request_count,
            });
        }
        Ok(())
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
