use std::io;
use thiserror::Error;

/// Errors raised while building queues, bridges and simulator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  #[error("queue capacity {0} must be a power of two and at least 2")]
  InvalidCapacity(usize),

  #[error("synchronizer needs at least one stage")]
  InvalidSyncStages,

  #[error("unsupported word width {0} (expected 8, 16 or 32)")]
  InvalidWordWidth(u32),

  #[error("clock period of the {0} domain must be non-zero")]
  InvalidClockPeriod(&'static str),

  #[error("unknown app '{0}' (expected stream, loopback or timer)")]
  UnknownApp(String),

  #[error("invalid setting: {0}")]
  Invalid(String),
}

impl From<ConfigError> for io::Error {
  fn from(err: ConfigError) -> Self {
    io::Error::new(io::ErrorKind::InvalidData, err)
  }
}
