use crate::clock::{ClockPair, Domain};
use crate::error::ConfigError;
use crate::fifo::{QueueConfig, DEFAULT_SYNC_STAGES};
use crate::word::WordFormat;
use serde::{Deserialize, Serialize};

/// Construction-time parameters of a bridge. Nothing here changes at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
  /// Data bus width in bits (8, 16 or 32)
  pub word_width: u32,
  /// Host -> peripheral queue depth
  pub outbound_depth: usize,
  /// Peripheral -> host queue depth
  pub inbound_depth: usize,
  pub sync_stages: usize,
  pub host_period_ps: u64,
  pub peripheral_period_ps: u64,
}

impl Default for BridgeConfig {
  fn default() -> Self {
    Self {
      word_width: 16,
      outbound_depth: 1024,
      inbound_depth: 1024,
      sync_stages: DEFAULT_SYNC_STAGES,
      // 25 MHz host logic, 100 MHz FT600 clock
      host_period_ps: 40_000,
      peripheral_period_ps: 10_000,
    }
  }
}

impl BridgeConfig {
  pub fn format(&self) -> Result<WordFormat, ConfigError> {
    WordFormat::new(self.word_width)
  }

  pub fn outbound_queue(&self) -> QueueConfig {
    QueueConfig::new(self.outbound_depth, Domain::Host, Domain::Peripheral).with_sync_stages(self.sync_stages)
  }

  pub fn inbound_queue(&self) -> QueueConfig {
    QueueConfig::new(self.inbound_depth, Domain::Peripheral, Domain::Host).with_sync_stages(self.sync_stages)
  }

  pub fn clocks(&self) -> Result<ClockPair, ConfigError> {
    ClockPair::new(self.host_period_ps, self.peripheral_period_ps)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    self.format()?;
    self.outbound_queue().validate()?;
    self.inbound_queue().validate()?;
    self.clocks()?;
    Ok(())
  }
}
