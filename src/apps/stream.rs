use super::{App, AppKind, AppReport};
use crate::bridge::{Bridge, BridgeConfig};
use crate::clock::{Domain, Edges};
use crate::device::Ft600Model;
use crate::diag::{ActivityCounter, LevelIndicator};
use crate::error::ConfigError;
use crate::word::Word;

/// The host writes a fixed pattern into the outbound queue on every host
/// cycle with space, and the FT600 model checks what comes out of the bus.
///
/// The USB side can attach late, so the queue fills up and the level
/// indicator lights before the stream starts draining.
pub struct StreamApp {
  bridge: Bridge,
  device: Ft600Model,
  pattern: Word,
  attach_at: u64,
  level: LevelIndicator,
  heartbeat: ActivityCounter,
  received: u64,
  mismatches: u64,
}

impl StreamApp {
  pub const PATTERN: Word = 0xABCD;

  pub fn new(
    config: &BridgeConfig,
    tx_depth: usize,
    level_threshold: usize,
    attach_at: u64,
  ) -> Result<Self, ConfigError> {
    let bridge = Bridge::new(config)?;
    let mut device = Ft600Model::new(bridge.format(), tx_depth);
    device.set_tx_paused(attach_at > 0);

    Ok(Self {
      pattern: bridge.format().truncate(Self::PATTERN),
      bridge,
      device,
      attach_at,
      level: LevelIndicator::new(level_threshold),
      heartbeat: ActivityCounter::new(10),
      received: 0,
      mismatches: 0,
    })
  }

  pub fn level_indicator(&self) -> &LevelIndicator {
    &self.level
  }

  pub fn heartbeat(&self) -> &ActivityCounter {
    &self.heartbeat
  }

  pub fn received(&self) -> u64 {
    self.received
  }
}

impl App for StreamApp {
  fn kind(&self) -> AppKind {
    AppKind::Stream
  }

  fn step(&mut self) -> Edges {
    let edges = self.bridge.advance_with(&mut self.device);

    if edges.peripheral {
      for word in self.device.drain_tx() {
        self.received += 1;
        if word != self.pattern {
          log::warn!("stream: got {:#06x}, expected {:#06x}", word, self.pattern);
          self.mismatches += 1;
        }
      }
    }

    if edges.host {
      if self.host_cycles() == self.attach_at && self.attach_at > 0 {
        log::info!("stream: USB host attached at host cycle {}", self.attach_at);
        self.device.set_tx_paused(false);
      }

      let space = self.bridge.outbound_has_space();
      self.heartbeat.tick(space);
      if space {
        self.bridge.submit(self.pattern);
      }
      self.level.update(self.bridge.outbound_level());
    }

    edges
  }

  fn host_cycles(&self) -> u64 {
    self.bridge.cycles(Domain::Host)
  }

  fn bridge(&self) -> Option<&Bridge> {
    Some(&self.bridge)
  }

  fn report(&self) -> AppReport {
    AppReport {
      app: self.kind().to_string(),
      host_cycles: self.bridge.cycles(Domain::Host),
      peripheral_cycles: self.bridge.cycles(Domain::Peripheral),
      words_checked: self.received,
      mismatches: self.mismatches,
      bridge: Some(self.bridge.stats()),
      notes: vec![
        format!(
          "level led:  threshold={} lit_cycles={} rising={}",
          self.level.threshold(),
          self.level.lit_cycles(),
          self.level.rising_edges()
        ),
        format!("heartbeat:  toggles={}", self.heartbeat.toggles()),
      ],
    }
  }
}
