use super::{App, AppKind, AppReport};
use crate::bridge::{Bridge, BridgeConfig};
use crate::clock::{Domain, Edges};
use crate::device::Ft600Model;
use crate::error::ConfigError;
use crate::word::Word;

/// Round trip through both queues: the host submits a ramp, the FT600 model
/// echoes each word it receives, and the host polls the ramp back.
pub struct LoopbackApp {
  bridge: Bridge,
  device: Ft600Model,
  total: u64,
  next_out: Word,
  next_expected: Word,
  sent: u64,
  checked: u64,
  mismatches: u64,
}

impl LoopbackApp {
  pub fn new(config: &BridgeConfig, total: u64) -> Result<Self, ConfigError> {
    let bridge = Bridge::new(config)?;
    let device = Ft600Model::new(bridge.format(), 1).with_loopback(true);
    Ok(Self {
      bridge,
      device,
      total,
      next_out: 0,
      next_expected: 0,
      sent: 0,
      checked: 0,
      mismatches: 0,
    })
  }

  fn host_cycle(&mut self) {
    let format = self.bridge.format();

    if self.sent < self.total && self.bridge.submit(self.next_out) {
      self.next_out = format.truncate(self.next_out.wrapping_add(1));
      self.sent += 1;
    }

    if let Some(word) = self.bridge.poll() {
      if word != self.next_expected {
        log::warn!(
          "loopback: word {} is {:#x}, expected {:#x}",
          self.checked,
          word,
          self.next_expected
        );
        self.mismatches += 1;
      }
      self.next_expected = format.truncate(word.wrapping_add(1));
      self.checked += 1;
    }
  }
}

impl App for LoopbackApp {
  fn kind(&self) -> AppKind {
    AppKind::Loopback
  }

  fn step(&mut self) -> Edges {
    let edges = self.bridge.advance_with(&mut self.device);
    if edges.host {
      self.host_cycle();
    }
    edges
  }

  fn host_cycles(&self) -> u64 {
    self.bridge.cycles(Domain::Host)
  }

  fn finished(&self) -> bool {
    self.checked >= self.total
  }

  fn bridge(&self) -> Option<&Bridge> {
    Some(&self.bridge)
  }

  fn report(&self) -> AppReport {
    let mut notes = vec![format!("sent:       {} of {}", self.sent, self.total)];
    if !self.finished() {
      notes.push(format!("pending:    {} words not back yet", self.total - self.checked));
    }
    AppReport {
      app: self.kind().to_string(),
      host_cycles: self.bridge.cycles(Domain::Host),
      peripheral_cycles: self.bridge.cycles(Domain::Peripheral),
      words_checked: self.checked,
      mismatches: self.mismatches,
      bridge: Some(self.bridge.stats()),
      notes,
    }
  }
}
