use crate::bridge::StateCycles;
use serde::Serialize;
use std::fmt;

/// Transfer counters kept by the bridge harness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BridgeStats {
  /// Words accepted by `submit`
  pub submitted: u64,
  /// `submit` calls refused for lack of space
  pub submit_refused: u64,
  /// Words returned by `poll`
  pub polled: u64,
  /// Words strobed out to the peripheral
  pub words_written: u64,
  /// Words strobed in from the peripheral
  pub words_read: u64,
  /// Peripheral cycles in `Reading` with data waiting but the inbound queue full
  pub read_stalls: u64,
  /// Peripheral cycles where a write was possible but the bus was not writing
  pub write_wait_cycles: u64,
  pub states: StateCycles,
}

impl fmt::Display for BridgeStats {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "  host:       submitted={} refused={} polled={}",
      self.submitted, self.submit_refused, self.polled
    )?;
    writeln!(
      f,
      "  bus:        written={} read={} read_stalls={} write_wait={}",
      self.words_written, self.words_read, self.read_stalls, self.write_wait_cycles
    )?;
    write!(
      f,
      "  controller: idle={} reading={} writing={} transitions={}",
      self.states.idle, self.states.reading, self.states.writing, self.states.transitions
    )
  }
}
