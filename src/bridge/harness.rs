use super::config::BridgeConfig;
use super::fsm::{BridgeController, BridgeState, ControlInputs};
use super::pins::FtPins;
use crate::builtin::Module;
use crate::clock::{ClockPair, Domain, Edges};
use crate::diag::BridgeStats;
use crate::error::ConfigError;
use crate::fifo::{dual_clock_queue, QueueReader, QueueWriter};
use crate::word::{Word, WordFormat};

/// Something on the far side of the FT600 pins, clocked by the peripheral
/// domain.
pub trait Peripheral {
  /// Drives `rxf`, `txe` and `data_in` before the controller evaluates.
  fn drive(&mut self, pins: &mut FtPins);
  /// Samples the controller's strobes after it evaluated.
  fn sample(&mut self, pins: &FtPins);
}

/// Bridge harness: the controller plus one queue per direction.
///
/// ```text
///  host domain                         peripheral domain
///  submit() -> [outbound queue] -> controller -> FT600 pins
///  poll()   <- [inbound queue]  <-     "      <-     "
/// ```
pub struct Bridge {
  format: WordFormat,
  clocks: ClockPair,
  controller: BridgeController,
  pins: FtPins,

  // host side
  outbound_tx: QueueWriter,
  inbound_rx: QueueReader,

  // peripheral side
  outbound_rx: QueueReader,
  inbound_tx: QueueWriter,

  stats: BridgeStats,
}

impl Bridge {
  pub fn new(config: &BridgeConfig) -> Result<Self, ConfigError> {
    config.validate()?;

    let (outbound_tx, outbound_rx) = dual_clock_queue(&config.outbound_queue())?;
    let (inbound_tx, inbound_rx) = dual_clock_queue(&config.inbound_queue())?;

    log::info!(
      "bridge: {}-bit bus, outbound={} inbound={} host={}ps peripheral={}ps",
      config.word_width,
      config.outbound_depth,
      config.inbound_depth,
      config.host_period_ps,
      config.peripheral_period_ps
    );

    Ok(Self {
      format: config.format()?,
      clocks: config.clocks()?,
      controller: BridgeController::new("ft600"),
      pins: FtPins::default(),
      outbound_tx,
      inbound_rx,
      outbound_rx,
      inbound_tx,
      stats: BridgeStats::default(),
    })
  }

  /// Host side: offers a word to the outbound queue. Returns `false`, and
  /// changes nothing, when the queue reports no space.
  pub fn submit(&mut self, word: Word) -> bool {
    let accepted = self.outbound_tx.push(self.format.truncate(word));
    if accepted {
      self.stats.submitted += 1;
    } else {
      self.stats.submit_refused += 1;
    }
    accepted
  }

  /// Host side: takes the next inbound word if one is visible.
  pub fn poll(&mut self) -> Option<Word> {
    let word = self.inbound_rx.pop();
    if word.is_some() {
      self.stats.polled += 1;
    }
    word
  }

  /// Steps to the next clock edge and clocks every domain that has one,
  /// with the pins left as the caller set them.
  pub fn advance(&mut self) -> Edges {
    let edges = self.clocks.advance();
    if edges.peripheral {
      self.tick_peripheral();
    }
    if edges.host {
      self.tick_host();
    }
    edges
  }

  /// Like [`Bridge::advance`], with `device` driving and sampling the pins
  /// around each peripheral edge.
  pub fn advance_with<P: Peripheral>(&mut self, device: &mut P) -> Edges {
    let edges = self.clocks.advance();
    if edges.peripheral {
      device.drive(&mut self.pins);
      self.tick_peripheral();
      device.sample(&self.pins);
    }
    if edges.host {
      self.tick_host();
    }
    edges
  }

  /// Advances until the next peripheral edge has been processed.
  pub fn advance_peripheral_cycle(&mut self) -> Edges {
    loop {
      let edges = self.advance();
      if edges.peripheral {
        return edges;
      }
    }
  }

  /// One host clock edge.
  pub fn tick_host(&mut self) {
    self.outbound_tx.tick();
    self.inbound_rx.tick();
  }

  /// One peripheral clock edge: evaluate the controller on the current pins
  /// and queue status, apply its strobes, then clock the queue ends.
  pub fn tick_peripheral(&mut self) {
    let inputs = ControlInputs {
      rxf: self.pins.rxf,
      txe: self.pins.txe,
      outbound_has_data: self.outbound_rx.r_rdy(),
      inbound_has_space: self.inbound_tx.w_rdy(),
    };
    let state = self.controller.state();

    self.controller.inputs.set(inputs);
    self.controller.run();
    let strobes = self.controller.strobes.value;

    self.pins.oe = strobes.oe;
    self.pins.rd = strobes.rd;
    self.pins.wr = strobes.wr;
    self.pins.be = if strobes.be_all { self.format.all_lanes() } else { 0 };
    if strobes.drive {
      let word = self.outbound_rx.peek().unwrap_or(self.pins.data_out.value);
      self.pins.data_out.set(word);
    } else {
      self.pins.data_out.clear();
    }

    if strobes.outbound_ready && inputs.outbound_has_data {
      self.outbound_rx.pop();
      self.stats.words_written += 1;
    }
    if strobes.inbound_valid {
      let word = self.format.truncate(self.pins.data_in);
      if self.inbound_tx.push(word) {
        self.stats.words_read += 1;
      }
    }

    if state == BridgeState::Reading && inputs.rxf && !inputs.inbound_has_space {
      self.stats.read_stalls += 1;
    }
    // the Idle -> Writing turnaround is not a wait
    let next = self.controller.state();
    if state != BridgeState::Writing && next != BridgeState::Writing && inputs.txe && inputs.outbound_has_data {
      self.stats.write_wait_cycles += 1;
    }

    self.outbound_rx.tick();
    self.inbound_tx.tick();
  }

  /// Returns the controller to `Idle` and releases the bus. Queued words
  /// are kept.
  pub fn reset(&mut self) {
    self.controller.reset();
    self.pins = FtPins::default();
  }

  pub fn pins(&self) -> &FtPins {
    &self.pins
  }

  pub fn pins_mut(&mut self) -> &mut FtPins {
    &mut self.pins
  }

  pub fn state(&self) -> BridgeState {
    self.controller.state()
  }

  pub fn format(&self) -> WordFormat {
    self.format
  }

  pub fn clocks(&self) -> &ClockPair {
    &self.clocks
  }

  pub fn cycles(&self, domain: Domain) -> u64 {
    self.clocks.cycles(domain)
  }

  /// Outbound fill level seen from the host.
  pub fn outbound_level(&self) -> usize {
    self.outbound_tx.w_level()
  }

  pub fn outbound_has_space(&self) -> bool {
    self.outbound_tx.w_rdy()
  }

  /// Inbound fill level seen from the host.
  pub fn inbound_level(&self) -> usize {
    self.inbound_rx.r_level()
  }

  pub fn outbound_capacity(&self) -> usize {
    self.outbound_tx.capacity()
  }

  pub fn inbound_capacity(&self) -> usize {
    self.inbound_rx.capacity()
  }

  pub fn stats(&self) -> BridgeStats {
    BridgeStats {
      states: self.controller.cycles(),
      ..self.stats
    }
  }
}
