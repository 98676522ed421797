use super::{App, AppKind, AppReport};
use crate::bridge::BridgeConfig;
use crate::clock::{ClockPair, Domain, Edges};
use crate::error::ConfigError;
use crate::fifo::{dual_clock_queue, QueueReader, QueueWriter};
use crate::word::{Word, WordFormat};
use std::collections::VecDeque;

/// A free-running counter in the host domain feeds its upper bits through a
/// dual-clock queue to the faster peripheral domain. The two "LEDs", the
/// counter's top bit and the top bit of the last word received, must blink
/// together.
pub struct TimerApp {
  clocks: ClockPair,
  format: WordFormat,
  writer: QueueWriter,
  reader: QueueReader,

  timer_bits: u32,
  timer: u64,
  /// Shift that selects the top `width` bits of the timer
  shift: u32,
  fifo_buf: Word,

  /// Every word pushed, in order, for checking the far side
  in_flight: VecDeque<Word>,
  led_slow: bool,
  led_fast: bool,
  slow_toggles: u64,
  fast_toggles: u64,
  checked: u64,
  mismatches: u64,
}

impl TimerApp {
  pub fn new(config: &BridgeConfig, timer_bits: u32) -> Result<Self, ConfigError> {
    if !(1..=63).contains(&timer_bits) {
      return Err(ConfigError::Invalid(format!("timer_bits must be 1..=63, got {}", timer_bits)));
    }
    let format = config.format()?;
    let (writer, reader) = dual_clock_queue(&config.outbound_queue())?;

    Ok(Self {
      clocks: config.clocks()?,
      format,
      writer,
      reader,
      timer_bits,
      timer: 0,
      shift: timer_bits.saturating_sub(format.width()),
      fifo_buf: 0,
      in_flight: VecDeque::new(),
      led_slow: false,
      led_fast: false,
      slow_toggles: 0,
      fast_toggles: 0,
      checked: 0,
      mismatches: 0,
    })
  }

  fn payload(&self) -> Word {
    self.format.truncate((self.timer >> self.shift) as Word)
  }

  /// Timer top bit as it appears inside a payload word.
  fn payload_msb(&self, word: Word) -> bool {
    (word >> (self.timer_bits - 1 - self.shift)) & 1 == 1
  }

  fn host_cycle(&mut self) {
    if self.writer.w_rdy() {
      let word = self.payload();
      self.writer.push(word);
      self.in_flight.push_back(word);
    }
    self.timer = (self.timer + 1) & ((1 << self.timer_bits) - 1);

    let led = (self.timer >> (self.timer_bits - 1)) & 1 == 1;
    if led != self.led_slow {
      self.slow_toggles += 1;
      self.led_slow = led;
    }
    self.writer.tick();
  }

  fn fast_cycle(&mut self) {
    if let Some(word) = self.reader.pop() {
      match self.in_flight.pop_front() {
        Some(expected) if expected == word => {},
        expected => {
          log::warn!("timer: read {:#x}, expected {:?}", word, expected);
          self.mismatches += 1;
        },
      }
      self.checked += 1;
      self.fifo_buf = word;

      let led = self.payload_msb(self.fifo_buf);
      if led != self.led_fast {
        self.fast_toggles += 1;
        self.led_fast = led;
      }
    }
    self.reader.tick();
  }

  pub fn leds(&self) -> (bool, bool) {
    (self.led_slow, self.led_fast)
  }

  pub fn toggles(&self) -> (u64, u64) {
    (self.slow_toggles, self.fast_toggles)
  }
}

impl App for TimerApp {
  fn kind(&self) -> AppKind {
    AppKind::Timer
  }

  fn step(&mut self) -> Edges {
    let edges = self.clocks.advance();
    if edges.peripheral {
      self.fast_cycle();
    }
    if edges.host {
      self.host_cycle();
    }
    edges
  }

  fn host_cycles(&self) -> u64 {
    self.clocks.cycles(Domain::Host)
  }

  fn report(&self) -> AppReport {
    AppReport {
      app: self.kind().to_string(),
      host_cycles: self.clocks.cycles(Domain::Host),
      peripheral_cycles: self.clocks.cycles(Domain::Peripheral),
      words_checked: self.checked,
      mismatches: self.mismatches,
      bridge: None,
      notes: vec![format!(
        "leds:       slow_toggles={} fast_toggles={} in_flight={}",
        self.slow_toggles,
        self.fast_toggles,
        self.in_flight.len()
      )],
    }
  }
}
