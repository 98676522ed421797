//! Behavioural model of the FT600 chip as seen from its FIFO pins.
//!
//! The USB side is reduced to two buffers: words the USB host sent that
//! wait for a bus read, and words the bus wrote that wait for the USB host.

use crate::bridge::{FtPins, Peripheral};
use crate::word::{Word, WordFormat};
use std::collections::VecDeque;

pub struct Ft600Model {
  format: WordFormat,
  /// USB host -> bus, drives `rxf`
  rx: VecDeque<Word>,
  /// bus -> USB host, bounded, drives `txe`
  tx: VecDeque<Word>,
  tx_depth: usize,
  tx_paused: bool,
  loopback: bool,
  words_received: u64,
  words_sent: u64,
}

impl Ft600Model {
  pub fn new(format: WordFormat, tx_depth: usize) -> Self {
    Self {
      format,
      rx: VecDeque::new(),
      tx: VecDeque::new(),
      tx_depth: tx_depth.max(1),
      tx_paused: false,
      loopback: false,
      words_received: 0,
      words_sent: 0,
    }
  }

  /// Echo every word written by the bus back into the receive buffer.
  pub fn with_loopback(mut self, loopback: bool) -> Self {
    self.loopback = loopback;
    self
  }

  /// Words the USB host sends toward the bus.
  pub fn queue_rx<I: IntoIterator<Item = Word>>(&mut self, words: I) {
    let format = self.format;
    self.rx.extend(words.into_iter().map(|w| format.truncate(w)));
  }

  /// The USB host collects everything written so far.
  pub fn drain_tx(&mut self) -> Vec<Word> {
    self.tx.drain(..).collect()
  }

  /// Holds `txe` low, as when the USB host stops reading.
  pub fn set_tx_paused(&mut self, paused: bool) {
    self.tx_paused = paused;
  }

  pub fn rx_len(&self) -> usize {
    self.rx.len()
  }

  pub fn tx_len(&self) -> usize {
    self.tx.len()
  }

  /// Words taken off the bus by `wr` strobes.
  pub fn words_received(&self) -> u64 {
    self.words_received
  }

  /// Words handed to the bus on `rd` strobes.
  pub fn words_sent(&self) -> u64 {
    self.words_sent
  }
}

impl Peripheral for Ft600Model {
  fn drive(&mut self, pins: &mut FtPins) {
    pins.rxf = !self.rx.is_empty();
    pins.txe = !self.tx_paused && self.tx.len() < self.tx_depth;
    if let Some(&word) = self.rx.front() {
      pins.data_in = word;
    }
  }

  fn sample(&mut self, pins: &FtPins) {
    if pins.read_word().is_some() {
      self.rx.pop_front();
      self.words_sent += 1;
    }
    if let Some(word) = pins.written_word() {
      self.words_received += 1;
      if self.loopback {
        self.rx.push_back(word);
      } else {
        self.tx.push_back(word);
      }
    }
  }
}
