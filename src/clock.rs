//! Two free-running clock domains stepped edge by edge.
//!
//! Time is kept in integer picoseconds, so any pair of periods works,
//! including ratios that are not whole numbers (e.g. 7 ns against 3 ns).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
  Host,
  Peripheral,
}

impl fmt::Display for Domain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Domain::Host => write!(f, "host"),
      Domain::Peripheral => write!(f, "peripheral"),
    }
  }
}

/// Which domains saw a rising edge during one scheduler step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Edges {
  pub host: bool,
  pub peripheral: bool,
}

impl Edges {
  pub fn has(&self, domain: Domain) -> bool {
    match domain {
      Domain::Host => self.host,
      Domain::Peripheral => self.peripheral,
    }
  }
}

#[derive(Debug, Clone)]
pub struct ClockPair {
  host_period: u64,
  peripheral_period: u64,
  next_host: u64,
  next_peripheral: u64,
  now: u64,
  host_cycles: u64,
  peripheral_cycles: u64,
}

impl ClockPair {
  pub fn new(host_period_ps: u64, peripheral_period_ps: u64) -> Result<Self, ConfigError> {
    if host_period_ps == 0 {
      return Err(ConfigError::InvalidClockPeriod("host"));
    }
    if peripheral_period_ps == 0 {
      return Err(ConfigError::InvalidClockPeriod("peripheral"));
    }
    Ok(Self {
      host_period: host_period_ps,
      peripheral_period: peripheral_period_ps,
      next_host: host_period_ps,
      next_peripheral: peripheral_period_ps,
      now: 0,
      host_cycles: 0,
      peripheral_cycles: 0,
    })
  }

  /// Moves time to the next edge and reports which domains clock there.
  /// Coincident edges are reported together.
  pub fn advance(&mut self) -> Edges {
    let t = self.next_host.min(self.next_peripheral);
    self.now = t;

    let edges = Edges {
      host: self.next_host == t,
      peripheral: self.next_peripheral == t,
    };
    if edges.host {
      self.next_host += self.host_period;
      self.host_cycles += 1;
    }
    if edges.peripheral {
      self.next_peripheral += self.peripheral_period;
      self.peripheral_cycles += 1;
    }
    edges
  }

  /// Current simulated time in picoseconds.
  pub fn now(&self) -> u64 {
    self.now
  }

  pub fn cycles(&self, domain: Domain) -> u64 {
    match domain {
      Domain::Host => self.host_cycles,
      Domain::Peripheral => self.peripheral_cycles,
    }
  }
}
