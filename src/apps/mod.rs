//! Demo applications built on the bridge.

mod loopback;
mod stream;
mod timer;

pub use loopback::LoopbackApp;
pub use stream::StreamApp;
pub use timer::TimerApp;

use crate::bridge::Bridge;
use crate::clock::Edges;
use crate::diag::BridgeStats;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
  /// Host streams a constant pattern out to the FT600
  Stream,
  /// FT600 echoes what it receives, host checks the round trip
  Loopback,
  /// Free-running timer crossing into a faster domain
  Timer,
}

impl FromStr for AppKind {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "stream" => Ok(AppKind::Stream),
      "loopback" => Ok(AppKind::Loopback),
      "timer" => Ok(AppKind::Timer),
      other => Err(ConfigError::UnknownApp(other.to_string())),
    }
  }
}

impl fmt::Display for AppKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AppKind::Stream => write!(f, "stream"),
      AppKind::Loopback => write!(f, "loopback"),
      AppKind::Timer => write!(f, "timer"),
    }
  }
}

pub trait App {
  fn kind(&self) -> AppKind;

  /// Advances both clock domains by one scheduler step.
  fn step(&mut self) -> Edges;

  /// Host clock cycles elapsed.
  fn host_cycles(&self) -> u64;

  /// True once the app has nothing left to do.
  fn finished(&self) -> bool {
    false
  }

  /// The bridge under test, for apps that have one.
  fn bridge(&self) -> Option<&Bridge> {
    None
  }

  fn report(&self) -> AppReport;
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppReport {
  pub app: String,
  pub host_cycles: u64,
  pub peripheral_cycles: u64,
  pub words_checked: u64,
  pub mismatches: u64,
  pub bridge: Option<BridgeStats>,
  pub notes: Vec<String>,
}

impl AppReport {
  pub fn passed(&self) -> bool {
    self.mismatches == 0
  }
}

impl fmt::Display for AppReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "app: {}", self.app)?;
    writeln!(
      f,
      "  cycles:     host={} peripheral={}",
      self.host_cycles, self.peripheral_cycles
    )?;
    writeln!(
      f,
      "  checked:    {} words, {} mismatches",
      self.words_checked, self.mismatches
    )?;
    if let Some(stats) = &self.bridge {
      writeln!(f, "{}", stats)?;
    }
    for note in &self.notes {
      writeln!(f, "  {}", note)?;
    }
    write!(f, "  result:     {}", if self.passed() { "PASS" } else { "FAIL" })
  }
}
