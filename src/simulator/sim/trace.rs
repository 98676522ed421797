use crate::bridge::{Bridge, BridgeState};
use crate::clock::Domain;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Result, Write};
use std::path::Path;

/// Pin-level snapshot taken after a peripheral clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PinSample {
  pub time_ps: u64,
  pub cycle: u64,
  pub state: BridgeState,
  pub rxf: bool,
  pub txe: bool,
  pub oe: bool,
  pub rd: bool,
  pub wr: bool,
  pub be: u8,
  /// Word driven by the controller, if any
  pub data: Option<u32>,
}

impl PinSample {
  pub fn capture(bridge: &Bridge) -> Self {
    let pins = bridge.pins();
    Self {
      time_ps: bridge.clocks().now(),
      cycle: bridge.cycles(Domain::Peripheral),
      state: bridge.state(),
      rxf: pins.rxf,
      txe: pins.txe,
      oe: pins.oe,
      rd: pins.rd,
      wr: pins.wr,
      be: pins.be,
      data: pins.data_out.get().copied(),
    }
  }
}

/// Writes one JSON object per line.
pub struct TraceWriter<W: Write> {
  out: W,
  records: u64,
}

impl TraceWriter<BufWriter<File>> {
  pub fn create(path: &Path) -> Result<Self> {
    let file = File::create(path)?;
    log::info!("tracing pins to {:?}", path);
    Ok(Self::new(BufWriter::new(file)))
  }
}

impl<W: Write> TraceWriter<W> {
  pub fn new(out: W) -> Self {
    Self { out, records: 0 }
  }

  pub fn record(&mut self, sample: &PinSample) -> Result<()> {
    serde_json::to_writer(&mut self.out, sample).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    self.out.write_all(b"\n")?;
    self.records += 1;
    Ok(())
  }

  pub fn records(&self) -> u64 {
    self.records
  }

  pub fn flush(&mut self) -> Result<()> {
    self.out.flush()
  }

  pub fn into_inner(self) -> W {
    self.out
  }
}
