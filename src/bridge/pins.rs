use crate::builtin::Wire;
use crate::word::Word;

/// Peripheral-facing signals of an FT600-style FIFO interface.
///
/// All strobes are modelled active-high; the board inverts them.
#[derive(Debug, Clone, Default)]
pub struct FtPins {
  // driven by the peripheral
  /// Peripheral holds data for us
  pub rxf: bool,
  /// Peripheral can accept a word
  pub txe: bool,
  pub data_in: Word,

  // driven by the controller
  /// Output enable: the peripheral drives the data lines
  pub oe: bool,
  pub rd: bool,
  pub wr: bool,
  pub be: u8,
  /// Valid while the controller drives the data lines.
  pub data_out: Wire<Word>,
}

impl FtPins {
  /// Word handed to the peripheral on this edge, if any.
  pub fn written_word(&self) -> Option<Word> {
    if self.wr && self.txe {
      self.data_out.get().copied()
    } else {
      None
    }
  }

  /// Word taken from the peripheral on this edge, if any.
  pub fn read_word(&self) -> Option<Word> {
    if self.oe && self.rd && self.rxf {
      Some(self.data_in)
    } else {
      None
    }
  }

  /// Both sides driving the data lines, or both strobes at once.
  pub fn bus_conflict(&self) -> bool {
    (self.oe && self.data_out.valid) || (self.rd && self.wr)
  }
}
