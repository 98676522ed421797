use crate::error::ConfigError;

/// A transfer word. Only the low `WordFormat::width()` bits are meaningful.
pub type Word = u32;

/// Width of the data bus, fixed at construction and shared by both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordFormat {
  width: u32,
}

impl WordFormat {
  pub fn new(width: u32) -> Result<Self, ConfigError> {
    match width {
      8 | 16 | 32 => Ok(Self { width }),
      other => Err(ConfigError::InvalidWordWidth(other)),
    }
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  /// Number of byte lanes, one byte-enable bit each.
  pub fn lanes(&self) -> u32 {
    self.width / 8
  }

  pub fn mask(&self) -> Word {
    if self.width == Word::BITS {
      Word::MAX
    } else {
      (1 << self.width) - 1
    }
  }

  /// Byte-enable value with every lane marked valid.
  pub fn all_lanes(&self) -> u8 {
    ((1u16 << self.lanes()) - 1) as u8
  }

  pub fn truncate(&self, word: Word) -> Word {
    word & self.mask()
  }

  /// Most significant bit of a word in this format.
  pub fn msb(&self, word: Word) -> bool {
    (word >> (self.width - 1)) & 1 == 1
  }
}

impl Default for WordFormat {
  fn default() -> Self {
    Self { width: 16 }
  }
}
