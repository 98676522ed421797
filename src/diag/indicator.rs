/// Threshold flag on a queue fill level, e.g. "outbound almost full".
#[derive(Debug, Clone)]
pub struct LevelIndicator {
  threshold: usize,
  lit: bool,
  rising_edges: u64,
  lit_cycles: u64,
}

impl LevelIndicator {
  pub fn new(threshold: usize) -> Self {
    Self {
      threshold,
      lit: false,
      rising_edges: 0,
      lit_cycles: 0,
    }
  }

  /// Samples a level; lit while `level > threshold`.
  pub fn update(&mut self, level: usize) -> bool {
    let lit = level > self.threshold;
    if lit && !self.lit {
      self.rising_edges += 1;
    }
    if lit {
      self.lit_cycles += 1;
    }
    self.lit = lit;
    lit
  }

  pub fn is_lit(&self) -> bool {
    self.lit
  }

  pub fn threshold(&self) -> usize {
    self.threshold
  }

  pub fn rising_edges(&self) -> u64 {
    self.rising_edges
  }

  pub fn lit_cycles(&self) -> u64 {
    self.lit_cycles
  }
}

/// Wrapping counter whose top bit serves as a heartbeat.
#[derive(Debug, Clone)]
pub struct ActivityCounter {
  bits: u32,
  value: u64,
  toggles: u64,
}

impl ActivityCounter {
  pub fn new(bits: u32) -> Self {
    Self {
      bits: bits.clamp(1, 63),
      value: 0,
      toggles: 0,
    }
  }

  /// One clock; counts only when `enable` is set.
  pub fn tick(&mut self, enable: bool) {
    if !enable {
      return;
    }
    let before = self.msb();
    self.value = (self.value + 1) & ((1 << self.bits) - 1);
    if self.msb() != before {
      self.toggles += 1;
    }
  }

  pub fn value(&self) -> u64 {
    self.value
  }

  pub fn msb(&self) -> bool {
    (self.value >> (self.bits - 1)) & 1 == 1
  }

  pub fn toggles(&self) -> u64 {
    self.toggles
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_level_indicator_edges() {
    let mut led = LevelIndicator::new(2000);
    assert!(!led.update(2000));
    assert!(led.update(2001));
    assert!(led.update(2048));
    assert!(!led.update(10));
    assert!(led.update(2047));
    assert_eq!(led.rising_edges(), 2);
    assert_eq!(led.lit_cycles(), 3);
    assert!(led.is_lit());
  }

  #[test]
  fn test_counter_wraps_and_toggles() {
    let mut counter = ActivityCounter::new(3);
    for _ in 0..4 {
      counter.tick(true);
    }
    assert!(counter.msb());
    assert_eq!(counter.toggles(), 1);
    counter.tick(false);
    assert_eq!(counter.value(), 4);
    for _ in 0..4 {
      counter.tick(true);
    }
    assert_eq!(counter.value(), 0);
    assert!(!counter.msb());
    assert_eq!(counter.toggles(), 2);
  }
}
