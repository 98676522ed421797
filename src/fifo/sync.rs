/// Shift register that carries a pointer published by another clock domain.
///
/// Every `clock` samples the published value into the first stage and moves
/// the older samples one stage down. Only the last stage is used for status
/// flags, so a published value becomes visible after exactly `depth` clocks.
#[derive(Debug, Clone)]
pub struct Synchronizer {
  stages: Vec<usize>,
}

impl Synchronizer {
  /// `depth` must be non-zero; queue construction checks this.
  pub fn new(depth: usize) -> Self {
    Self {
      stages: vec![0; depth.max(1)],
    }
  }

  pub fn clock(&mut self, sample: usize) {
    self.stages.rotate_right(1);
    self.stages[0] = sample;
  }

  pub fn output(&self) -> usize {
    self.stages[self.stages.len() - 1]
  }

  pub fn depth(&self) -> usize {
    self.stages.len()
  }
}
