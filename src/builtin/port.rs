/// A signal between modules that carries a value plus a valid flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wire<T: Clone> {
  pub value: T,
  pub valid: bool,
}

impl<T: Clone> Wire<T> {
  pub fn new(value: T) -> Self {
    Self { value, valid: false }
  }

  pub fn set(&mut self, value: T) {
    self.value = value;
    self.valid = true;
  }

  /// Drops the valid flag; the last value stays on the wire.
  pub fn clear(&mut self) {
    self.valid = false;
  }

  pub fn get(&self) -> Option<&T> {
    if self.valid {
      Some(&self.value)
    } else {
      None
    }
  }
}

impl<T: Clone + Default> Default for Wire<T> {
  fn default() -> Self {
    Self {
      value: T::default(),
      valid: false,
    }
  }
}
