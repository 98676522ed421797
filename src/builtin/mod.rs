mod port;

pub use port::Wire;

/// A clocked hardware block.
///
/// `run` evaluates one clock cycle: it reads the inputs latched on its
/// wires, updates its outputs and commits its registers.
pub trait Module {
  fn run(&mut self);
  fn reset(&mut self);
  fn name(&self) -> &str;
}
