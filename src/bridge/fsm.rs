//! Bridge controller: arbitrates the shared half-duplex bus.
use crate::builtin::{Module, Wire};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeState {
  /// Bus unclaimed
  #[default]
  Idle,
  /// Peripheral drives the bus, words flow into the inbound queue
  Reading,
  /// Controller drives the bus from the outbound queue
  Writing,
}

/// Inputs sampled once per peripheral clock edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlInputs {
  pub rxf: bool,
  pub txe: bool,
  pub outbound_has_data: bool,
  pub inbound_has_space: bool,
}

/// Control outputs for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Strobes {
  /// Peripheral output enable
  pub oe: bool,
  /// Controller drives data and byte-enable lines
  pub drive: bool,
  pub rd: bool,
  pub wr: bool,
  /// Byte-enable forced to all lanes
  pub be_all: bool,
  /// Peripheral data is a valid word for the inbound queue
  pub inbound_valid: bool,
  /// Outbound head is consumed when it is valid
  pub outbound_ready: bool,
}

impl Strobes {
  pub fn bus_conflict(&self) -> bool {
    (self.oe && self.drive) || (self.rd && self.wr) || (self.rd && self.drive) || (self.wr && self.oe)
  }
}

/// Pure next-state and output function.
///
/// Read has fixed priority over write when both are possible from `Idle`.
/// A peripheral that keeps `rxf` asserted therefore starves writes; that is
/// the accepted scheduling policy, not an error.
///
/// While reading, `rd` is held back whenever the inbound queue is full, so
/// the peripheral keeps the word and nothing is dropped.
pub fn transition(state: BridgeState, inputs: &ControlInputs) -> (BridgeState, Strobes) {
  let mut out = Strobes::default();

  let next = match state {
    BridgeState::Idle => {
      if inputs.rxf {
        out.oe = true;
        BridgeState::Reading
      } else if inputs.txe && inputs.outbound_has_data {
        out.drive = true;
        BridgeState::Writing
      } else {
        BridgeState::Idle
      }
    },
    BridgeState::Reading => {
      out.oe = true;

      let accept = inputs.rxf && inputs.inbound_has_space;
      out.inbound_valid = accept;
      out.rd = accept;

      if inputs.rxf {
        BridgeState::Reading
      } else {
        BridgeState::Idle
      }
    },
    BridgeState::Writing => {
      out.drive = true;
      out.be_all = true;
      out.outbound_ready = inputs.txe;
      out.wr = inputs.outbound_has_data;

      // leaves even mid-burst, there is no partial-word protection
      if inputs.txe && inputs.outbound_has_data {
        BridgeState::Writing
      } else {
        BridgeState::Idle
      }
    },
  };

  (next, out)
}

/// Cycle counters kept by the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StateCycles {
  pub idle: u64,
  pub reading: u64,
  pub writing: u64,
  pub transitions: u64,
}

/// The controller as a clocked module around [`transition`].
pub struct BridgeController {
  name: String,

  pub inputs: Wire<ControlInputs>,
  pub strobes: Wire<Strobes>,

  state: BridgeState,
  cycles: StateCycles,
}

impl BridgeController {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      inputs: Wire::default(),
      strobes: Wire::default(),
      state: BridgeState::Idle,
      cycles: StateCycles::default(),
    }
  }

  pub fn state(&self) -> BridgeState {
    self.state
  }

  pub fn cycles(&self) -> StateCycles {
    self.cycles
  }
}

impl Module for BridgeController {
  fn run(&mut self) {
    // undriven inputs read as deasserted
    let inputs = self.inputs.get().copied().unwrap_or_default();
    let (next, strobes) = transition(self.state, &inputs);

    match self.state {
      BridgeState::Idle => self.cycles.idle += 1,
      BridgeState::Reading => self.cycles.reading += 1,
      BridgeState::Writing => self.cycles.writing += 1,
    }
    if next != self.state {
      log::debug!("[{}] {:?} -> {:?} ({:?})", self.name, self.state, next, inputs);
      self.cycles.transitions += 1;
    }

    self.strobes.set(strobes);
    self.state = next;
  }

  fn reset(&mut self) {
    self.inputs = Wire::default();
    self.strobes = Wire::default();
    self.state = BridgeState::Idle;
    self.cycles = StateCycles::default();
  }

  fn name(&self) -> &str {
    &self.name
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const STATES: [BridgeState; 3] = [BridgeState::Idle, BridgeState::Reading, BridgeState::Writing];

  fn all_inputs() -> impl Iterator<Item = ControlInputs> {
    (0..16u8).map(|bits| ControlInputs {
      rxf: bits & 1 != 0,
      txe: bits & 2 != 0,
      outbound_has_data: bits & 4 != 0,
      inbound_has_space: bits & 8 != 0,
    })
  }

  #[test]
  fn test_read_beats_write_from_idle() {
    for inbound_has_space in [false, true] {
      let inputs = ControlInputs {
        rxf: true,
        txe: true,
        outbound_has_data: true,
        inbound_has_space,
      };
      let (next, out) = transition(BridgeState::Idle, &inputs);
      assert_eq!(next, BridgeState::Reading);
      assert!(out.oe);
      assert!(!out.wr && !out.drive);
    }
  }

  #[test]
  fn test_no_bus_conflict_anywhere() {
    for state in STATES {
      for inputs in all_inputs() {
        let (_, out) = transition(state, &inputs);
        assert!(!out.bus_conflict(), "{:?} {:?} -> {:?}", state, inputs, out);
      }
    }
  }

  #[test]
  fn test_write_needs_txe_and_data() {
    let mut inputs = ControlInputs {
      txe: true,
      ..Default::default()
    };
    assert_eq!(transition(BridgeState::Idle, &inputs).0, BridgeState::Idle);
    inputs.outbound_has_data = true;
    assert_eq!(transition(BridgeState::Idle, &inputs).0, BridgeState::Writing);
    inputs.txe = false;
    assert_eq!(transition(BridgeState::Idle, &inputs).0, BridgeState::Idle);
  }

  #[test]
  fn test_reading_holds_while_rxf() {
    let inputs = ControlInputs {
      rxf: true,
      inbound_has_space: true,
      ..Default::default()
    };
    let (next, out) = transition(BridgeState::Reading, &inputs);
    assert_eq!(next, BridgeState::Reading);
    assert!(out.rd && out.inbound_valid && out.oe);

    let (next, out) = transition(BridgeState::Reading, &ControlInputs::default());
    assert_eq!(next, BridgeState::Idle);
    assert!(!out.rd && !out.inbound_valid);
  }

  #[test]
  fn test_reading_stalls_when_inbound_full() {
    let inputs = ControlInputs {
      rxf: true,
      inbound_has_space: false,
      ..Default::default()
    };
    let (next, out) = transition(BridgeState::Reading, &inputs);
    assert_eq!(next, BridgeState::Reading);
    assert!(out.oe);
    assert!(!out.rd && !out.inbound_valid);
  }

  #[test]
  fn test_writing_leaves_when_either_drops() {
    let both = ControlInputs {
      txe: true,
      outbound_has_data: true,
      ..Default::default()
    };
    let (next, out) = transition(BridgeState::Writing, &both);
    assert_eq!(next, BridgeState::Writing);
    assert!(out.wr && out.outbound_ready && out.be_all && out.drive);

    let no_txe = ControlInputs { txe: false, ..both };
    let (next, out) = transition(BridgeState::Writing, &no_txe);
    assert_eq!(next, BridgeState::Idle);
    assert!(!out.outbound_ready);

    let no_data = ControlInputs {
      outbound_has_data: false,
      ..both
    };
    let (next, out) = transition(BridgeState::Writing, &no_data);
    assert_eq!(next, BridgeState::Idle);
    assert!(!out.wr);
  }

  #[test]
  fn test_writing_ignores_rxf() {
    let inputs = ControlInputs {
      rxf: true,
      txe: true,
      outbound_has_data: true,
      inbound_has_space: true,
    };
    assert_eq!(transition(BridgeState::Writing, &inputs).0, BridgeState::Writing);
  }

  #[test]
  fn test_idle_is_idempotent() {
    let mut ctrl = BridgeController::new("ft600");
    for _ in 0..100 {
      ctrl.inputs.set(ControlInputs::default());
      ctrl.run();
      assert_eq!(ctrl.state(), BridgeState::Idle);
      assert_eq!(ctrl.strobes.value, Strobes::default());
    }
    assert_eq!(ctrl.cycles().idle, 100);
    assert_eq!(ctrl.cycles().transitions, 0);
  }

  #[test]
  fn test_controller_reset() {
    let mut ctrl = BridgeController::new("ft600");
    ctrl.inputs.set(ControlInputs {
      rxf: true,
      ..Default::default()
    });
    ctrl.run();
    assert_eq!(ctrl.state(), BridgeState::Reading);
    ctrl.reset();
    assert_eq!(ctrl.state(), BridgeState::Idle);
    assert_eq!(ctrl.cycles(), StateCycles::default());
    assert_eq!(ctrl.name(), "ft600");
  }
}
