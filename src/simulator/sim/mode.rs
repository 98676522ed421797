use crate::apps::AppKind;
use crate::simulator::config::AppConfig;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
  Continuous,
  Step,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
  pub app: AppKind,
  /// Host cycles to run in continuous mode
  pub cycles: u64,
  pub quiet: bool,
  pub step_mode: StepMode,
  pub trace_file: Option<String>,
}

impl SimConfig {
  pub fn from_app_config(config: &AppConfig) -> io::Result<Self> {
    let sim = &config.simulation;
    Ok(Self {
      app: config.app_kind()?,
      cycles: sim.cycles,
      quiet: sim.quiet,
      step_mode: if sim.step_mode {
        StepMode::Step
      } else {
        StepMode::Continuous
      },
      trace_file: if sim.trace_file.is_empty() {
        None
      } else {
        Some(sim.trace_file.clone())
      },
    })
  }
}
