use super::config::AppConfig;
use super::sim::mode::{SimConfig, StepMode};
use super::sim::shell::{Command, Shell};
use super::sim::trace::{PinSample, TraceWriter};
use super::utils::log::set_log;
use crate::apps::{App, AppKind, AppReport, LoopbackApp, StreamApp, TimerApp};
use crate::clock::Domain;
use crate::error::ConfigError;
use std::fs::File;
use std::io::{BufWriter, Result};
use std::path::Path;

/// Builds the app named by `kind` from its configuration section.
pub fn create_app(kind: AppKind, config: &AppConfig) -> std::result::Result<Box<dyn App>, ConfigError> {
  let app: Box<dyn App> = match kind {
    AppKind::Stream => Box::new(StreamApp::new(
      &config.bridge,
      config.device.tx_depth,
      config.level_threshold(),
      config.device.attach_at,
    )?),
    AppKind::Loopback => Box::new(LoopbackApp::new(&config.bridge, config.app.loopback_words)?),
    AppKind::Timer => Box::new(TimerApp::new(&config.bridge, config.app.timer_bits)?),
  };
  Ok(app)
}

pub struct Simulator {
  config: SimConfig,
  app: Box<dyn App>,
  trace: Option<TraceWriter<BufWriter<File>>>,
}

impl Simulator {
  pub fn new(config: SimConfig, app: Box<dyn App>) -> Result<Self> {
    let trace = match &config.trace_file {
      Some(path) => Some(TraceWriter::create(Path::new(path))?),
      None => None,
    };
    Ok(Self { config, app, trace })
  }

  pub fn from_app_config(config: &AppConfig) -> Result<Self> {
    let sim_config = SimConfig::from_app_config(config)?;
    let app = create_app(sim_config.app, config)?;
    Self::new(sim_config, app)
  }

  pub fn app(&self) -> &dyn App {
    self.app.as_ref()
  }

  pub fn run(&mut self) -> Result<AppReport> {
    set_log(!self.config.quiet);
    log::info!("running '{}' for up to {} host cycles", self.config.app, self.config.cycles);

    match self.config.step_mode {
      StepMode::Continuous => self.run_continuous()?,
      StepMode::Step => self.run_step_mode()?,
    }

    if let Some(trace) = &mut self.trace {
      trace.flush()?;
      log::info!("wrote {} trace records", trace.records());
    }
    Ok(self.app.report())
  }

  fn run_step_mode(&mut self) -> Result<()> {
    println!("Step mode - Enter steps one peripheral cycle, 'q' to quit");
    let mut shell = Shell::new("ftbridge")?;

    loop {
      match shell.read_command()? {
        Command::Step(n) => {
          for _ in 0..n {
            self.step_peripheral_cycle()?;
          }
          self.print_status();
        },
        Command::Status => println!("{}", self.app.report()),
        Command::Continue => return self.run_continuous(),
        Command::Quit => return Ok(()),
      }
    }
  }

  fn run_continuous(&mut self) -> Result<()> {
    while self.app.host_cycles() < self.config.cycles && !self.app.finished() {
      self.step()?;
    }
    Ok(())
  }

  fn step_peripheral_cycle(&mut self) -> Result<()> {
    loop {
      if self.step()? {
        return Ok(());
      }
    }
  }

  /// One scheduler step. Returns true when the peripheral domain clocked.
  fn step(&mut self) -> Result<bool> {
    let edges = self.app.step();
    if edges.has(Domain::Peripheral) {
      if let (Some(trace), Some(bridge)) = (&mut self.trace, self.app.bridge()) {
        trace.record(&PinSample::capture(bridge))?;
      }
    }
    Ok(edges.has(Domain::Peripheral))
  }

  fn print_status(&self) {
    match self.app.bridge() {
      Some(bridge) => {
        let pins = bridge.pins();
        println!(
          "t={}ps state={:?} rxf={} txe={} oe={} rd={} wr={} out={} in={}",
          bridge.clocks().now(),
          bridge.state(),
          pins.rxf as u8,
          pins.txe as u8,
          pins.oe as u8,
          pins.rd as u8,
          pins.wr as u8,
          bridge.outbound_level(),
          bridge.inbound_level()
        );
      },
      None => println!("host cycle {}", self.app.host_cycles()),
    }
  }
}
