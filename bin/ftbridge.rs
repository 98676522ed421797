use clap::Parser;
use ftbridge::simulator::config::{load_and_merge_configs, CliOverrides};
use ftbridge::simulator::utils::log::init_log;
use ftbridge::simulator::Simulator;
use std::path::PathBuf;
use std::process::ExitCode;

/// ftbridge - FT600 USB-FIFO bridge simulator
#[derive(Parser, Debug)]
#[command(name = "ftbridge")]
#[command(version = "0.1.0")]
#[command(about = "Cycle-level model of an FT600 bridge with dual-clock queues", long_about = None)]
struct Args {
  /// App to run: stream, loopback or timer
  #[arg(short, long, value_name = "APP")]
  app: Option<String>,

  /// TOML file merged over the built-in defaults
  #[arg(long, value_name = "FILE")]
  config: Option<String>,

  /// Host cycles to run in continuous mode
  #[arg(long, value_name = "N")]
  cycles: Option<u64>,

  /// Enable step mode (interactive stepping)
  #[arg(short, long)]
  step: bool,

  /// Quiet mode (suppress log messages)
  #[arg(short, long)]
  quiet: bool,

  /// Output trace file path (JSON lines, one per peripheral cycle)
  #[arg(long, value_name = "FILE")]
  trace_file: Option<String>,
}

fn main() -> std::io::Result<ExitCode> {
  init_log();

  let args = Args::parse();
  let cli = CliOverrides {
    app: args.app,
    cycles: args.cycles,
    quiet: args.quiet,
    step: args.step,
    trace_file: args.trace_file,
  };

  let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
  let config = load_and_merge_configs(args.config.as_deref(), &root, &cli)?;

  let mut simulator = Simulator::from_app_config(&config)?;
  let report = simulator.run()?;
  println!("{}", report);

  if report.passed() {
    Ok(ExitCode::SUCCESS)
  } else {
    Ok(ExitCode::FAILURE)
  }
}
