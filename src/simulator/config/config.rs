use crate::apps::AppKind;
use crate::bridge::BridgeConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

const DEFAULT_CONFIG: &str = include_str!("default.toml");

const LEVEL_MARK: usize = 2000;
const LEVEL_MARK_DEPTH: usize = 2048;

/// FT600 device model settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceSection {
  pub tx_depth: usize,
  pub attach_at: u64,
}

impl Default for DeviceSection {
  fn default() -> Self {
    Self {
      tx_depth: 4096,
      attach_at: 0,
    }
  }
}

/// Per-app settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppSection {
  pub level_threshold: Option<usize>,
  pub loopback_words: u64,
  pub timer_bits: u32,
}

impl Default for AppSection {
  fn default() -> Self {
    Self {
      level_threshold: None,
      loopback_words: 4096,
      timer_bits: 12,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SimulationSection {
  #[serde(default = "default_app")]
  pub app: String,
  #[serde(default = "default_cycles")]
  pub cycles: u64,
  #[serde(default)]
  pub quiet: bool,
  #[serde(default)]
  pub step_mode: bool,
  #[serde(default)]
  pub trace_file: String,
}

fn default_app() -> String {
  "stream".to_string()
}

fn default_cycles() -> u64 {
  20_000
}

impl Default for SimulationSection {
  fn default() -> Self {
    Self {
      app: default_app(),
      cycles: default_cycles(),
      quiet: false,
      step_mode: false,
      trace_file: String::new(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
  #[serde(default)]
  pub bridge: BridgeConfig,
  #[serde(default)]
  pub device: DeviceSection,
  #[serde(default)]
  pub app: AppSection,
  #[serde(default)]
  pub simulation: SimulationSection,
}

impl AppConfig {
  pub fn app_kind(&self) -> io::Result<AppKind> {
    Ok(self.simulation.app.parse::<AppKind>()?)
  }

  /// Level LED threshold. Unless set, it scales the 2000-of-2048 mark of
  /// the stock board to the configured outbound depth.
  pub fn level_threshold(&self) -> usize {
    self
      .app
      .level_threshold
      .unwrap_or(self.bridge.outbound_depth * LEVEL_MARK / LEVEL_MARK_DEPTH)
  }
}

/// Settings given on the command line; `None`/`false` leaves the file value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
  pub app: Option<String>,
  pub cycles: Option<u64>,
  pub quiet: bool,
  pub step: bool,
  pub trace_file: Option<String>,
}

/// Loads the bundled default configuration
pub fn load_default_config() -> io::Result<AppConfig> {
  parse_config(DEFAULT_CONFIG)
}

/// Reads a user config file as a raw table, to be merged over a base.
pub fn load_config_file(path: &Path) -> io::Result<Table> {
  let content = fs::read_to_string(path)
    .map_err(|e| io::Error::new(io::ErrorKind::NotFound, format!("cannot read config file {:?}: {}", path, e)))?;
  parse_overlay(&content)
}

pub fn parse_config(content: &str) -> io::Result<AppConfig> {
  toml::from_str::<AppConfig>(content)
    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("failed to parse TOML config: {}", e)))
}

pub fn parse_overlay(content: &str) -> io::Result<Table> {
  content
    .parse::<Table>()
    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("failed to parse TOML config: {}", e)))
}

/// Overlays `overlay` on `base` key by key. Keys missing from the overlay
/// keep their base value, whatever the struct defaults are.
pub fn merge_config(base: AppConfig, overlay: Table) -> io::Result<AppConfig> {
  let mut merged = match Value::try_from(&base) {
    Ok(Value::Table(table)) => table,
    Ok(_) => return Err(io::Error::new(io::ErrorKind::InvalidData, "config did not serialize to a table")),
    Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
  };
  merge_tables(&mut merged, overlay);

  Value::Table(merged)
    .try_into::<AppConfig>()
    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("invalid config after merge: {}", e)))
}

fn merge_tables(base: &mut Table, overlay: Table) {
  for (key, value) in overlay {
    match (base.get_mut(&key), value) {
      (Some(Value::Table(base_section)), Value::Table(section)) => merge_tables(base_section, section),
      (_, value) => {
        base.insert(key, value);
      },
    }
  }
}

pub fn apply_cli_overrides(config: &mut AppConfig, cli: &CliOverrides) {
  if let Some(app) = &cli.app {
    config.simulation.app = app.clone();
  }
  if let Some(cycles) = cli.cycles {
    config.simulation.cycles = cycles;
  }
  if cli.quiet {
    config.simulation.quiet = true;
  }
  if cli.step {
    config.simulation.step_mode = true;
  }
  if let Some(file) = &cli.trace_file {
    config.simulation.trace_file = file.clone();
  }
}

pub fn validate_config(config: &AppConfig) -> io::Result<()> {
  config.bridge.validate()?;
  config.app_kind()?;

  if config.device.tx_depth == 0 {
    return Err(io::Error::new(io::ErrorKind::InvalidData, "device.tx_depth cannot be 0"));
  }
  if config.simulation.cycles == 0 {
    return Err(io::Error::new(io::ErrorKind::InvalidData, "simulation.cycles cannot be 0"));
  }
  if !(1..=63).contains(&config.app.timer_bits) {
    return Err(io::Error::new(
      io::ErrorKind::InvalidData,
      format!("app.timer_bits must be in 1..=63, got {}", config.app.timer_bits),
    ));
  }

  Ok(())
}

/// Loads and merges configs
///
/// 1. bundled defaults
/// 2. custom config file, if given (relative paths are taken from `root`)
/// 3. command line overrides
/// 4. validation
pub fn load_and_merge_configs(custom_config_path: Option<&str>, root: &Path, cli: &CliOverrides) -> io::Result<AppConfig> {
  let mut config = load_default_config()?;

  if let Some(custom_path) = custom_config_path {
    let custom_path_buf = PathBuf::from(custom_path);
    let custom_path_abs = if custom_path_buf.is_absolute() {
      custom_path_buf
    } else {
      root.join(&custom_path_buf)
    };

    let overlay = load_config_file(&custom_path_abs)?;
    config = merge_config(config, overlay)?;
  }

  apply_cli_overrides(&mut config, cli);
  validate_config(&config)?;

  Ok(config)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_bundled_default_is_valid() {
    let config = load_default_config().unwrap();
    assert_eq!(config.bridge.word_width, 16);
    assert_eq!(config.bridge.outbound_depth, 2048);
    assert_eq!(config.app.level_threshold, None);
    assert_eq!(config.level_threshold(), 2000);
    assert_eq!(config.app_kind().unwrap(), AppKind::Stream);
    validate_config(&config).unwrap();
  }

  #[test]
  fn test_partial_file_keeps_defaults() {
    let config = parse_config("[simulation]\napp = \"timer\"\n").unwrap();
    assert_eq!(config.simulation.app, "timer");
    assert_eq!(config.simulation.cycles, 20_000);
    assert_eq!(config.bridge, BridgeConfig::default());
  }

  #[test]
  fn test_merge_and_cli_order() {
    let base = load_default_config().unwrap();
    let overlay = parse_overlay("[bridge]\ninbound_depth = 64\n[simulation]\ncycles = 500\n").unwrap();
    let mut merged = merge_config(base, overlay).unwrap();
    assert_eq!(merged.bridge.inbound_depth, 64);
    assert_eq!(merged.simulation.cycles, 500);

    apply_cli_overrides(
      &mut merged,
      &CliOverrides {
        app: Some("loopback".to_string()),
        cycles: Some(7),
        ..Default::default()
      },
    );
    assert_eq!(merged.simulation.cycles, 7);
    assert_eq!(merged.app_kind().unwrap(), AppKind::Loopback);
  }

  #[test]
  fn test_validation_errors() {
    let mut config = AppConfig::default();
    config.bridge.outbound_depth = 1000;
    let err = validate_config(&config).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    let mut config = AppConfig::default();
    config.simulation.app = "pll".to_string();
    assert!(validate_config(&config).is_err());

    let mut config = AppConfig::default();
    config.app.timer_bits = 0;
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_missing_file() {
    let err = load_config_file(Path::new("/nonexistent/ftbridge.toml")).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
  }

  #[test]
  fn test_default_threshold_tracks_depth() {
    let mut config = AppConfig::default();
    assert_eq!(config.bridge.outbound_depth, 1024);
    assert_eq!(config.level_threshold(), 1000);

    config.bridge.outbound_depth = 2048;
    assert_eq!(config.level_threshold(), 2000);

    config.app.level_threshold = Some(7);
    assert_eq!(config.level_threshold(), 7);
  }

  #[test]
  fn test_overlay_keeps_bundled_values_of_the_same_section() {
    let base = load_default_config().unwrap();
    let merged = merge_config(base, parse_overlay("[bridge]\ninbound_depth = 64\n").unwrap()).unwrap();
    assert_eq!(merged.bridge.inbound_depth, 64);
    // bundled, not BridgeConfig::default()
    assert_eq!(merged.bridge.outbound_depth, 2048);
    assert_eq!(merged.level_threshold(), 2000);
    assert_eq!(merged.device.attach_at, 2500);
  }

  #[test]
  fn test_overlay_can_set_struct_default_values() {
    let base = load_default_config().unwrap();
    let overlay = parse_overlay("[device]\nattach_at = 0\n[simulation]\nquiet = false\n").unwrap();
    let merged = merge_config(base, overlay).unwrap();
    assert_eq!(merged.device.attach_at, 0);
    assert_eq!(merged.device.tx_depth, 4096);
    assert!(!merged.simulation.quiet);
  }

  #[test]
  fn test_overlay_type_errors_are_reported() {
    let base = load_default_config().unwrap();
    let err = merge_config(base, parse_overlay("[bridge]\nword_width = \"wide\"\n").unwrap()).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
  }
}
