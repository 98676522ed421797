//! Global logging configuration
use log::LevelFilter;
use std::sync::Once;

static INIT: Once = Once::new();

/// Installs the `env_logger` backend. `RUST_LOG` overrides the default
/// `info` level. Safe to call more than once.
pub fn init_log() {
  INIT.call_once(|| {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
      .format_timestamp(None)
      .try_init();
  });
}

/// Set logging enabled. Disabling keeps warnings and errors.
pub fn set_log(enabled: bool) {
  if enabled {
    log::set_max_level(LevelFilter::Trace);
  } else {
    log::set_max_level(LevelFilter::Warn);
  }
}

