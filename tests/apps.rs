use ftbridge::apps::{App, LoopbackApp, StreamApp, TimerApp};
use ftbridge::simulator::config::{load_and_merge_configs, CliOverrides};
use ftbridge::simulator::Simulator;
use ftbridge::BridgeConfig;
use std::fs;
use std::path::Path;

fn run_host_cycles(app: &mut dyn App, cycles: u64) {
  while app.host_cycles() < cycles && !app.finished() {
    app.step();
  }
}

#[test]
fn stream_fills_then_drains_after_attach() {
  let config = BridgeConfig {
    outbound_depth: 2048,
    ..Default::default()
  };
  let mut app = StreamApp::new(&config, 4096, 2000, 2500).unwrap();

  run_host_cycles(&mut app, 2400);
  assert!(app.level_indicator().is_lit());
  assert_eq!(app.received(), 0);

  run_host_cycles(&mut app, 8000);
  assert!(!app.level_indicator().is_lit());
  assert_eq!(app.level_indicator().rising_edges(), 1);
  assert!(app.heartbeat().toggles() > 0);

  let report = app.report();
  assert!(report.passed(), "{}", report);
  assert!(report.words_checked > 5000);
}

#[test]
fn loopback_round_trips_every_word() {
  let mut app = LoopbackApp::new(&BridgeConfig::default(), 1000).unwrap();
  run_host_cycles(&mut app, 100_000);

  assert!(app.finished());
  let report = app.report();
  assert_eq!(report.words_checked, 1000);
  assert!(report.passed(), "{}", report);
}

#[test]
fn timer_leds_blink_together() {
  for word_width in [8, 16, 32] {
    let config = BridgeConfig {
      word_width,
      ..Default::default()
    };
    let mut app = TimerApp::new(&config, 12).unwrap();
    run_host_cycles(&mut app, 10_000);

    let report = app.report();
    assert!(report.passed(), "{}", report);
    let (slow, fast) = app.toggles();
    assert!(slow >= 4);
    assert!(slow - fast <= 1, "slow={} fast={}", slow, fast);
  }
}

#[test]
fn timer_rejects_bad_width() {
  assert!(TimerApp::new(&BridgeConfig::default(), 0).is_err());
  assert!(TimerApp::new(&BridgeConfig::default(), 64).is_err());
}

#[test]
fn simulator_writes_pin_trace() {
  let trace = std::env::temp_dir().join(format!("ftbridge-trace-{}.jsonl", std::process::id()));
  let cli = CliOverrides {
    app: Some("loopback".to_string()),
    cycles: Some(50),
    quiet: true,
    trace_file: Some(trace.to_string_lossy().into_owned()),
    ..Default::default()
  };
  let config = load_and_merge_configs(None, Path::new("."), &cli).unwrap();

  let mut sim = Simulator::from_app_config(&config).unwrap();
  let report = sim.run().unwrap();
  assert_eq!(report.host_cycles, 50);

  let text = fs::read_to_string(&trace).unwrap();
  let lines: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
  assert_eq!(lines.len() as u64, report.peripheral_cycles);
  assert!(lines.iter().any(|s| s["wr"] == true));
  assert!(lines.iter().any(|s| s["rd"] == true));
  for sample in &lines {
    assert!(!(sample["oe"] == true && !sample["data"].is_null()));
  }
  let _ = fs::remove_file(&trace);
}

#[test]
fn config_file_overrides_defaults() {
  let dir = std::env::temp_dir().join(format!("ftbridge-cfg-{}", std::process::id()));
  fs::create_dir_all(&dir).unwrap();
  fs::write(dir.join("small.toml"), "[simulation]\napp = \"timer\"\ncycles = 64\n").unwrap();

  let config = load_and_merge_configs(Some("small.toml"), &dir, &CliOverrides::default()).unwrap();
  assert_eq!(config.simulation.app, "timer");
  assert_eq!(config.simulation.cycles, 64);
  assert_eq!(config.bridge.outbound_depth, 2048);

  // keys left out keep the bundled values, keys given win even when they
  // equal a struct default
  fs::write(dir.join("attach.toml"), "[bridge]\ninbound_depth = 64\n[device]\nattach_at = 0\n").unwrap();
  let config = load_and_merge_configs(Some("attach.toml"), &dir, &CliOverrides::default()).unwrap();
  assert_eq!(config.bridge.inbound_depth, 64);
  assert_eq!(config.bridge.outbound_depth, 2048);
  assert_eq!(config.level_threshold(), 2000);
  assert_eq!(config.device.attach_at, 0);

  let missing = load_and_merge_configs(Some("absent.toml"), &dir, &CliOverrides::default());
  assert!(missing.is_err());
  let _ = fs::remove_dir_all(&dir);
}
