use chainflow::config::{
    ConfigError, WorkflowSettings, HARD_MAX_SLIPPAGE_BPS, QUOTE_API_BASE_ENV,
};
use chainflow::shared::Network;
use std::fs;
use tempfile::tempdir;

#[test]
fn settings_module_loads_full_yaml_file() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("chainflow.yaml");
    fs::write(
        &path,
        r#"
default_network: mainnet
native_asset: NEAR
default_slippage_bps: 30
max_slippage_bps: 300
fan_out_workers: 2
status_poll:
  interval_ms: 1000
  timeout_ms: 30000
quote_api:
  base_url: https://quotes.example/v0
event_log_path: /tmp/chainflow-events.jsonl
"#,
    )
    .expect("write settings");

    let settings = WorkflowSettings::from_path(&path).expect("load settings");
    assert_eq!(settings.default_network, Network::Mainnet);
    assert_eq!(settings.default_slippage_bps, 30);
    assert_eq!(settings.effective_max_slippage_bps(), 300);
    assert_eq!(settings.fan_out_workers, 2);
    assert_eq!(settings.status_poll.interval_ms, 1_000);
    assert_eq!(settings.quote_api.base_url, "https://quotes.example/v0");
    assert!(settings.event_log_path.is_some());
}

#[test]
fn settings_module_reports_missing_file_and_bad_values() {
    let temp = tempdir().expect("tempdir");
    let err =
        WorkflowSettings::from_path(&temp.path().join("absent.yaml")).expect_err("missing file");
    assert!(matches!(err, ConfigError::Read { .. }));

    let path = temp.path().join("chainflow.yaml");
    fs::write(&path, "default_slippage_bps: 2000\nmax_slippage_bps: 1000\n")
        .expect("write settings");
    let err = WorkflowSettings::from_path(&path).expect_err("default above ceiling");
    assert!(matches!(err, ConfigError::Settings(_)));

    fs::write(&path, "fan_out_workers: 0\n").expect("write settings");
    let err = WorkflowSettings::from_path(&path).expect_err("no workers");
    assert!(err.to_string().contains("fan_out_workers"));

    fs::write(&path, format!("max_slippage_bps: {}\n", HARD_MAX_SLIPPAGE_BPS))
        .expect("write settings");
    let settings = WorkflowSettings::from_path(&path).expect("hard limit itself is allowed");
    assert_eq!(settings.effective_max_slippage_bps(), HARD_MAX_SLIPPAGE_BPS);
}

#[test]
fn settings_module_quote_api_base_honours_environment_override() {
    let settings = WorkflowSettings::default();
    std::env::set_var(QUOTE_API_BASE_ENV, "http://127.0.0.1:9999/v0");
    assert_eq!(
        settings.quote_api.resolved_base_url(),
        "http://127.0.0.1:9999/v0"
    );
    std::env::set_var(QUOTE_API_BASE_ENV, "  ");
    assert_eq!(
        settings.quote_api.resolved_base_url(),
        settings.quote_api.base_url
    );
    std::env::remove_var(QUOTE_API_BASE_ENV);
}
