pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{
    QuoteApiSettings, StatusPollSettings, WorkflowSettings, HARD_MAX_SLIPPAGE_BPS,
    QUOTE_API_BASE_ENV,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Network;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn empty_yaml_uses_defaults() {
        let settings: WorkflowSettings = serde_yaml::from_str("{}").expect("parse settings");
        assert_eq!(settings.default_network, Network::Testnet);
        assert_eq!(settings.default_slippage_bps, 50);
        assert_eq!(settings.effective_max_slippage_bps(), 1_000);
        assert_eq!(settings.fan_out_workers, 4);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn from_path_rejects_ceiling_above_hard_limit() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("chainflow.yaml");
        fs::write(&path, "max_slippage_bps: 9000\n").expect("write settings");

        let err = WorkflowSettings::from_path(&path).expect_err("ceiling must be rejected");
        assert!(err.to_string().contains("max_slippage_bps"));
    }

    #[test]
    fn from_path_rejects_unknown_keys() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("chainflow.yaml");
        fs::write(&path, "slippage: 10\n").expect("write settings");

        let err = WorkflowSettings::from_path(&path).expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn poll_timeout_must_cover_one_interval() {
        let settings: WorkflowSettings = serde_yaml::from_str(
            r#"
status_poll:
  interval_ms: 5000
  timeout_ms: 1000
"#,
        )
        .expect("parse settings");
        assert!(settings.validate().is_err());
    }
}
