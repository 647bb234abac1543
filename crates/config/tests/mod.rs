//! Config file loading tests

use chainfee_config::{AppConfig, ConfigError, FailedTxFeePolicy};
use std::io::Write;

#[test]
fn test_load_full_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[fees]
native_denom = "BNB"
failed_tx_fee_policy = "discard"
publish_block_fee = true

[logging]
filter = "debug,chainfee_ledger=trace"
json = true
with_target = true
"#
    )
    .unwrap();

    let config = AppConfig::load(file.path()).unwrap();
    assert_eq!(config.fees.failed_tx_fee_policy, FailedTxFeePolicy::Discard);
    assert!(config.fees.publish_block_fee);
    assert_eq!(config.logging.filter, "debug,chainfee_ledger=trace");
    assert!(config.logging.json);
    assert!(config.logging.with_target);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let err = AppConfig::load(&missing).unwrap_err();
    match err {
        ConfigError::Io { path, .. } => assert!(path.ends_with("absent.toml")),
        other => panic!("Unexpected error: {:?}", other),
    }
}

#[test]
fn test_config_json_shape() {
    let config = AppConfig::default();
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["fees"]["native_denom"], "BNB");
    assert_eq!(json["fees"]["failed_tx_fee_policy"], "collect");
    assert_eq!(json["logging"]["filter"], "info");
}
