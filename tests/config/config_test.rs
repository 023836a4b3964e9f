//! Coverage for config parsing, defaults, and env-override precedence.

use std::fs;

use chatbridge::config::BridgeConfig;

#[test]
fn defaults_are_local_dev_endpoints() {
    let config = BridgeConfig::default();
    assert_eq!(config.bridge.log_level, "info");
    assert_eq!(config.bridge.refresh_interval_secs, 30);
    assert_eq!(config.personal.bridge_url, "http://127.0.0.1:3001");
    assert!(config.official.access_token.is_empty());
    assert!(config.page.page_id.is_empty());
}

#[test]
fn parse_minimal_config() {
    let toml_str = r#"
[personal]
bridge_url = "http://10.0.0.5:3001"

[page]
page_id = "page-123"
access_token = "tok"
"#;
    let parsed = toml::from_str::<BridgeConfig>(toml_str);
    let config = match parsed {
        Ok(config) => config,
        Err(err) => panic!("minimal config should parse: {err}"),
    };
    assert_eq!(config.personal.bridge_url, "http://10.0.0.5:3001");
    assert_eq!(config.page.page_id, "page-123");
    // Untouched sections keep their defaults.
    assert_eq!(config.bridge.log_level, "info");
}

#[test]
fn env_overrides_beat_file_values() {
    let mut config = BridgeConfig::default();
    config.apply_overrides(|key| match key {
        "BRIDGE_PERSONAL_URL" => Some("http://192.168.0.9:3001".to_owned()),
        "BRIDGE_OFFICIAL_TOKEN" => Some("secret".to_owned()),
        "BRIDGE_REFRESH_INTERVAL_SECS" => Some("5".to_owned()),
        _ => None,
    });
    assert_eq!(config.personal.bridge_url, "http://192.168.0.9:3001");
    assert_eq!(config.official.access_token, "secret");
    assert_eq!(config.bridge.refresh_interval_secs, 5);
    // Untouched keys keep their defaults.
    assert_eq!(config.page.base_url, "http://127.0.0.1:8083");
}

#[test]
fn invalid_numeric_override_is_ignored() {
    let mut config = BridgeConfig::default();
    config.apply_overrides(|key| match key {
        "BRIDGE_REFRESH_INTERVAL_SECS" => Some("soon".to_owned()),
        _ => None,
    });
    assert_eq!(config.bridge.refresh_interval_secs, 30);
}

#[test]
fn validate_rejects_malformed_urls() {
    let mut config = BridgeConfig::default();
    config.personal.bridge_url = "not a url".to_owned();
    assert!(config.validate().is_err());

    config.personal.bridge_url = "http://127.0.0.1:3001".to_owned();
    assert!(config.validate().is_ok());
}

#[test]
fn config_file_round_trip() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("tempdir should create: {err}"),
    };
    let path = dir.path().join("bridge.toml");
    let written = fs::write(&path, "[bridge]\nlog_level = \"debug\"\n");
    assert!(written.is_ok());

    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) => panic!("config file should read back: {err}"),
    };
    let parsed = toml::from_str::<BridgeConfig>(&contents);
    assert!(matches!(parsed, Ok(c) if c.bridge.log_level == "debug"));
}
