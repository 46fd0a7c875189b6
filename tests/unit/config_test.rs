//! Unit tests for the host-supplied configuration.

use palsync::SyncConfig;

#[test]
fn default_config_has_expected_values() {
    let config = SyncConfig::default();
    assert!(config.term_override.is_none());
    assert!(config.colors_override.is_none());
    assert!(config.blacklist.is_none());
    assert!(config.cursor_reset.is_none());
    assert_eq!(config.default_foreground, "#ffffff");
    assert_eq!(config.default_background, "#000000");
}

#[test]
fn config_serialization_roundtrip() {
    let config = SyncConfig {
        term_override: Some("xterm-256color".to_string()),
        colors_override: Some(88),
        blacklist: Some("^Pmenu".to_string()),
        ..Default::default()
    };
    let toml_str = toml::to_string(&config).unwrap();
    let parsed: SyncConfig = toml::from_str(&toml_str).unwrap();
    assert_eq!(parsed.term_override, config.term_override);
    assert_eq!(parsed.colors_override, config.colors_override);
    assert_eq!(parsed.blacklist, config.blacklist);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let config: SyncConfig = toml::from_str("colors_override = 256\n").unwrap();
    assert_eq!(config.colors_override, Some(256));
    assert_eq!(config.default_foreground, "#ffffff");
    assert!(config.cursor_reset.is_none());
}

#[test]
fn cursor_reset_accepts_escape_strings() {
    let config: SyncConfig = toml::from_str("cursor_reset = \"\\u001b]112\\u0007\"\n").unwrap();
    assert_eq!(config.cursor_reset.as_deref(), Some("\x1b]112\x07"));
}
