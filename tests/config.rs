//! Configuration persistence tests

use escape_lens::config::{LensConfig, ScratchConfig};
use escape_lens::config_paths;
use escape_lens::EscapeStyle;

#[test]
fn test_config_paths_are_nested() {
    // No home directory in some sandboxes; nothing to check then
    let Some(dir) = config_paths::config_dir() else {
        return;
    };
    assert!(dir.ends_with("escape-lens"));
    assert_eq!(config_paths::config_file(), Some(dir.join("config.yaml")));
    assert_eq!(config_paths::logs_dir(), Some(dir.join("logs")));

    let log = config_paths::log_file().unwrap();
    let name = log.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(config_paths::LOG_FILE_NAME));
}

#[test]
fn test_defaults() {
    let config = LensConfig::default();
    assert_eq!(config.default_style, EscapeStyle::Single);
    assert!(config.detect_language);
    assert!(config.hover.enabled);
    assert!(config.hover.only_with_escapes);
    assert_eq!(config.scratch, ScratchConfig::default());
    assert!(config.scratch.cleanup_on_startup);
    assert_eq!(
        config.scratch.stale_after(),
        std::time::Duration::from_secs(24 * 60 * 60)
    );
    assert_eq!(config.editor, None);
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let mut config = LensConfig::default();
    config.default_style = EscapeStyle::Double;
    config.hover.max_lines = 5;
    config.scratch.directory = Some(dir.path().join("scratch"));
    config.editor = Some("nano -w".to_string());

    config.save_to(&path).unwrap();
    assert_eq!(LensConfig::load_from(&path), config);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "default_style: absent\nhover:\n  max_lines: 3\n").unwrap();

    let config = LensConfig::load_from(&path);
    assert_eq!(config.default_style, EscapeStyle::Absent);
    assert_eq!(config.hover.max_lines, 3);
    assert!(config.hover.enabled);
    assert!(config.detect_language);
}

#[test]
fn test_malformed_or_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    assert_eq!(LensConfig::load_from(&path), LensConfig::default());

    std::fs::write(&path, "default_style: [not, a, style]\n").unwrap();
    assert_eq!(LensConfig::load_from(&path), LensConfig::default());
}

#[test]
fn test_configured_editor_wins() {
    let config = LensConfig {
        editor: Some("code --wait".to_string()),
        ..LensConfig::default()
    };
    assert_eq!(config.editor_command(), "code --wait");
}
