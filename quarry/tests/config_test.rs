//! Tests for config loading and saving

use quarry::{Config, Error};
use tempfile::tempdir;

#[test]
fn test_load_or_default_without_file() {
    let temp = tempdir().unwrap();
    let config = Config::load_or_default(&temp.path().join("quarry.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_then_load() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("nested").join("quarry.toml");

    let mut config = Config::default();
    config.session.page_limit = 50;
    config.session.id_field = "uuid".to_string();
    config.source.default_size = 25;
    config.filters.per_value_term_fields = vec!["amenity".to_string()];
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_partial_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("quarry.toml");
    std::fs::write(&path, "[session]\nscroll_keep_alive = \"5m\"\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.session.scroll_keep_alive, "5m");
    assert_eq!(config.session.page_limit, 20);
    assert_eq!(config.source.default_size, 10);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let temp = tempdir().unwrap();
    let err = Config::load(&temp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_load_invalid_file_is_config_error() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("quarry.toml");
    std::fs::write(&path, "[session]\npage_limit = \"many\"\n").unwrap();
    assert!(matches!(Config::load(&path), Err(Error::Config(_))));
}
