use tempfile::TempDir;
use treeaccess::config::Config;

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let config = Config {
        keep_root_expanded: false,
        indent_size: 4,
        show_guides: false,
        ..Default::default()
    };

    config.save_to(&path).unwrap();
    assert_eq!(Config::load_from(&path), config);
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from(&dir.path().join("absent.toml"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "enable_mouse = false\nmessage_timeout_ms = 500\n").unwrap();

    let config = Config::load_from(&path);
    assert!(!config.enable_mouse);
    assert_eq!(config.message_timeout_ms, 500);
    assert!(config.expand_on_load);
    assert_eq!(config.indent_size, 2);
}

#[test]
fn test_invalid_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "indent_size = \"wide\"").unwrap();
    assert_eq!(Config::load_from(&path), Config::default());
}
