use tempfile::TempDir;

#[test]
fn test_config_lifecycle() {
    // Create a temporary directory for test config
    let temp_dir = TempDir::new().unwrap();

    // Override the config path for testing
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    // Test that config doesn't exist initially
    assert!(!wavebridge::config::Config::exists().unwrap());

    // Missing file means defaults
    let config = wavebridge::config::Config::load().unwrap();
    assert_eq!(config.poll_interval_ms, 30);
    assert_eq!(config.log_level, "info");

    // Create and save a config
    config.save().unwrap();
    assert!(wavebridge::config::Config::exists().unwrap());

    // Test config mutation
    let mut config = wavebridge::config::Config::load().unwrap();
    config.set_value("poll_interval_ms", "15").unwrap();
    config.set_value("log_level", "debug").unwrap();
    config.save().unwrap();

    // Verify mutations persisted
    let reloaded = wavebridge::config::Config::load().unwrap();
    assert_eq!(reloaded.poll_interval_ms, 15);
    assert_eq!(reloaded.log_level, "debug");

    // Test invalid key
    let mut config = wavebridge::config::Config::load().unwrap();
    assert!(config.set_value("invalid_key", "value").is_err());
}
