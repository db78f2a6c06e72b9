use std::error::Error;
use wavebridge::config::Config;

pub fn handle_config_view() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    println!("Current wavebridge configuration:");
    println!("  poll_interval_ms: {}", config.poll_interval_ms);
    println!("  log_level: {}", config.log_level);
    println!(
        "  log_file: {}",
        config.log_file.as_deref().unwrap_or("(none)")
    );

    Ok(())
}

pub fn handle_config_set(key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;

    config.set_value(key, value)?;
    config.save()?;

    println!("Configuration updated: {key} = {value}");

    Ok(())
}
