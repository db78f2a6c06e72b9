use owo_colors::OwoColorize;
use std::error::Error;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;
use wavebridge::config::Config;
use wavebridge::media::{MediaElement, clock::ClockMedia};
use wavebridge::player::{Player, Segment};

/// Run the adapter against the clock-driven element. Behaves like `play`
/// but needs no audio device and no file, which makes it useful for
/// demonstrating event forwarding and segment auto-stop headlessly.
pub fn handle_sim(
    duration: f64,
    from: Option<f64>,
    to: Option<f64>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(format!("duration must be a positive number of seconds, got {duration}").into());
    }

    if !json {
        println!("{} clock media, {duration:.1}s", "▶".cyan());
    }

    let config = Config::load()?;
    let media: Arc<dyn MediaElement> = Arc::new(ClockMedia::new(duration));
    media.set_source(&format!("clock://{duration}s"));

    let (tx, rx) = mpsc::channel();
    let mut player =
        Player::new(tx).with_poll_interval(Duration::from_millis(config.poll_interval_ms));
    player.init(media.clone())?;

    let segment = to.map(|end| Segment::new(from.unwrap_or(0.0), end));
    match segment {
        Some(segment) => player.play_segment(segment),
        None => {
            if let Some(start) = from {
                player.seek(start);
            }
            player.play();
        }
    }

    super::watch_transport(&player, &media, &rx, segment.is_some(), json)?;
    player.destroy();
    Ok(())
}
