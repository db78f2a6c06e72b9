pub mod config;
pub mod play;
pub mod sim;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::error::Error;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use wavebridge::events::PlayerEvent;
use wavebridge::media::MediaElement;
use wavebridge::player::Player;

/// Progress bar resolution (positions per run)
const BAR_TICKS: u64 = 1000;

fn print_event(event: &PlayerEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => log::error!("failed to serialize {event}: {e}"),
        }
        return;
    }

    let stamp = chrono::Local::now().format("%H:%M:%S%.3f");
    let label = match event {
        PlayerEvent::Loaded { .. } => format!("{}", event.cyan().bold()),
        PlayerEvent::Play { .. } => format!("{}", event.green()),
        PlayerEvent::Pause { .. } => format!("{}", event.yellow()),
        PlayerEvent::Seek { .. } => format!("{}", event.magenta()),
        PlayerEvent::TimeUpdate { .. } => format!("{}", event.dimmed()),
    };
    println!("{} {label}", stamp.dimmed());
}

fn playback_bar(duration: Option<f64>, json: bool) -> Option<ProgressBar> {
    let duration = duration?;
    if json || duration <= 0.0 {
        return None;
    }
    let bar = ProgressBar::new(BAR_TICKS);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    Some(bar)
}

/// Drain forwarded events and track the playhead until playback stops.
///
/// Segment playback is over when the player's poll has torn itself down;
/// free playback is over when the element reports itself paused again (end
/// of media or an external stop).
pub(crate) fn watch_transport(
    player: &Player,
    media: &Arc<dyn MediaElement>,
    events: &Receiver<PlayerEvent>,
    segment_mode: bool,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let duration = player.duration();
    let bar = playback_bar(duration, json);
    let started = Instant::now();

    loop {
        while let Ok(event) = events.try_recv() {
            print_event(&event, json);
        }

        let position = player.current_time();
        if let (Some(bar), Some(duration)) = (&bar, duration) {
            let ratio = (position / duration).clamp(0.0, 1.0);
            bar.set_position((ratio * BAR_TICKS as f64) as u64);
            bar.set_message(format!("{position:.1}s / {duration:.1}s"));
        }

        let finished = if segment_mode {
            !player.is_segment_active()
        } else {
            // grace period: the element reports paused until play() lands
            media.paused() && started.elapsed() > Duration::from_millis(200)
        };
        if finished {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    // events raised during the final tick
    while let Ok(event) = events.try_recv() {
        print_event(&event, json);
    }
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    if !json {
        println!(
            "{} stopped at {:.2}s",
            "done:".cyan().bold(),
            player.current_time()
        );
    }
    Ok(())
}
