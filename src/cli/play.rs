use std::error::Error;

/// Audition a file, or a bounded slice of it, through the default audio
/// output. `--from`/`--to` select the segment; with neither, the whole file
/// plays.
#[cfg(feature = "playback")]
pub fn handle_play(
    file: &str,
    from: Option<f64>,
    to: Option<f64>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    use owo_colors::OwoColorize;
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::time::Duration;
    use wavebridge::config::Config;
    use wavebridge::constants::AUDIO_EXTENSIONS;
    use wavebridge::media::{MediaElement, ReadyState, output::AudioOutput};
    use wavebridge::player::{Player, Segment};

    let expanded = shellexpand::tilde(file);
    let path = Path::new(expanded.as_ref());
    if !path.exists() {
        return Err(format!("{} does not exist", path.display()).into());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        println!(
            "{} '{ext}' is not a known audio extension, trying anyway",
            "Note:".yellow()
        );
    }

    if !json {
        print_banner(path, &ext);
    }

    let config = Config::load()?;
    let output = AudioOutput::new()?;
    let media = output.media();

    media.set_source(&expanded);
    if media.ready_state() != ReadyState::HaveEnoughData {
        return Err(format!("could not load {}", path.display()).into());
    }

    let (tx, rx) = mpsc::channel();
    let mut player =
        Player::new(tx).with_poll_interval(Duration::from_millis(config.poll_interval_ms));
    let media: Arc<dyn MediaElement> = media;
    player.init(media.clone())?;

    let segment = resolve_segment(from, to);
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

#[cfg(feature = "playback")]
fn resolve_segment(
    from: Option<f64>,
    to: Option<f64>,
) -> Option<wavebridge::player::Segment> {
    use wavebridge::player::Segment;
    // an end bound is what makes it a segment; a lone --from is just a seek
    to.map(|end| Segment::new(from.unwrap_or(0.0), end))
}

/// WAV headers are cheap to read, so show the format up front the way the
/// decoder will see it. Other formats just get the file name.
#[cfg(feature = "playback")]
fn print_banner(path: &std::path::Path, ext: &str) {
    use owo_colors::OwoColorize;

    println!("{} {}", "▶".cyan(), path.display().to_string().bold());
    if ext == "wav" {
        if let Ok(reader) = hound::WavReader::open(path) {
            let spec = reader.spec();
            let seconds = reader.duration() as f64 / spec.sample_rate as f64;
            println!(
                "  {} Hz · {} ch · {}-bit · {seconds:.1}s",
                spec.sample_rate, spec.channels, spec.bits_per_sample
            );
        }
    }
}

#[cfg(not(feature = "playback"))]
pub fn handle_play(
    _file: &str,
    _from: Option<f64>,
    _to: Option<f64>,
    _json: bool,
) -> Result<(), Box<dyn Error>> {
    use owo_colors::OwoColorize;

    println!(
        "{} Real playback requires the 'playback' feature to be enabled.",
        "Note:".yellow()
    );
    println!();
    println!("To enable it, install with:");
    println!("  {}", "cargo install wavebridge --features playback".cyan());
    println!();
    println!("The 'sim' command works without it.");

    Ok(())
}
