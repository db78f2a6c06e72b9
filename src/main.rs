//! wavebridge - media element adapter and segment audition tool.
//!
//! The library half of this crate adapts a native-style media element to a
//! waveform UI's event bus: it forwards transport events as a typed event
//! set and plays bounded time segments with auto-stop, polling the playhead
//! because native time updates are too coarse for precise boundaries.
//!
//! The binary wraps that adapter in a small terminal workflow:
//!
//! 1. **play**: audition an audio file, or a `--from`/`--to` slice of it,
//!    through the default output device, printing the forwarded events.
//!
//! 2. **sim**: the same flow against a clock-driven stand-in element, for
//!    demonstrating the adapter on machines with no audio device.

use clap::{CommandFactory, Parser, Subcommand, builder::PossibleValuesParser};
use clap_complete::{Generator, Shell, generate};
use std::error::Error;
use std::io;
use wavebridge::config::Config;

mod cli;

#[derive(Parser)]
#[command(name = "wavebridge")]
#[command(about = "Media element adapter and segment audition tool for waveform UIs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an audio file, or a bounded segment of it
    Play {
        /// Path to the audio file
        file: String,
        /// Segment start in seconds (with no --to, just seeks here)
        #[arg(long)]
        from: Option<f64>,
        /// Segment end in seconds; auto-stops when the playhead crosses it
        #[arg(long)]
        to: Option<f64>,
        /// Print forwarded events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Exercise the adapter against a clock-driven media element
    Sim {
        /// Simulated media duration in seconds
        #[arg(long, default_value_t = 30.0)]
        duration: f64,
        /// Segment start in seconds
        #[arg(long)]
        from: Option<f64>,
        /// Segment end in seconds
        #[arg(long)]
        to: Option<f64>,
        /// Print forwarded events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Show or change persistent configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// View current configuration
    View,
    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_parser = PossibleValuesParser::new(["poll_interval_ms", "log_level", "log_file"]))]
        key: String,
        /// Configuration value
        value: String,
    },
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}

fn init_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    use simplelog::{
        ColorChoice, CombinedLogger, SharedLogger, TermLogger, TerminalMode, WriteLogger,
    };
    use std::fs::File;

    let level = config
        .log_level
        .parse()
        .unwrap_or(log::LevelFilter::Info);

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(path) = &config.log_file {
        let expanded = shellexpand::tilde(path);
        loggers.push(WriteLogger::new(
            log::LevelFilter::Debug,
            simplelog::Config::default(),
            File::create(expanded.as_ref())?,
        ));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging(&Config::load()?)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            file,
            from,
            to,
            json,
        } => {
            cli::play::handle_play(&file, from, to, json)?;
        }
        Commands::Sim {
            duration,
            from,
            to,
            json,
        } => {
            cli::sim::handle_sim(duration, from, to, json)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::View => {
                cli::config::handle_config_view()?;
            }
            ConfigAction::Set { key, value } => {
                cli::config::handle_config_set(&key, &value)?;
            }
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
        }
    }

    Ok(())
}
