//! Typed playback events forwarded to the host.
//!
//! The host consumes playback state changes as a closed set of variants
//! rather than free-form name/payload pairs, so a mismatched payload is a
//! compile error instead of a silent runtime surprise. Every forwarded
//! variant carries the media position, in seconds, at the moment the native
//! event fired.

use serde::Serialize;
use std::fmt;
use std::sync::mpsc;

/// Events the player adapter emits toward the host event bus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum PlayerEvent {
    /// The media element reported itself fully loaded at bind time.
    /// Fired at most once per binding.
    Loaded { duration: Option<f64> },
    /// Forwarded native time update
    TimeUpdate { time: f64 },
    /// Playback started or resumed
    Play { time: f64 },
    /// Playback paused
    Pause { time: f64 },
    /// A seek completed
    Seek { time: f64 },
}

impl PlayerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerEvent::Loaded { .. } => "loaded",
            PlayerEvent::TimeUpdate { .. } => "timeupdate",
            PlayerEvent::Play { .. } => "play",
            PlayerEvent::Pause { .. } => "pause",
            PlayerEvent::Seek { .. } => "seek",
        }
    }
}

impl fmt::Display for PlayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerEvent::Loaded { duration: Some(d) } => write!(f, "loaded ({d:.2}s)"),
            PlayerEvent::Loaded { duration: None } => write!(f, "loaded"),
            PlayerEvent::TimeUpdate { time } => write!(f, "timeupdate @ {time:.2}s"),
            PlayerEvent::Play { time } => write!(f, "play @ {time:.2}s"),
            PlayerEvent::Pause { time } => write!(f, "pause @ {time:.2}s"),
            PlayerEvent::Seek { time } => write!(f, "seek @ {time:.2}s"),
        }
    }
}

/// Host-side sink for forwarded events.
///
/// Forwarding callbacks run on whatever thread the media element dispatches
/// from, so sinks must be shareable across threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PlayerEvent);
}

impl EventSink for mpsc::Sender<PlayerEvent> {
    fn emit(&self, event: PlayerEvent) {
        if self.send(event).is_err() {
            log::debug!("event receiver dropped, discarding {event}");
        }
    }
}
