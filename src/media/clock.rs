//! Clock-driven stand-in media element.
//!
//! Advances its playhead against a monotonic clock while playing, with no
//! audio device and no decoding behind it. Used by the `sim` command and by
//! tests, where a real output stream is unavailable or unwanted.

use super::{ListenerId, ListenerRegistry, MediaCallback, MediaElement, MediaEvent, ReadyState};
use crate::constants::TIMEUPDATE_INTERVAL;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

struct ClockState {
    source: Option<String>,
    duration: Option<f64>,
    /// Playhead position at the moment `started` was set (or last pause)
    anchor: f64,
    /// Wall-clock anchor, `Some` while playing
    started: Option<Instant>,
}

impl ClockState {
    fn position(&self) -> f64 {
        let raw = match self.started {
            Some(started) => self.anchor + started.elapsed().as_secs_f64(),
            None => self.anchor,
        };
        match self.duration {
            Some(duration) => raw.min(duration),
            None => raw,
        }
    }

    fn at_end(&self) -> bool {
        self.duration.is_some_and(|d| self.position() >= d)
    }
}

pub struct ClockMedia {
    state: Arc<Mutex<ClockState>>,
    registry: Arc<ListenerRegistry>,
    ticker: Mutex<Option<Arc<AtomicBool>>>,
}

impl ClockMedia {
    /// A fully loaded element with a fixed duration in seconds.
    pub fn new(duration: f64) -> Self {
        Self::build(Some(duration))
    }

    /// An element with nothing loaded yet (`ReadyState::HaveNothing`).
    pub fn pending() -> Self {
        Self::build(None)
    }

    fn build(duration: Option<f64>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ClockState {
                source: None,
                duration,
                anchor: 0.0,
                started: None,
            })),
            registry: Arc::new(ListenerRegistry::new()),
            ticker: Mutex::new(None),
        }
    }

    fn start_ticker(&self) {
        let stop = Arc::new(AtomicBool::new(false));
        let state = self.state.clone();
        let registry = self.registry.clone();
        {
            let thread_stop = stop.clone();
            thread::spawn(move || {
                loop {
                    thread::sleep(TIMEUPDATE_INTERVAL);
                    if thread_stop.load(Ordering::Relaxed) {
                        break;
                    }
                    let (time, stopped) = {
                        let state = state.lock().unwrap();
                        (state.position(), state.started.is_none() || state.at_end())
                    };
                    if stopped {
                        break;
                    }
                    registry.dispatch(MediaEvent::TimeUpdate, time);
                }
            });
        }
        if let Some(previous) = self.ticker.lock().unwrap().replace(stop) {
            previous.store(true, Ordering::Relaxed);
        }
    }

    fn stop_ticker(&self) {
        if let Some(stop) = self.ticker.lock().unwrap().take() {
            stop.store(true, Ordering::Relaxed);
        }
    }
}

impl MediaElement for ClockMedia {
    fn play(&self) {
        let time = {
            let mut state = self.state.lock().unwrap();
            if state.started.is_none() {
                state.started = Some(Instant::now());
            }
            state.position()
        };
        self.start_ticker();
        self.registry.dispatch(MediaEvent::Play, time);
    }

    fn pause(&self) {
        let paused_at = {
            let mut state = self.state.lock().unwrap();
            if state.started.is_some() {
                let position = state.position();
                state.anchor = position;
                state.started = None;
                Some(position)
            } else {
                None
            }
        };
        self.stop_ticker();
        if let Some(time) = paused_at {
            self.registry.dispatch(MediaEvent::Pause, time);
        }
    }

    fn paused(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.started.is_none() || state.at_end()
    }

    fn current_time(&self) -> f64 {
        self.state.lock().unwrap().position()
    }

    fn set_current_time(&self, time: f64) {
        let clamped = {
            let mut state = self.state.lock().unwrap();
            let upper = state.duration.unwrap_or(f64::MAX);
            let clamped = time.clamp(0.0, upper);
            state.anchor = clamped;
            if state.started.is_some() {
                state.started = Some(Instant::now());
            }
            clamped
        };
        self.registry.dispatch(MediaEvent::Seeked, clamped);
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().unwrap().duration
    }

    fn source(&self) -> Option<String> {
        self.state.lock().unwrap().source.clone()
    }

    fn set_source(&self, source: &str) {
        // A stand-in has nothing to load; the locator is only stored for
        // read-back. Duration stays whatever it was configured as.
        self.state.lock().unwrap().source = Some(source.to_string());
    }

    fn ready_state(&self) -> ReadyState {
        match self.state.lock().unwrap().duration {
            Some(_) => ReadyState::HaveEnoughData,
            None => ReadyState::HaveNothing,
        }
    }

    fn add_listener(&self, event: MediaEvent, callback: MediaCallback) -> ListenerId {
        self.registry.add(event, callback)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.registry.remove(id);
    }
}

impl Drop for ClockMedia {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_playhead_advances_only_while_playing() {
        let media = ClockMedia::new(10.0);
        assert_eq!(media.current_time(), 0.0);
        assert!(media.paused());

        media.play();
        thread::sleep(Duration::from_millis(60));
        assert!(!media.paused());
        let mid = media.current_time();
        assert!(mid > 0.0, "playhead should move while playing, got {mid}");

        media.pause();
        let held = media.current_time();
        thread::sleep(Duration::from_millis(40));
        assert_eq!(media.current_time(), held);
    }

    #[test]
    fn test_clamps_at_duration_and_reports_paused() {
        let media = ClockMedia::new(0.05);
        media.play();
        thread::sleep(Duration::from_millis(90));
        assert_eq!(media.current_time(), 0.05);
        assert!(media.paused());
    }

    #[test]
    fn test_seek_clamps_to_bounds() {
        let media = ClockMedia::new(10.0);
        media.set_current_time(-3.0);
        assert_eq!(media.current_time(), 0.0);
        media.set_current_time(42.0);
        assert_eq!(media.current_time(), 10.0);
        media.set_current_time(4.5);
        assert_eq!(media.current_time(), 4.5);
    }

    #[test]
    fn test_ready_state_tracks_duration() {
        assert_eq!(ClockMedia::new(1.0).ready_state(), ReadyState::HaveEnoughData);
        assert_eq!(ClockMedia::pending().ready_state(), ReadyState::HaveNothing);
    }

    #[test]
    fn test_source_round_trip() {
        let media = ClockMedia::new(1.0);
        assert_eq!(media.source(), None);
        media.set_source("clock://demo");
        assert_eq!(media.source(), Some("clock://demo".to_string()));
    }

    #[test]
    fn test_pause_event_fires_only_on_transition() {
        use std::sync::atomic::AtomicUsize;

        let media = ClockMedia::new(10.0);
        let pauses = Arc::new(AtomicUsize::new(0));
        let counter = pauses.clone();
        media.add_listener(
            MediaEvent::Pause,
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        media.play();
        media.pause();
        media.pause();
        assert_eq!(pauses.load(Ordering::SeqCst), 1);
    }
}
