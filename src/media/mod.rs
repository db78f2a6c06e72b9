//! Native media element contract consumed by the player adapter.
//!
//! This module defines the surface a playable media resource must expose:
//! transport control, a mutable playhead, a readable duration, a mutable
//! source locator, a readiness indicator, and named-event listener
//! registration. Two implementations ship with the crate: a clock-driven
//! stand-in for headless use ([`clock::ClockMedia`]) and a rodio-backed
//! element for real audio output (`output::RodioMedia`, behind the
//! `playback` feature).

pub mod clock;
#[cfg(feature = "playback")]
pub mod output;

use std::sync::Mutex;
use uuid::Uuid;

/// Named events a media element raises toward its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaEvent {
    TimeUpdate,
    Play,
    Pause,
    Seeked,
}

/// Readiness ladder reported by a media element. `HaveEnoughData` is the
/// "fully loaded" value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

/// Revocable handle for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

/// Listener callbacks receive the element's current time in seconds at the
/// moment the event fired. Dispatch may happen from a ticker thread.
pub type MediaCallback = Box<dyn Fn(f64) + Send + Sync>;

/// The native playable resource the player adapter drives.
///
/// Implementations own all playback state; callers treat the element as the
/// single source of truth and keep no cache of their own.
pub trait MediaElement: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn paused(&self) -> bool;

    /// Playhead position in seconds
    fn current_time(&self) -> f64;
    /// Move the playhead. Out-of-range values are clamped or ignored at the
    /// element's discretion.
    fn set_current_time(&self, time: f64);

    /// Total duration in seconds, `None` until known
    fn duration(&self) -> Option<f64>;

    fn source(&self) -> Option<String>;
    /// Assign a source locator. Loading happens eagerly; failures are the
    /// element's own concern and are observable through `ready_state`.
    fn set_source(&self, source: &str);

    fn ready_state(&self) -> ReadyState;

    fn add_listener(&self, event: MediaEvent, callback: MediaCallback) -> ListenerId;
    fn remove_listener(&self, id: ListenerId);
}

/// Listener bookkeeping shared by the bundled media elements.
///
/// Registrations are held as an owned list of (id, event, callback) entries;
/// removal revokes exactly the entry the id was minted for. Callbacks run
/// under the registry lock and must not call back into the registry.
pub struct ListenerRegistry {
    entries: Mutex<Vec<(ListenerId, MediaEvent, MediaCallback)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, event: MediaEvent, callback: MediaCallback) -> ListenerId {
        let id = ListenerId(Uuid::new_v4());
        self.entries.lock().unwrap().push((id, event, callback));
        id
    }

    pub fn remove(&self, id: ListenerId) {
        self.entries.lock().unwrap().retain(|(entry, _, _)| *entry != id);
    }

    /// Invoke every callback registered for `event`, in registration order.
    pub fn dispatch(&self, event: MediaEvent, time: f64) {
        let entries = self.entries.lock().unwrap();
        for (_, kind, callback) in entries.iter() {
            if *kind == event {
                callback(time);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_callback(counter: &Arc<AtomicUsize>) -> MediaCallback {
        let counter = counter.clone();
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_dispatch_reaches_matching_listeners_only() {
        let registry = ListenerRegistry::new();
        let plays = Arc::new(AtomicUsize::new(0));
        let pauses = Arc::new(AtomicUsize::new(0));

        registry.add(MediaEvent::Play, counting_callback(&plays));
        registry.add(MediaEvent::Pause, counting_callback(&pauses));

        registry.dispatch(MediaEvent::Play, 1.0);
        registry.dispatch(MediaEvent::Play, 2.0);

        assert_eq!(plays.load(Ordering::SeqCst), 2);
        assert_eq!(pauses.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove_revokes_single_registration() {
        let registry = ListenerRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        let keep = registry.add(MediaEvent::TimeUpdate, counting_callback(&count));
        let revoke = registry.add(MediaEvent::TimeUpdate, counting_callback(&count));
        registry.remove(revoke);

        assert_eq!(registry.len(), 1);
        registry.dispatch(MediaEvent::TimeUpdate, 0.5);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        registry.remove(keep);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_callback_receives_dispatch_time() {
        let registry = ListenerRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        registry.add(
            MediaEvent::Seeked,
            Box::new(move |time| sink.lock().unwrap().push(time)),
        );

        registry.dispatch(MediaEvent::Seeked, 4.25);
        assert_eq!(*seen.lock().unwrap(), vec![4.25]);
    }
}
