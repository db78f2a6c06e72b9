//! Playback adapter between a media element and the host event bus.
//!
//! The [`Player`] binds to a [`MediaElement`], forwards its native events
//! (time update, play, pause, seeked) to the host as typed [`PlayerEvent`]s,
//! and offers time-based control on top: play, pause, seek, and bounded
//! segment playback with auto-stop. The media element stays the single
//! source of truth for playback state; the adapter keeps no cache beyond its
//! own listener bookkeeping.

use crate::constants::SEGMENT_POLL_INTERVAL;
use crate::error::Error;
use crate::events::{EventSink, PlayerEvent};
use crate::media::{ListenerId, MediaElement, MediaEvent, ReadyState};
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A caller-supplied time interval to play and auto-stop.
///
/// Bounds are seconds. Non-finite or negative bounds make the segment
/// invalid; an empty or inverted interval is still valid and degenerates to
/// a near-zero-length play.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start_time: f64,
    pub end_time: f64,
}

impl Segment {
    pub fn new(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    fn is_valid(&self) -> bool {
        self.start_time.is_finite()
            && self.end_time.is_finite()
            && self.start_time >= 0.0
            && self.end_time >= 0.0
    }
}

/// A running segment-end watcher. Cancellation stops the flag and joins the
/// thread, so a cancelled poll can never fire its stop condition afterwards.
struct SegmentPoll {
    stop: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl SegmentPoll {
    fn cancel(self) {
        self.stop.store(true, Ordering::Relaxed);
        // the poll sleeps at most one interval, so the join is bounded
        let _ = self.thread.join();
    }
}

pub struct Player {
    events: Arc<dyn EventSink>,
    media: Option<Arc<dyn MediaElement>>,
    listeners: Vec<ListenerId>,
    poll: Option<SegmentPoll>,
    poll_interval: Duration,
}

impl Player {
    /// Construct an adapter bound to a host event sink. No media element is
    /// attached until [`init`](Self::init).
    pub fn new(events: impl EventSink + 'static) -> Self {
        Self {
            events: Arc::new(events),
            media: None,
            listeners: Vec::new(),
            poll: None,
            poll_interval: SEGMENT_POLL_INTERVAL,
        }
    }

    /// Override the segment poll interval. Overshoot past a segment end stays
    /// bounded by one interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bind to a media element and wire event forwarding.
    ///
    /// If the element already reports itself fully loaded, `Loaded` is
    /// emitted immediately so the host does not have to race readiness
    /// against registration. Binding twice is an error and registers
    /// nothing the second time.
    pub fn init(&mut self, media: Arc<dyn MediaElement>) -> Result<(), Error> {
        if self.media.is_some() {
            return Err(Error::AlreadyInitialized);
        }

        if media.ready_state() == ReadyState::HaveEnoughData {
            self.events.emit(PlayerEvent::Loaded {
                duration: media.duration(),
            });
        }

        let forwards: [(MediaEvent, fn(f64) -> PlayerEvent); 4] = [
            (MediaEvent::TimeUpdate, |time| PlayerEvent::TimeUpdate { time }),
            (MediaEvent::Play, |time| PlayerEvent::Play { time }),
            (MediaEvent::Pause, |time| PlayerEvent::Pause { time }),
            (MediaEvent::Seeked, |time| PlayerEvent::Seek { time }),
        ];
        for (native, wrap) in forwards {
            let events = self.events.clone();
            let id = media.add_listener(native, Box::new(move |time| events.emit(wrap(time))));
            self.listeners.push(id);
        }

        self.media = Some(media);
        Ok(())
    }

    /// Unwind event forwarding and stop any active segment poll.
    ///
    /// Every registration made in [`init`](Self::init) is revoked exactly
    /// once; afterwards native events on the element produce no emissions.
    /// Calling this twice is safe, and a destroyed player may be bound to a
    /// new element.
    pub fn destroy(&mut self) {
        if let Some(media) = self.media.take() {
            for id in self.listeners.drain(..) {
                media.remove_listener(id);
            }
        }
        if let Some(poll) = self.poll.take() {
            poll.cancel();
        }
    }

    pub fn play(&self) {
        if let Some(media) = &self.media {
            media.play();
        }
    }

    pub fn pause(&self) {
        if let Some(media) = &self.media {
            media.pause();
        }
    }

    /// Live playhead position in seconds; 0.0 before binding
    pub fn current_time(&self) -> f64 {
        self.media.as_ref().map(|m| m.current_time()).unwrap_or(0.0)
    }

    /// Live duration in seconds, re-queried from the element on every call
    pub fn duration(&self) -> Option<f64> {
        self.media.as_ref().and_then(|m| m.duration())
    }

    pub fn source(&self) -> Option<String> {
        self.media.as_ref().and_then(|m| m.source())
    }

    /// Assign the element's source locator. No validation happens here;
    /// bad sources surface through the element's own behavior.
    pub fn set_source(&self, source: &str) {
        if let Some(media) = &self.media {
            media.set_source(source);
        }
    }

    /// Move the playhead to `time` seconds. No clamping; out-of-range values
    /// are handled however the element handles them.
    pub fn seek(&self, time: f64) {
        if let Some(media) = &self.media {
            media.set_current_time(time);
        }
    }

    /// Play `[start_time, end_time]` and auto-stop at the end.
    ///
    /// Native time updates are too coarse to catch the boundary, so a
    /// fixed-rate poll watches for the crossing; overshoot is bounded by one
    /// poll interval. An external pause during segment playback is treated
    /// as a stop condition and tears the poll down. Starting a new segment
    /// cancels any poll still in flight.
    ///
    /// An invalid segment is reported through the log and changes nothing.
    pub fn play_segment(&mut self, segment: Segment) {
        if !segment.is_valid() {
            error!(
                "invalid segment bounds: start={} end={}",
                segment.start_time, segment.end_time
            );
            return;
        }
        let Some(media) = self.media.clone() else {
            error!("play_segment called before a media element was bound");
            return;
        };

        if let Some(poll) = self.poll.take() {
            poll.cancel();
        }

        media.set_current_time(segment.start_time);
        media.play();

        let stop = Arc::new(AtomicBool::new(false));
        let done = Arc::new(AtomicBool::new(false));
        let interval = self.poll_interval;
        let thread = thread::spawn({
            let stop = stop.clone();
            let done = done.clone();
            let media = media.clone();
            move || {
                loop {
                    thread::sleep(interval);
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    if media.current_time() >= segment.end_time || media.paused() {
                        // pausing an already-paused element is a no-op
                        media.pause();
                        break;
                    }
                }
                done.store(true, Ordering::Relaxed);
            }
        });
        debug!(
            "segment poll started: {:.3}s..{:.3}s",
            segment.start_time, segment.end_time
        );
        self.poll = Some(SegmentPoll { stop, done, thread });
    }

    /// True while a segment poll is still watching for its end boundary
    pub fn is_segment_active(&self) -> bool {
        self.poll
            .as_ref()
            .is_some_and(|poll| !poll.done.load(Ordering::Relaxed))
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{ListenerRegistry, MediaCallback};
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::time::Instant;

    /// Media element scripted for deterministic adapter tests: every
    /// `current_time` read advances the playhead by a fixed step.
    struct ScriptedMedia {
        registry: ListenerRegistry,
        time_millis: AtomicUsize,
        step_millis: usize,
        paused: AtomicBool,
        ready: ReadyState,
        source: Mutex<Option<String>>,
        plays: AtomicUsize,
        pauses: AtomicUsize,
        seeks: AtomicUsize,
    }

    impl ScriptedMedia {
        fn new(step_secs: f64, ready: ReadyState) -> Self {
            Self {
                registry: ListenerRegistry::new(),
                time_millis: AtomicUsize::new(0),
                step_millis: (step_secs * 1000.0) as usize,
                paused: AtomicBool::new(true),
                ready,
                source: Mutex::new(None),
                plays: AtomicUsize::new(0),
                pauses: AtomicUsize::new(0),
                seeks: AtomicUsize::new(0),
            }
        }
    }

    impl MediaElement for ScriptedMedia {
        fn play(&self) {
            self.plays.fetch_add(1, Ordering::SeqCst);
            self.paused.store(false, Ordering::SeqCst);
        }

        fn pause(&self) {
            self.pauses.fetch_add(1, Ordering::SeqCst);
            self.paused.store(true, Ordering::SeqCst);
        }

        fn paused(&self) -> bool {
            self.paused.load(Ordering::SeqCst)
        }

        fn current_time(&self) -> f64 {
            let advanced = self
                .time_millis
                .fetch_add(self.step_millis, Ordering::SeqCst)
                + self.step_millis;
            advanced as f64 / 1000.0
        }

        fn set_current_time(&self, time: f64) {
            self.seeks.fetch_add(1, Ordering::SeqCst);
            self.time_millis
                .store((time * 1000.0) as usize, Ordering::SeqCst);
        }

        fn duration(&self) -> Option<f64> {
            Some(60.0)
        }

        fn source(&self) -> Option<String> {
            self.source.lock().unwrap().clone()
        }

        fn set_source(&self, source: &str) {
            *self.source.lock().unwrap() = Some(source.to_string());
        }

        fn ready_state(&self) -> ReadyState {
            self.ready
        }

        fn add_listener(&self, event: MediaEvent, callback: MediaCallback) -> ListenerId {
            self.registry.add(event, callback)
        }

        fn remove_listener(&self, id: ListenerId) {
            self.registry.remove(id);
        }
    }

    fn wait_until(what: &str, condition: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !condition() {
            if Instant::now() > deadline {
                panic!("timed out waiting for {what}");
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_init_registers_four_forwarders() {
        let (tx, _rx) = mpsc::channel();
        let media = Arc::new(ScriptedMedia::new(0.0, ReadyState::HaveNothing));
        let mut player = Player::new(tx);

        player.init(media.clone()).unwrap();
        assert_eq!(media.registry.len(), 4);
    }

    #[test]
    fn test_loaded_emitted_iff_ready() {
        let (tx, rx) = mpsc::channel();
        let media = Arc::new(ScriptedMedia::new(0.0, ReadyState::HaveEnoughData));
        let mut player = Player::new(tx);
        player.init(media).unwrap();
        assert_eq!(
            rx.try_recv(),
            Ok(PlayerEvent::Loaded {
                duration: Some(60.0)
            })
        );

        let (tx, rx) = mpsc::channel();
        let media = Arc::new(ScriptedMedia::new(0.0, ReadyState::HaveMetadata));
        let mut player = Player::new(tx);
        player.init(media).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_double_init_errors_and_registers_nothing() {
        let (tx, _rx) = mpsc::channel();
        let media = Arc::new(ScriptedMedia::new(0.0, ReadyState::HaveNothing));
        let mut player = Player::new(tx);

        player.init(media.clone()).unwrap();
        let again = Arc::new(ScriptedMedia::new(0.0, ReadyState::HaveNothing));
        assert!(matches!(
            player.init(again.clone()),
            Err(Error::AlreadyInitialized)
        ));
        assert_eq!(media.registry.len(), 4);
        assert_eq!(again.registry.len(), 0);
    }

    #[test]
    fn test_native_events_forward_with_payload() {
        let (tx, rx) = mpsc::channel();
        let media = Arc::new(ScriptedMedia::new(0.0, ReadyState::HaveNothing));
        let mut player = Player::new(tx);
        player.init(media.clone()).unwrap();

        media.registry.dispatch(MediaEvent::Play, 1.5);
        media.registry.dispatch(MediaEvent::TimeUpdate, 1.75);
        media.registry.dispatch(MediaEvent::Pause, 2.0);
        media.registry.dispatch(MediaEvent::Seeked, 0.25);

        assert_eq!(rx.try_recv(), Ok(PlayerEvent::Play { time: 1.5 }));
        assert_eq!(rx.try_recv(), Ok(PlayerEvent::TimeUpdate { time: 1.75 }));
        assert_eq!(rx.try_recv(), Ok(PlayerEvent::Pause { time: 2.0 }));
        assert_eq!(rx.try_recv(), Ok(PlayerEvent::Seek { time: 0.25 }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_destroy_leaves_no_dangling_listeners() {
        let (tx, rx) = mpsc::channel();
        let media = Arc::new(ScriptedMedia::new(0.0, ReadyState::HaveNothing));
        let mut player = Player::new(tx);
        player.init(media.clone()).unwrap();

        player.destroy();
        assert!(media.registry.is_empty());

        media.registry.dispatch(MediaEvent::Play, 1.0);
        media.registry.dispatch(MediaEvent::TimeUpdate, 1.1);
        assert!(rx.try_recv().is_err());

        // destroy is idempotent
        player.destroy();
    }

    #[test]
    fn test_invalid_segment_has_no_side_effects() {
        let (tx, _rx) = mpsc::channel();
        let media = Arc::new(ScriptedMedia::new(0.0, ReadyState::HaveNothing));
        let mut player = Player::new(tx);
        player.init(media.clone()).unwrap();

        player.play_segment(Segment::new(f64::NAN, 5.0));
        player.play_segment(Segment::new(2.0, f64::INFINITY));
        player.play_segment(Segment::new(-1.0, 5.0));

        assert_eq!(media.plays.load(Ordering::SeqCst), 0);
        assert_eq!(media.seeks.load(Ordering::SeqCst), 0);
        assert!(!player.is_segment_active());
    }

    #[test]
    fn test_segment_stops_once_past_end() {
        let (tx, _rx) = mpsc::channel();
        // every poll tick advances the playhead half a second
        let media = Arc::new(ScriptedMedia::new(0.5, ReadyState::HaveEnoughData));
        let mut player = Player::new(tx).with_poll_interval(Duration::from_millis(5));
        player.init(media.clone()).unwrap();

        player.play_segment(Segment::new(2.0, 4.0));
        assert_eq!(media.plays.load(Ordering::SeqCst), 1);
        assert_eq!(media.seeks.load(Ordering::SeqCst), 1);

        wait_until("segment poll to finish", || !player.is_segment_active());
        assert_eq!(media.pauses.load(Ordering::SeqCst), 1);
        assert!(media.paused());
    }

    #[test]
    fn test_degenerate_segment_stops_immediately() {
        let (tx, _rx) = mpsc::channel();
        let media = Arc::new(ScriptedMedia::new(0.1, ReadyState::HaveEnoughData));
        let mut player = Player::new(tx).with_poll_interval(Duration::from_millis(5));
        player.init(media.clone()).unwrap();

        player.play_segment(Segment::new(3.0, 3.0));
        wait_until("degenerate segment to stop", || !player.is_segment_active());
        assert_eq!(media.pauses.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_external_pause_tears_down_poll() {
        let (tx, _rx) = mpsc::channel();
        let media = Arc::new(ScriptedMedia::new(0.001, ReadyState::HaveEnoughData));
        let mut player = Player::new(tx).with_poll_interval(Duration::from_millis(5));
        player.init(media.clone()).unwrap();

        player.play_segment(Segment::new(0.0, 500.0));
        media.pause();

        wait_until("poll to observe external pause", || {
            !player.is_segment_active()
        });
        // one external pause plus the poll's own teardown pause
        assert_eq!(media.pauses.load(Ordering::SeqCst), 2);
        assert!(media.paused());
    }

    #[test]
    fn test_new_segment_cancels_previous_poll() {
        let (tx, _rx) = mpsc::channel();
        let media = Arc::new(ScriptedMedia::new(0.001, ReadyState::HaveEnoughData));
        let mut player = Player::new(tx).with_poll_interval(Duration::from_millis(5));
        player.init(media.clone()).unwrap();

        player.play_segment(Segment::new(0.0, 500.0));
        assert!(player.is_segment_active());

        // cancelled poll must not pause; only the fresh one stops playback
        player.play_segment(Segment::new(1.0, 1.05));
        assert_eq!(media.plays.load(Ordering::SeqCst), 2);
        assert_eq!(media.seeks.load(Ordering::SeqCst), 2);

        wait_until("fresh segment to finish", || !player.is_segment_active());
        assert_eq!(media.pauses.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_accessors_read_through() {
        let (tx, _rx) = mpsc::channel();
        let media = Arc::new(ScriptedMedia::new(0.0, ReadyState::HaveNothing));
        let mut player = Player::new(tx);

        // unbound player reports neutral values
        assert_eq!(player.current_time(), 0.0);
        assert_eq!(player.duration(), None);
        assert_eq!(player.source(), None);

        player.init(media.clone()).unwrap();
        player.set_source("takes/one.wav");
        assert_eq!(player.source(), Some("takes/one.wav".to_string()));
        assert_eq!(player.duration(), Some(60.0));

        player.seek(12.5);
        assert_eq!(media.seeks.load(Ordering::SeqCst), 1);
    }
}
