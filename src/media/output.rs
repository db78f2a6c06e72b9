//! Rodio-backed media element.
//!
//! Realizes the media contract on top of a rodio output stream and sink.
//! Decoding is delegated entirely to rodio's decoder; this module only wires
//! transport control, the playhead, and event dispatch. The output stream
//! itself is not shareable across threads, so it stays with [`AudioOutput`]
//! on the owning thread while the sink-backed element is handed out as an
//! `Arc`.

use super::{ListenerId, ListenerRegistry, MediaCallback, MediaElement, MediaEvent, ReadyState};
use crate::constants::TIMEUPDATE_INTERVAL;
use crate::error::Error;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use std::fs::File;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Owns the output stream and the shared media element connected to it.
pub struct AudioOutput {
    _stream: OutputStream,
    media: Arc<RodioMedia>,
}

impl AudioOutput {
    pub fn new() -> Result<Self, Error> {
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| Error::OutputUnavailable(e.to_string()))?;
        let media = Arc::new(RodioMedia::new(Sink::connect_new(stream.mixer())));
        Ok(Self {
            _stream: stream,
            media,
        })
    }

    pub fn media(&self) -> Arc<RodioMedia> {
        self.media.clone()
    }
}

struct SourceState {
    source: Option<String>,
    duration: Option<f64>,
    ready: ReadyState,
}

pub struct RodioMedia {
    sink: Arc<Sink>,
    state: Mutex<SourceState>,
    registry: Arc<ListenerRegistry>,
    ticker: Mutex<Option<Arc<AtomicBool>>>,
}

impl RodioMedia {
    fn new(sink: Sink) -> Self {
        Self {
            sink: Arc::new(sink),
            state: Mutex::new(SourceState {
                source: None,
                duration: None,
                ready: ReadyState::HaveNothing,
            }),
            registry: Arc::new(ListenerRegistry::new()),
            ticker: Mutex::new(None),
        }
    }

    fn load(&self, path: &str) -> Result<Option<f64>, Error> {
        let file = File::open(path)?;
        let decoder = Decoder::try_from(file)
            .map_err(|e| Error::UnsupportedSource(format!("{path}: {e}")))?;

        let duration = decoder.total_duration().map(|d| d.as_secs_f64());
        log::info!(
            "loaded {path}: {} Hz, {} channels, duration {:?}",
            decoder.sample_rate(),
            decoder.channels(),
            duration
        );

        self.sink.clear();
        self.sink.append(decoder);
        // clear() leaves the sink paused; pin the playhead to the start of
        // the fresh source
        if let Err(e) = self.sink.try_seek(Duration::ZERO) {
            log::debug!("position reset not supported for {path}: {e:?}");
        }
        Ok(duration)
    }

    fn start_ticker(&self) {
        let stop = Arc::new(AtomicBool::new(false));
        let sink = self.sink.clone();
        let registry = self.registry.clone();
        {
            let thread_stop = stop.clone();
            thread::spawn(move || {
                loop {
                    thread::sleep(TIMEUPDATE_INTERVAL);
                    if thread_stop.load(Ordering::Relaxed)
                        || sink.is_paused()
                        || sink.empty()
                    {
                        break;
                    }
                    registry.dispatch(MediaEvent::TimeUpdate, sink.get_pos().as_secs_f64());
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

impl MediaElement for RodioMedia {
    fn play(&self) {
        self.sink.play();
        self.start_ticker();
        self.registry
            .dispatch(MediaEvent::Play, self.sink.get_pos().as_secs_f64());
    }

    fn pause(&self) {
        if self.sink.is_paused() {
            return;
        }
        self.sink.pause();
        self.stop_ticker();
        self.registry
            .dispatch(MediaEvent::Pause, self.sink.get_pos().as_secs_f64());
    }

    fn paused(&self) -> bool {
        self.sink.is_paused() || self.sink.empty()
    }

    fn current_time(&self) -> f64 {
        self.sink.get_pos().as_secs_f64()
    }

    fn set_current_time(&self, time: f64) {
        let upper = self.state.lock().unwrap().duration.unwrap_or(f64::MAX);
        let clamped = time.clamp(0.0, upper);
        match self.sink.try_seek(Duration::from_secs_f64(clamped)) {
            Ok(()) => self.registry.dispatch(MediaEvent::Seeked, clamped),
            Err(e) => log::error!("seek to {clamped:.3}s failed: {e:?}"),
        }
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().unwrap().duration
    }

    fn source(&self) -> Option<String> {
        self.state.lock().unwrap().source.clone()
    }

    fn set_source(&self, source: &str) {
        let mut state = self.state.lock().unwrap();
        state.source = Some(source.to_string());
        match self.load(source) {
            Ok(duration) => {
                state.duration = duration;
                state.ready = ReadyState::HaveEnoughData;
            }
            Err(e) => {
                // Failures stay local; observers see them through ready_state
                log::error!("failed to load {source}: {e}");
                state.duration = None;
                state.ready = ReadyState::HaveNothing;
            }
        }
    }

    fn ready_state(&self) -> ReadyState {
        self.state.lock().unwrap().ready
    }

    fn add_listener(&self, event: MediaEvent, callback: MediaCallback) -> ListenerId {
        self.registry.add(event, callback)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.registry.remove(id);
    }
}

impl Drop for RodioMedia {
    fn drop(&mut self) {
        self.stop_ticker();
        self.sink.stop();
    }
}
