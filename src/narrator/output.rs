//! Audio output: rodio playback with at most one active handle.
//!
//! The platform output is opened lazily on the first play action, never at
//! startup. Each started clip gets a fresh `PlaybackId`; a watcher task polls
//! the sink and reports natural completion through the player event channel.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::pcm::NarrationClip;
use super::{NarrationError, PlaybackId, PlayerEvent};

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Playback seam between the player state machine and the platform.
pub trait OutputDevice {
    /// Acquire the platform output. Idempotent once open.
    fn ensure_open(&mut self) -> Result<(), NarrationError>;

    /// Start a clip on a fresh handle. Callers stop the active handle first.
    fn start(&mut self, clip: Arc<NarrationClip>) -> Result<PlaybackId, NarrationError>;

    /// Stop a handle. Unknown or already-stopped ids are a no-op.
    fn stop(&mut self, id: PlaybackId);

    /// Stop everything and release the platform output.
    fn close(&mut self);
}

struct ActiveSink {
    id: PlaybackId,
    sink: Sink,
}

pub struct RodioOutput {
    // rodio 0.21: OutputStream is the handle, there is no separate OutputStreamHandle
    stream: Option<OutputStream>,
    slot: Arc<Mutex<Option<ActiveSink>>>,
    watcher: Option<JoinHandle<()>>,
    events: mpsc::Sender<PlayerEvent>,
    next_id: u64,
}

impl RodioOutput {
    pub fn new(events: mpsc::Sender<PlayerEvent>) -> Self {
        Self {
            stream: None,
            slot: Arc::new(Mutex::new(None)),
            watcher: None,
            events,
            next_id: 1,
        }
    }

    fn stop_active(&mut self) {
        if let Some(active) = self.slot.lock().unwrap().take() {
            active.sink.stop();
            debug!("{} stopped", active.id);
        }
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

impl OutputDevice for RodioOutput {
    fn ensure_open(&mut self) -> Result<(), NarrationError> {
        if self.stream.is_some() {
            return Ok(());
        }
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| NarrationError::Device(format!("failed to open audio output: {e}")))?;
        self.stream = Some(stream);
        debug!("Audio output opened");
        Ok(())
    }

    fn start(&mut self, clip: Arc<NarrationClip>) -> Result<PlaybackId, NarrationError> {
        self.stop_active();

        let Some(stream) = self.stream.as_ref() else {
            return Err(NarrationError::Device(
                "audio output is not open".to_string(),
            ));
        };

        // rodio 0.21: Sink::connect_new takes &Mixer
        let sink = Sink::connect_new(stream.mixer());
        let source = SamplesBuffer::new(
            clip.channel_count() as u16,
            clip.sample_rate(),
            clip.interleaved(),
        );
        sink.append(source);
        sink.play();

        let id = PlaybackId(self.next_id);
        self.next_id += 1;
        *self.slot.lock().unwrap() = Some(ActiveSink { id, sink });

        // Watch for the sink draining naturally. The watcher exits silently
        // once the slot no longer holds its own handle.
        let slot = Arc::clone(&self.slot);
        let events = self.events.clone();
        self.watcher = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
                let drained = {
                    let guard = slot.lock().unwrap();
                    match guard.as_ref() {
                        Some(active) if active.id == id => active.sink.empty(),
                        _ => return,
                    }
                };
                if drained {
                    if events.send(PlayerEvent::Finished(id)).await.is_err() {
                        warn!("Player event channel closed before {id} finished");
                    }
                    return;
                }
            }
        }));

        debug!("{id} started ({:.1}s)", clip.duration_secs());
        Ok(id)
    }

    fn stop(&mut self, id: PlaybackId) {
        let taken = {
            let mut guard = self.slot.lock().unwrap();
            if guard.as_ref().is_some_and(|active| active.id == id) {
                guard.take()
            } else {
                None
            }
        };
        match taken {
            Some(active) => {
                active.sink.stop();
                if let Some(watcher) = self.watcher.take() {
                    watcher.abort();
                }
                debug!("{id} stopped");
            }
            // Stopping twice or stopping a superseded handle is harmless.
            None => debug!("{id} already stopped"),
        }
    }

    fn close(&mut self) {
        self.stop_active();
        if self.stream.take().is_some() {
            debug!("Audio output released");
        }
    }
}

impl Drop for RodioOutput {
    fn drop(&mut self) {
        self.close();
    }
}
