//! The narrated-audio state machine behind the single play/stop control.
//!
//! One player per ritual session, bound to one narration piece. Audio is
//! generated on first demand, decoded, cached for the rest of the session,
//! and played through at most one active handle:
//!
//! - IDLE + no clip → request generation (LOADING)
//! - IDLE + cached clip → play immediately, no second request
//! - LOADING → ignore further toggles; one request in flight at a time
//! - PLAYING → stop, back to IDLE, clip stays cached

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::content::AudioPiece;

use super::gemini::{NarrationSource, CHANNEL_COUNT, SAMPLE_RATE};
use super::output::OutputDevice;
use super::pcm::{self, NarrationClip};
use super::{NarrationError, PlaybackId, PlayerEvent};

/// Player lifecycle. The active handle lives inside `Playing`, so a handle
/// without the state (or the other way around) cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Loading,
    Playing(PlaybackId),
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlayerState::Idle => "IDLE",
            PlayerState::Loading => "LOADING",
            PlayerState::Playing(_) => "PLAYING",
        };
        write!(f, "{label}")
    }
}

pub struct NarratedPlayer<S, D> {
    piece: AudioPiece,
    source: Arc<S>,
    device: D,
    state: PlayerState,
    clip: Option<Arc<NarrationClip>>,
    generation: Option<JoinHandle<()>>,
    events: mpsc::Sender<PlayerEvent>,
}

impl<S, D> NarratedPlayer<S, D>
where
    S: NarrationSource + 'static,
    D: OutputDevice,
{
    pub fn new(piece: AudioPiece, source: Arc<S>, device: D, events: mpsc::Sender<PlayerEvent>) -> Self {
        Self {
            piece,
            source,
            device,
            state: PlayerState::Idle,
            clip: None,
            generation: None,
            events,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn piece(&self) -> &AudioPiece {
        &self.piece
    }

    /// Whether narration has already been generated this session.
    pub fn has_clip(&self) -> bool {
        self.clip.is_some()
    }

    /// The single user-facing control: start, stop, or ignore while loading.
    pub fn toggle(&mut self) -> Result<(), NarrationError> {
        if self.state == PlayerState::Loading {
            debug!("Generation in flight, toggle ignored");
            return Ok(());
        }

        if !self.source.is_configured() {
            return Err(NarrationError::Configuration(
                "no API key set; add narration.api_key to config.yaml or export GEMINI_API_KEY"
                    .to_string(),
            ));
        }

        // The output is only acquired here, on a user action, never earlier.
        self.device.ensure_open()?;

        if let PlayerState::Playing(id) = self.state {
            self.device.stop(id);
            self.set_state(PlayerState::Idle);
            return Ok(());
        }

        match self.clip.clone() {
            Some(clip) => self.start_playback(clip),
            None => {
                self.begin_generation();
                Ok(())
            }
        }
    }

    fn begin_generation(&mut self) {
        self.set_state(PlayerState::Loading);
        let source = Arc::clone(&self.source);
        let prompt = self.piece.prompt.to_string();
        let events = self.events.clone();
        self.generation = Some(tokio::spawn(async move {
            let result = source.synthesize(&prompt).await;
            if events.send(PlayerEvent::Generated(result)).await.is_err() {
                warn!("Flow loop gone before narration generation finished");
            }
        }));
    }

    /// Outcome of the generation request, routed back through the event loop.
    /// Anything arriving outside LOADING (e.g. after teardown) is dropped.
    pub fn on_generated(&mut self, result: Result<String, NarrationError>) -> Result<(), NarrationError> {
        self.generation = None;
        if self.state != PlayerState::Loading {
            debug!("Generation result arrived outside LOADING, ignoring");
            return Ok(());
        }

        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                self.set_state(PlayerState::Idle);
                return Err(e);
            }
        };

        let clip = match pcm::decode_base64_clip(&payload, SAMPLE_RATE, CHANNEL_COUNT) {
            Ok(clip) => Arc::new(clip),
            Err(e) => {
                self.set_state(PlayerState::Idle);
                return Err(e);
            }
        };

        info!("Narration ready: {:.1}s of audio", clip.duration_secs());
        // Cache before playing so the clip survives a failed start.
        self.clip = Some(Arc::clone(&clip));
        self.start_playback(clip)
    }

    /// A handle drained to the end. Completions from superseded handles are
    /// stale and must not touch the current state.
    pub fn on_finished(&mut self, id: PlaybackId) {
        match self.state {
            PlayerState::Playing(current) if current == id => {
                self.device.stop(id);
                self.set_state(PlayerState::Idle);
            }
            _ => debug!("Completion from superseded {id}, ignoring"),
        }
    }

    // Only reachable from IDLE or LOADING; a playing handle is always
    // stopped through toggle() before another start.
    fn start_playback(&mut self, clip: Arc<NarrationClip>) -> Result<(), NarrationError> {
        match self.device.start(clip) {
            Ok(id) => {
                self.set_state(PlayerState::Playing(id));
                Ok(())
            }
            Err(e) => {
                self.set_state(PlayerState::Idle);
                Err(e)
            }
        }
    }

    /// Teardown: abort any in-flight generation, stop playback, release the
    /// output. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(task) = self.generation.take() {
            task.abort();
        }
        if let PlayerState::Playing(id) = self.state {
            self.device.stop(id);
        }
        self.device.close();
        self.set_state(PlayerState::Idle);
    }

    fn set_state(&mut self, next: PlayerState) {
        if self.state != next {
            info!("Narration state: {} → {}", self.state, next);
            self.state = next;
        }
    }
}

// Covers exits that skip close(); the device releases itself in its own Drop.
impl<S, D> Drop for NarratedPlayer<S, D> {
    fn drop(&mut self) {
        if let Some(task) = self.generation.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use base64::{engine::general_purpose, Engine as _};

    fn piece() -> AudioPiece {
        AudioPiece {
            title: "Monday Momentum",
            prompt: "Feel the fresh energy of the week",
            duration: "2:05",
        }
    }

    /// Base64 PCM16 payload with a few recognizable samples.
    fn payload() -> String {
        let bytes: Vec<u8> = [0i16, 1000, -1000, 32767, -32768]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        general_purpose::STANDARD.encode(&bytes)
    }

    struct MockSource {
        configured: bool,
        requests: AtomicUsize,
        // None → the request never resolves (stays pending forever)
        response: Mutex<Option<Result<String, NarrationError>>>,
    }

    impl MockSource {
        fn answering(response: Result<String, NarrationError>) -> Self {
            Self {
                configured: true,
                requests: AtomicUsize::new(0),
                response: Mutex::new(Some(response)),
            }
        }

        fn never_resolving() -> Self {
            Self {
                configured: true,
                requests: AtomicUsize::new(0),
                response: Mutex::new(None),
            }
        }

        fn unconfigured() -> Self {
            Self {
                configured: false,
                requests: AtomicUsize::new(0),
                response: Mutex::new(None),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NarrationSource for MockSource {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn synthesize(&self, _prompt: &str) -> Result<String, NarrationError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let response = self.response.lock().unwrap().clone();
            match response {
                Some(result) => result,
                None => std::future::pending().await,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum DeviceCall {
        Open,
        Start(u64),
        Stop(u64),
        Close,
    }

    #[derive(Default)]
    struct DeviceLog {
        calls: Mutex<Vec<DeviceCall>>,
        live: Mutex<Vec<u64>>,
        overlap: Mutex<bool>,
    }

    impl DeviceLog {
        fn calls(&self) -> Vec<DeviceCall> {
            self.calls.lock().unwrap().clone()
        }

        fn live_handles(&self) -> Vec<u64> {
            self.live.lock().unwrap().clone()
        }

        fn saw_overlap(&self) -> bool {
            *self.overlap.lock().unwrap()
        }
    }

    struct MockDevice {
        log: Arc<DeviceLog>,
        open: bool,
        next_id: u64,
        fail_open: bool,
        fail_start: bool,
    }

    impl MockDevice {
        fn new() -> (Self, Arc<DeviceLog>) {
            let log = Arc::new(DeviceLog::default());
            let device = Self {
                log: Arc::clone(&log),
                open: false,
                next_id: 1,
                fail_open: false,
                fail_start: false,
            };
            (device, log)
        }

        fn failing_open() -> (Self, Arc<DeviceLog>) {
            let (mut device, log) = Self::new();
            device.fail_open = true;
            (device, log)
        }

        fn failing_start() -> (Self, Arc<DeviceLog>) {
            let (mut device, log) = Self::new();
            device.fail_start = true;
            (device, log)
        }
    }

    impl OutputDevice for MockDevice {
        fn ensure_open(&mut self) -> Result<(), NarrationError> {
            if self.fail_open {
                return Err(NarrationError::Device("no output device".to_string()));
            }
            if !self.open {
                self.open = true;
                self.log.calls.lock().unwrap().push(DeviceCall::Open);
            }
            Ok(())
        }

        fn start(&mut self, _clip: Arc<NarrationClip>) -> Result<PlaybackId, NarrationError> {
            if self.fail_start {
                return Err(NarrationError::Device("stream rejected".to_string()));
            }
            let id = self.next_id;
            self.next_id += 1;
            self.log.calls.lock().unwrap().push(DeviceCall::Start(id));
            let mut live = self.log.live.lock().unwrap();
            live.push(id);
            if live.len() > 1 {
                *self.log.overlap.lock().unwrap() = true;
            }
            Ok(PlaybackId(id))
        }

        fn stop(&mut self, id: PlaybackId) {
            self.log.calls.lock().unwrap().push(DeviceCall::Stop(id.0));
            self.log.live.lock().unwrap().retain(|live| *live != id.0);
        }

        fn close(&mut self) {
            self.log.calls.lock().unwrap().push(DeviceCall::Close);
            self.log.live.lock().unwrap().clear();
            self.open = false;
        }
    }

    type TestPlayer = NarratedPlayer<MockSource, MockDevice>;

    fn player_with(
        source: MockSource,
        device: MockDevice,
    ) -> (TestPlayer, Arc<MockSource>, mpsc::Receiver<PlayerEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let source = Arc::new(source);
        let player = NarratedPlayer::new(piece(), Arc::clone(&source), device, tx);
        (player, source, rx)
    }

    /// Drive one toggle through generation to PLAYING, using the real event
    /// channel the way the flow loop does.
    async fn play_through(player: &mut TestPlayer, rx: &mut mpsc::Receiver<PlayerEvent>) {
        player.toggle().unwrap();
        assert_eq!(player.state(), PlayerState::Loading);

        let event = rx.recv().await.unwrap();
        let PlayerEvent::Generated(result) = event else {
            panic!("expected a generation event, got {event:?}");
        };
        player.on_generated(result).unwrap();
        assert!(matches!(player.state(), PlayerState::Playing(_)));
    }

    #[test]
    fn missing_credential_aborts_without_state_change() {
        let (device, log) = MockDevice::new();
        let (mut player, source, _rx) = player_with(MockSource::unconfigured(), device);

        let err = player.toggle().unwrap_err();
        assert!(matches!(err, NarrationError::Configuration(_)));
        assert!(!err.is_retryable());

        assert_eq!(player.state(), PlayerState::Idle);
        assert!(log.calls().is_empty());
        assert_eq!(source.request_count(), 0);
    }

    #[test]
    fn device_failure_on_first_gesture_leaves_idle() {
        let (device, log) = MockDevice::failing_open();
        let (mut player, source, _rx) = player_with(MockSource::never_resolving(), device);

        let err = player.toggle().unwrap_err();
        assert!(matches!(err, NarrationError::Device(_)));

        assert_eq!(player.state(), PlayerState::Idle);
        assert!(log.calls().is_empty());
        assert_eq!(source.request_count(), 0);
    }

    #[tokio::test]
    async fn toggle_during_loading_is_ignored_and_requests_once() {
        let (device, log) = MockDevice::new();
        let (mut player, source, mut rx) = player_with(MockSource::never_resolving(), device);

        player.toggle().unwrap();
        assert_eq!(player.state(), PlayerState::Loading);

        // Let the spawned request start before poking the player again.
        tokio::time::sleep(Duration::from_millis(10)).await;

        player.toggle().unwrap();
        player.toggle().unwrap();
        assert_eq!(player.state(), PlayerState::Loading);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.request_count(), 1);
        assert!(rx.try_recv().is_err());

        // The device was opened exactly once, on the first gesture.
        assert_eq!(log.calls(), vec![DeviceCall::Open]);

        player.close();
    }

    #[tokio::test]
    async fn generation_failure_reverts_to_idle_and_stays_retryable() {
        let (device, _log) = MockDevice::new();
        let failure = Err(NarrationError::Generation("boom".to_string()));
        let (mut player, _source, _rx) = player_with(MockSource::answering(failure), device);

        player.toggle().unwrap();
        assert_eq!(player.state(), PlayerState::Loading);

        let err = player
            .on_generated(Err(NarrationError::Generation("boom".to_string())))
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(!player.has_clip());

        // Retry goes right back into generation.
        player.toggle().unwrap();
        assert_eq!(player.state(), PlayerState::Loading);
        player.close();
    }

    #[tokio::test]
    async fn undecodable_payload_is_a_generation_error() {
        let (device, _log) = MockDevice::new();
        let (mut player, _source, _rx) =
            player_with(MockSource::answering(Ok(payload())), device);

        player.toggle().unwrap();
        let err = player
            .on_generated(Ok("@@not-base64@@".to_string()))
            .unwrap_err();
        assert!(matches!(err, NarrationError::Generation(_)));
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(!player.has_clip());
        player.close();
    }

    #[tokio::test]
    async fn generate_play_stop_replay_uses_one_request() {
        let (device, log) = MockDevice::new();
        let (mut player, source, mut rx) =
            player_with(MockSource::answering(Ok(payload())), device);

        play_through(&mut player, &mut rx).await;
        assert!(player.has_clip());

        // Stop.
        player.toggle().unwrap();
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(player.has_clip());

        // Replay: no LOADING pass, no second request.
        player.toggle().unwrap();
        assert!(matches!(player.state(), PlayerState::Playing(_)));
        assert_eq!(source.request_count(), 1);

        assert_eq!(
            log.calls(),
            vec![
                DeviceCall::Open,
                DeviceCall::Start(1),
                DeviceCall::Stop(1),
                DeviceCall::Start(2),
            ]
        );
        assert!(!log.saw_overlap());
        player.close();
    }

    #[tokio::test]
    async fn natural_completion_returns_to_idle() {
        let (device, _log) = MockDevice::new();
        let (mut player, _source, mut rx) =
            player_with(MockSource::answering(Ok(payload())), device);

        play_through(&mut player, &mut rx).await;
        let PlayerState::Playing(id) = player.state() else {
            unreachable!();
        };

        player.on_finished(id);
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(player.has_clip());
        player.close();
    }

    #[tokio::test]
    async fn stale_completion_does_not_disturb_the_new_playback() {
        let (device, log) = MockDevice::new();
        let (mut player, _source, mut rx) =
            player_with(MockSource::answering(Ok(payload())), device);

        play_through(&mut player, &mut rx).await;
        let PlayerState::Playing(first) = player.state() else {
            unreachable!();
        };

        // Stop and immediately replay, then deliver the first handle's
        // completion late.
        player.toggle().unwrap();
        player.toggle().unwrap();
        let PlayerState::Playing(second) = player.state() else {
            panic!("replay should be playing");
        };
        assert_ne!(first, second);

        player.on_finished(first);
        assert_eq!(player.state(), PlayerState::Playing(second));
        assert!(log.live_handles().contains(&second.0));

        // The current handle's completion still lands.
        player.on_finished(second);
        assert_eq!(player.state(), PlayerState::Idle);
        player.close();
    }

    #[tokio::test]
    async fn close_stops_playback_and_releases_the_device() {
        let (device, log) = MockDevice::new();
        let (mut player, _source, mut rx) =
            player_with(MockSource::answering(Ok(payload())), device);

        play_through(&mut player, &mut rx).await;
        let PlayerState::Playing(id) = player.state() else {
            unreachable!();
        };

        player.close();
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(log.live_handles().is_empty());

        let calls = log.calls();
        assert!(calls.contains(&DeviceCall::Stop(id.0)));
        assert_eq!(calls.last(), Some(&DeviceCall::Close));
    }

    #[tokio::test]
    async fn generation_resolving_after_close_is_dropped() {
        let (device, log) = MockDevice::new();
        let (mut player, _source, _rx) =
            player_with(MockSource::never_resolving(), device);

        player.toggle().unwrap();
        assert_eq!(player.state(), PlayerState::Loading);
        player.close();

        // A late result must not start playback on a closed player.
        player.on_generated(Ok(payload())).unwrap();
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(!player.has_clip());
        assert!(log.live_handles().is_empty());
    }

    #[tokio::test]
    async fn failed_start_keeps_the_clip_for_retry() {
        let (device, _log) = MockDevice::failing_start();
        let (mut player, _source, mut rx) =
            player_with(MockSource::answering(Ok(payload())), device);

        player.toggle().unwrap();
        let event = rx.recv().await.unwrap();
        let PlayerEvent::Generated(result) = event else {
            panic!("expected a generation event");
        };

        let err = player.on_generated(result).unwrap_err();
        assert!(matches!(err, NarrationError::Device(_)));
        assert_eq!(player.state(), PlayerState::Idle);
        // The decode succeeded, so the session keeps the clip.
        assert!(player.has_clip());
        player.close();
    }
}
