//! Narrator: lazily generated, cached voice narration for the daily rituals.
//!
//! Components:
//! - `player`: Idle/Loading/Playing state machine behind the single play/stop control
//! - `gemini`: Gemini TTS client that turns a narration prompt into base64 PCM16
//! - `pcm`: PCM16 → normalized f32 decoding into per-channel clips
//! - `output`: rodio playback with one active handle and drain watching

pub mod gemini;
pub mod output;
pub mod pcm;
pub mod player;

use std::fmt;

use thiserror::Error;

/// What can go wrong between the play button and sound coming out.
#[derive(Debug, Clone, Error)]
pub enum NarrationError {
    /// No usable credential; fix the config, retrying won't help.
    #[error("narration not configured: {0}")]
    Configuration(String),

    /// The audio output could not be acquired or used.
    #[error("audio output unavailable: {0}")]
    Device(String),

    /// Generation failed (network, service, or bad payload). Retryable.
    #[error("narration generation failed: {0}")]
    Generation(String),
}

impl NarrationError {
    /// Whether simply trying the same action again can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, NarrationError::Generation(_))
    }
}

/// Identifier for one playback handle issued by the output device.
/// A fresh id is minted per start, never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackId(pub(crate) u64);

impl fmt::Display for PlaybackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "playback#{}", self.0)
    }
}

/// Events the narrator subsystem reports back into the owning flow loop.
#[derive(Debug)]
pub enum PlayerEvent {
    /// An in-flight generation request resolved (base64 audio or error).
    Generated(Result<String, NarrationError>),
    /// A playback handle drained to the end of its buffer.
    Finished(PlaybackId),
}
