//! PCM16 decoding: base64 payloads → normalized f32 samples, one Vec per channel.
//!
//! The narration service returns raw little-endian signed 16-bit PCM encoded
//! as base64, with no container or header. Decoding:
//! 1. base64 → bytes
//! 2. byte pairs → i16 (little-endian)
//! 3. i16 → f32 in [-1.0, 1.0) via division by 32768
//! 4. interleaved frames → planar channels

use base64::{engine::general_purpose, Engine as _};

use super::NarrationError;

/// A decoded narration clip, ready for the output device.
#[derive(Debug, Clone)]
pub struct NarrationClip {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl NarrationClip {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn duration_secs(&self) -> f32 {
        self.frame_count() as f32 / self.sample_rate as f32
    }

    /// Re-interleave the planar channels for sample-stream consumers.
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frame_count();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for frame in 0..frames {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }
}

/// Decode a base64 PCM16 payload into a clip.
pub fn decode_base64_clip(
    payload: &str,
    sample_rate: u32,
    channel_count: usize,
) -> Result<NarrationClip, NarrationError> {
    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| NarrationError::Generation(format!("audio payload is not valid base64: {e}")))?;
    clip_from_pcm16(&bytes, sample_rate, channel_count)
}

/// Decode raw interleaved PCM16 bytes into a clip.
pub fn clip_from_pcm16(
    bytes: &[u8],
    sample_rate: u32,
    channel_count: usize,
) -> Result<NarrationClip, NarrationError> {
    if channel_count == 0 {
        return Err(NarrationError::Generation(
            "audio payload claims zero channels".to_string(),
        ));
    }
    if bytes.len() % 2 != 0 {
        return Err(NarrationError::Generation(format!(
            "PCM16 payload has odd byte length {}",
            bytes.len()
        )));
    }

    let total_samples = bytes.len() / 2;
    let frames = total_samples / channel_count;
    let mut channels = vec![Vec::with_capacity(frames); channel_count];

    for frame in 0..frames {
        for (offset, samples) in channels.iter_mut().enumerate() {
            let at = (frame * channel_count + offset) * 2;
            let sample = i16::from_le_bytes([bytes[at], bytes[at + 1]]);
            samples.push(sample as f32 / 32768.0);
        }
    }

    Ok(NarrationClip {
        channels,
        sample_rate,
    })
}
