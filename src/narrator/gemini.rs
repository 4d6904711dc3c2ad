//! Gemini TTS narration client.
//!
//! One POST to `models/{model}:generateContent` with the narration prompt
//! wrapped in a calm-delivery instruction; the response carries base64 PCM16
//! in `candidates[].content.parts[].inlineData.data`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::NarrationConfig;

use super::NarrationError;

const STYLE_TEMPLATE: &str = "Say with a calm, gentle, and reassuring voice: {text}";

/// The service's fixed output format: PCM16 mono at 24 kHz.
pub const SAMPLE_RATE: u32 = 24000;
pub const CHANNEL_COUNT: usize = 1;

/// Where narration audio comes from. The player only ever talks to this.
#[async_trait]
pub trait NarrationSource: Send + Sync {
    /// Whether a credential is present. `synthesize` cannot succeed without one.
    fn is_configured(&self) -> bool;

    /// Generate narration for `prompt`, returning the base64 PCM16 payload.
    async fn synthesize(&self, prompt: &str) -> Result<String, NarrationError>;
}

pub struct GeminiNarrator {
    api_key: Option<String>,
    model: String,
    voice: String,
    host: String,
    client: Client,
}

impl GeminiNarrator {
    pub fn new(config: &NarrationConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        // Config key wins; the GEMINI_API_KEY env var is the fallback.
        let api_key = if config.api_key.is_empty() {
            std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.is_empty())
        } else {
            Some(config.api_key.clone())
        };

        Self {
            api_key,
            model: config.model.clone(),
            voice: config.voice.clone(),
            host: config.host.clone(),
            client,
        }
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "contents": [{
                "parts": [{ "text": STYLE_TEMPLATE.replace("{text}", prompt) }]
            }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": self.voice }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl NarrationSource for GeminiNarrator {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn synthesize(&self, prompt: &str) -> Result<String, NarrationError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(NarrationError::Configuration(
                "no API key set; add narration.api_key to config.yaml or export GEMINI_API_KEY"
                    .to_string(),
            ));
        };

        let t_start = Instant::now();
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.host, self.model, api_key
        );
        debug!("Requesting narration: {} chars, voice {}", prompt.len(), self.voice);

        let resp = self
            .client
            .post(&url)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NarrationError::Generation("narration request timed out".to_string())
                } else if e.is_connect() {
                    NarrationError::Generation(format!(
                        "cannot reach narration service at {}",
                        self.host
                    ))
                } else {
                    NarrationError::Generation(format!("narration request failed: {e}"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NarrationError::Generation(format!(
                "narration service returned status {status}"
            )));
        }

        let data: Value = resp.json().await.map_err(|e| {
            NarrationError::Generation(format!("failed to parse narration response: {e}"))
        })?;

        match extract_audio_payload(&data) {
            Some(payload) => {
                let latency_ms = t_start.elapsed().as_secs_f64() * 1000.0;
                info!(
                    "Narration generated: {} base64 chars ({latency_ms:.0}ms)",
                    payload.len()
                );
                Ok(payload.to_string())
            }
            None => Err(NarrationError::Generation(
                "no audio data in narration response".to_string(),
            )),
        }
    }
}

/// Pull the first non-empty inline audio payload out of a generateContent response.
fn extract_audio_payload(response: &Value) -> Option<&str> {
    for candidate in response["candidates"].as_array()? {
        let Some(parts) = candidate["content"]["parts"].as_array() else {
            continue;
        };
        for part in parts {
            if let Some(data) = part["inlineData"]["data"].as_str() {
                if !data.is_empty() {
                    return Some(data);
                }
            }
        }
    }
    None
}
