//! Configuration management for rise-rest-rs.
//!
//! Loads config from YAML files in standard locations. Every field has a
//! working default, so the app runs with no config file at all.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Gemini API key. Empty means fall back to the GEMINI_API_KEY env var.
    pub api_key: String,
    pub model: String,
    pub voice: String,
    pub host: String,
    pub timeout_secs: u64,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash-preview-tts".into(),
            voice: "Kore".into(),
            host: "https://generativelanguage.googleapis.com".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BreathingConfig {
    pub inhale_secs: u64,
    pub hold_secs: u64,
    pub exhale_secs: u64,
    pub cycles: u32,
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            inhale_secs: 4,
            hold_secs: 4,
            exhale_secs: 6,
            cycles: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub notifications: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            notifications: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub narration: NarrationConfig,
    pub breathing: BreathingConfig,
    pub feedback: FeedbackConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./config.yaml
    /// 2. ~/.config/rise-rest/config.yaml
    /// 3. /etc/rise-rest/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("config.yaml")),
                dirs::home_dir().map(|h| h.join(".config/rise-rest/config.yaml")),
                Some(PathBuf::from("/etc/rise-rest/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match serde_yml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_without_a_file() {
        let config = Config::default();
        assert_eq!(config.narration.model, "gemini-2.5-flash-preview-tts");
        assert_eq!(config.narration.voice, "Kore");
        assert!(config.narration.api_key.is_empty());
        assert_eq!(config.breathing.cycles, 3);
        assert!(config.feedback.notifications);
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let yaml = "narration:\n  voice: Puck\nbreathing:\n  cycles: 5\n";
        let config: Config = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.narration.voice, "Puck");
        assert_eq!(config.narration.model, "gemini-2.5-flash-preview-tts");
        assert_eq!(config.breathing.cycles, 5);
        assert_eq!(config.breathing.inhale_secs, 4);
    }
}
