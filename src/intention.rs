//! Morning intention prompts: where the energy goes and what feeling to invite.

pub const ENERGY_PROMPT: &str = "Where will I place my energy?";
pub const EMOTION_PROMPT: &str = "What emotion will I invite in?";

#[derive(Debug, Default)]
pub struct IntentionSlate {
    energy: Option<String>,
    emotion: Option<String>,
}

impl IntentionSlate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the energy prompt. Calling again rewrites the answer.
    pub fn set_energy(&mut self, text: &str) -> Result<(), String> {
        Self::store(&mut self.energy, text)
    }

    pub fn set_emotion(&mut self, text: &str) -> Result<(), String> {
        Self::store(&mut self.emotion, text)
    }

    pub fn energy(&self) -> Option<&str> {
        self.energy.as_deref()
    }

    pub fn emotion(&self) -> Option<&str> {
        self.emotion.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.energy.is_some() && self.emotion.is_some()
    }

    fn store(slot: &mut Option<String>, text: &str) -> Result<(), String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("an intention needs some words".to_string());
        }
        *slot = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unanswered() {
        let slate = IntentionSlate::new();
        assert!(slate.energy().is_none());
        assert!(slate.emotion().is_none());
        assert!(!slate.is_complete());
    }

    #[test]
    fn complete_after_both_answers() {
        let mut slate = IntentionSlate::new();
        slate.set_energy("deep work on the proposal").unwrap();
        assert!(!slate.is_complete());
        slate.set_emotion("calm confidence").unwrap();
        assert!(slate.is_complete());
    }

    #[test]
    fn answers_can_be_rewritten() {
        let mut slate = IntentionSlate::new();
        slate.set_energy("morning pages").unwrap();
        slate.set_energy("  the garden  ").unwrap();
        assert_eq!(slate.energy(), Some("the garden"));
    }

    #[test]
    fn blank_answers_are_rejected() {
        let mut slate = IntentionSlate::new();
        assert!(slate.set_energy("  ").is_err());
        assert!(slate.energy().is_none());
    }
}
