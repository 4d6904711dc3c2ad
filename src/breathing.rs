//! Guided breathing: a timed inhale / hold / exhale cycle.

use std::time::Duration;

use crate::config::BreathingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
}

impl BreathPhase {
    pub fn cue(&self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Breathe in",
            BreathPhase::Hold => "Hold",
            BreathPhase::Exhale => "Release",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BreathPattern {
    pub inhale: Duration,
    pub hold: Duration,
    pub exhale: Duration,
}

impl BreathPattern {
    pub fn from_config(config: &BreathingConfig) -> Self {
        Self {
            inhale: Duration::from_secs(config.inhale_secs),
            hold: Duration::from_secs(config.hold_secs),
            exhale: Duration::from_secs(config.exhale_secs),
        }
    }

    /// The phases of one cycle, in order.
    pub fn phases(&self) -> [(BreathPhase, Duration); 3] {
        [
            (BreathPhase::Inhale, self.inhale),
            (BreathPhase::Hold, self.hold),
            (BreathPhase::Exhale, self.exhale),
        ]
    }

    pub fn cycle_duration(&self) -> Duration {
        self.inhale + self.hold + self.exhale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_gives_a_four_four_six_pattern() {
        let pattern = BreathPattern::from_config(&BreathingConfig::default());
        assert_eq!(pattern.inhale, Duration::from_secs(4));
        assert_eq!(pattern.hold, Duration::from_secs(4));
        assert_eq!(pattern.exhale, Duration::from_secs(6));
        assert_eq!(pattern.cycle_duration(), Duration::from_secs(14));
    }

    #[test]
    fn phases_come_in_breath_order() {
        let pattern = BreathPattern::from_config(&BreathingConfig::default());
        let phases = pattern.phases();
        assert_eq!(phases[0].0, BreathPhase::Inhale);
        assert_eq!(phases[1].0, BreathPhase::Hold);
        assert_eq!(phases[2].0, BreathPhase::Exhale);
    }
}
