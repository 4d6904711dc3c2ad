//! Affirmation picker: a small built-in deck browsed with wrap-around,
//! plus the option to write your own.

pub const DECK: [&str; 3] = [
    "I am focused, calm, and ready to receive.",
    "I move gently and bravely into the day.",
    "My energy is aligned with my purpose.",
];

#[derive(Debug)]
pub struct AffirmationDeck {
    cursor: usize,
    selected: String,
}

impl Default for AffirmationDeck {
    fn default() -> Self {
        Self::new()
    }
}

impl AffirmationDeck {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            selected: DECK[0].to_string(),
        }
    }

    /// The deck entry under the cursor (not necessarily the selection).
    pub fn current(&self) -> &'static str {
        DECK[self.cursor]
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn next(&mut self) -> &'static str {
        self.cursor = (self.cursor + 1) % DECK.len();
        self.current()
    }

    pub fn prev(&mut self) -> &'static str {
        self.cursor = (self.cursor + DECK.len() - 1) % DECK.len();
        self.current()
    }

    /// Adopt the entry under the cursor as today's affirmation.
    pub fn select_current(&mut self) {
        self.selected = self.current().to_string();
    }

    /// Replace the selection with the caller's own words.
    pub fn select_custom(&mut self, text: &str) -> Result<(), String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("an affirmation needs some words".to_string());
        }
        // Keep the cursor in step when the custom text matches a deck entry.
        if let Some(index) = DECK.iter().position(|entry| *entry == text) {
            self.cursor = index;
        }
        self.selected = text.to_string();
        Ok(())
    }
}
