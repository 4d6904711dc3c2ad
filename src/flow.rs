//! Ritual flow orchestration: the interactive rise/rest session loop.
//!
//! One select! loop over stdin commands and narrator events drives the
//! whole session: the narrated player, guided breathing, affirmations,
//! intentions, and the goal board. Nothing here survives the session.

use std::sync::Arc;

use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::affirmations::AffirmationDeck;
use crate::breathing::BreathPattern;
use crate::config::Config;
use crate::content::{self, AudioPiece, DayContent, Quote};
use crate::goals::{GoalBoard, MAX_GOALS};
use crate::intention::{self, IntentionSlate};
use crate::narrator::gemini::GeminiNarrator;
use crate::narrator::output::RodioOutput;
use crate::narrator::player::{NarratedPlayer, PlayerState};
use crate::narrator::{NarrationError, PlayerEvent};
use crate::notifier::Notifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Rise,
    Rest,
}

impl FlowKind {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "rest" | "evening" | "night" => FlowKind::Rest,
            "rise" | "morning" => FlowKind::Rise,
            other => {
                warn!("Unknown flow '{other}', defaulting to rise");
                FlowKind::Rise
            }
        }
    }

    fn greeting(&self) -> &'static str {
        match self {
            FlowKind::Rise => "Good Morning",
            FlowKind::Rest => "Good Evening",
        }
    }
}

type SessionPlayer = NarratedPlayer<GeminiNarrator, RodioOutput>;

pub struct RitualFlow {
    kind: FlowKind,
    config: Config,
    content: &'static DayContent,
    goals: GoalBoard,
    affirmations: AffirmationDeck,
    intention: IntentionSlate,
    notifier: Notifier,
}

impl RitualFlow {
    pub fn new(config: Config, kind: FlowKind) -> Self {
        let notifier = Notifier::new(config.feedback.notifications);
        Self {
            kind,
            content: content::today(),
            goals: GoalBoard::new(),
            affirmations: AffirmationDeck::new(),
            intention: IntentionSlate::new(),
            notifier,
            config,
        }
    }

    fn quote(&self) -> &Quote {
        match self.kind {
            FlowKind::Rise => &self.content.rise_quote,
            FlowKind::Rest => &self.content.rest_quote,
        }
    }

    fn piece(&self) -> AudioPiece {
        match self.kind {
            FlowKind::Rise => self.content.rise_audio,
            FlowKind::Rest => self.content.rest_audio,
        }
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (events_tx, mut events) = mpsc::channel::<PlayerEvent>(16);

        let source = Arc::new(GeminiNarrator::new(&self.config.narration));
        let device = RodioOutput::new(events_tx.clone());
        let mut player = NarratedPlayer::new(self.piece(), source, device, events_tx);

        self.print_welcome();
        self.print_help();

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line {
                        Ok(Some(input)) => {
                            if !self.handle_command(input.trim(), &mut player).await {
                                break;
                            }
                        }
                        Ok(None) => {
                            info!("Input closed");
                            break;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                event = events.recv() => {
                    match event {
                        Some(event) => self.on_player_event(event, &mut player),
                        None => {
                            warn!("Player event channel closed");
                            break;
                        }
                    }
                }
            }
        }

        player.close();
        self.print_completion();
        Ok(())
    }

    /// Dispatch one line of input. Returns false when the session is over.
    async fn handle_command(&mut self, input: &str, player: &mut SessionPlayer) -> bool {
        let (command, rest) = match input.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        match command {
            "" => {}
            "p" | "play" => self.toggle_narration(player),
            "b" | "breathe" => self.run_breathing().await,
            "a" => self.handle_affirmation(rest),
            "e" => self.answer_intention(true, rest),
            "f" => self.answer_intention(false, rest),
            "g" => match self.goals.add(rest) {
                Ok(()) => println!("Goal {} of {MAX_GOALS} noted.", self.goals.len()),
                Err(e) => println!("{e}"),
            },
            "d" => self.mark_goal(rest),
            "x" => self.drop_goal(rest),
            "s" | "status" => self.print_status(player),
            "h" | "help" | "?" => self.print_help(),
            "q" | "quit" | "done" => return false,
            other => println!("Unknown command '{other}' (h for help)."),
        }
        true
    }

    fn toggle_narration(&self, player: &mut SessionPlayer) {
        let piece = *player.piece();
        match player.toggle() {
            Err(e) => self.surface(&e),
            Ok(()) => match player.state() {
                PlayerState::Loading => {
                    println!("Generating narration for \"{}\"...", piece.title);
                }
                PlayerState::Playing(_) => {
                    println!("Playing \"{}\" ({})", piece.title, piece.duration);
                }
                PlayerState::Idle => println!("Stopped."),
            },
        }
    }

    fn on_player_event(&self, event: PlayerEvent, player: &mut SessionPlayer) {
        match event {
            PlayerEvent::Generated(result) => match player.on_generated(result) {
                Ok(()) => {
                    if matches!(player.state(), PlayerState::Playing(_)) {
                        let piece = player.piece();
                        println!("Playing \"{}\" ({})", piece.title, piece.duration);
                    }
                }
                Err(e) => self.surface(&e),
            },
            PlayerEvent::Finished(id) => {
                let before = player.state();
                player.on_finished(id);
                if before != player.state() {
                    println!("\"{}\" finished.", player.piece().title);
                }
            }
        }
    }

    /// Show a narration problem in the terminal and on the desktop.
    fn surface(&self, error: &NarrationError) {
        warn!("{error}");
        let (summary, hint) = match error {
            NarrationError::Configuration(_) => (
                "Narration unavailable",
                "Add an API key to config.yaml or export GEMINI_API_KEY.",
            ),
            NarrationError::Device(_) => (
                "Audio unavailable",
                "Your system does not expose a usable audio output.",
            ),
            NarrationError::Generation(_) => (
                "Narration failed",
                "Sorry, there was an error generating the audio.",
            ),
        };
        println!("{error}");
        println!("  {hint}");
        if error.is_retryable() {
            println!("  Press p to try again.");
        }
        self.notifier.notify_problem(summary, hint);
    }

    fn handle_affirmation(&mut self, rest: &str) {
        match rest {
            "" => println!(
                "  \"{}\"  (a n / a p to browse, a s to keep)",
                self.affirmations.current()
            ),
            "n" => println!("  \"{}\"", self.affirmations.next()),
            "p" => println!("  \"{}\"", self.affirmations.prev()),
            "s" => {
                self.affirmations.select_current();
                println!("Affirmation set: \"{}\"", self.affirmations.selected());
            }
            custom => match self.affirmations.select_custom(custom) {
                Ok(()) => println!("Affirmation set: \"{}\"", self.affirmations.selected()),
                Err(e) => println!("{e}"),
            },
        }
    }

    fn answer_intention(&mut self, energy: bool, rest: &str) {
        let result = if energy {
            self.intention.set_energy(rest)
        } else {
            self.intention.set_emotion(rest)
        };
        match result {
            Ok(()) => {
                let prompt = if energy {
                    intention::ENERGY_PROMPT
                } else {
                    intention::EMOTION_PROMPT
                };
                println!("{prompt}  \"{rest}\"", rest = rest.trim());
                if self.intention.is_complete() {
                    println!("Intention set for the day.");
                }
            }
            Err(e) => println!("{e}"),
        }
    }

    fn mark_goal(&mut self, rest: &str) {
        match rest.parse::<usize>() {
            Ok(n) if n >= 1 => match self.goals.complete(n - 1) {
                Some(goal) => println!("Done: {}", goal.text),
                None => println!("No goal {n}."),
            },
            _ => println!("Usage: d <goal number>"),
        }
    }

    fn drop_goal(&mut self, rest: &str) {
        match rest.parse::<usize>() {
            Ok(n) if n >= 1 => match self.goals.remove(n - 1) {
                Some(goal) => println!("Let go of: {}", goal.text),
                None => println!("No goal {n}."),
            },
            _ => println!("Usage: x <goal number>"),
        }
    }

    async fn run_breathing(&self) {
        let pattern = BreathPattern::from_config(&self.config.breathing);
        let cycles = self.config.breathing.cycles;
        let total = pattern.cycle_duration().as_secs() * u64::from(cycles);
        println!("Settle in: {cycles} cycles, about {total}s.");
        for _ in 0..cycles {
            for (phase, duration) in pattern.phases() {
                println!("  {} ({}s)", phase.cue(), duration.as_secs());
                tokio::time::sleep(duration).await;
            }
        }
        println!("Back to your natural breath.");
    }

    fn print_welcome(&self) {
        let date = Local::now().format("%A, %B %-d");
        let quote = self.quote();
        let piece = self.piece();

        println!();
        println!("{}  ({})", self.kind.greeting(), date);
        println!();
        println!("  \u{201c}{}\u{201d}", quote.text);
        println!("      {}", quote.author);
        println!();
        match self.kind {
            FlowKind::Rise => {
                println!("1. Center Yourself   listen (p), breathe (b)");
                println!("2. Set Mindset       intention (e, f), affirmation (a)");
                println!("3. Focus & Action    goals (g, d, x)");
            }
            FlowKind::Rest => {
                println!("1. Release the Day   listen (p), breathe (b)");
                println!("2. Reflect           affirmation (a), goals review (s)");
            }
        }
        println!();
        println!("Today's narration: \"{}\" ({})", piece.title, piece.duration);
        println!();
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  p            play or stop today's narration");
        println!("  b            guided breathing");
        println!("  a            show an affirmation (a n / a p browse, a s keep, a <words> write)");
        println!("  e <words>    {}", intention::ENERGY_PROMPT);
        println!("  f <words>    {}", intention::EMOTION_PROMPT);
        println!("  g <words>    add a goal (up to {MAX_GOALS})");
        println!("  d <n>        mark goal n done");
        println!("  x <n>        let go of goal n");
        println!("  s            show the session so far");
        println!("  q            complete the ritual");
    }

    fn print_status(&self, player: &SessionPlayer) {
        let piece = player.piece();
        let narration = match player.state() {
            PlayerState::Idle if player.has_clip() => "ready to replay".to_string(),
            PlayerState::Idle => "not yet generated".to_string(),
            PlayerState::Loading => "generating...".to_string(),
            PlayerState::Playing(_) => format!("playing ({})", piece.duration),
        };
        println!("Narration: \"{}\" {narration}", piece.title);
        println!("Affirmation: \"{}\"", self.affirmations.selected());
        match (self.intention.energy(), self.intention.emotion()) {
            (None, None) => println!("Intention: not set"),
            (energy, emotion) => {
                println!("Energy: {}", energy.unwrap_or("(unset)"));
                println!("Emotion: {}", emotion.unwrap_or("(unset)"));
            }
        }
        if self.goals.is_empty() {
            println!("Goals: none yet");
        } else {
            println!(
                "Goals ({} of {MAX_GOALS}, {} done):",
                self.goals.len(),
                self.goals.completed_count()
            );
            for (i, goal) in self.goals.goals().iter().enumerate() {
                let mark = if goal.completed { "x" } else { " " };
                println!("  {}. [{mark}] {}", i + 1, goal.text);
            }
        }
    }

    fn print_completion(&self) {
        println!();
        match self.kind {
            FlowKind::Rise => {
                println!("You've aligned your energy.");
                println!("Go forth with purpose and peace.");
            }
            FlowKind::Rest => {
                println!("You've released the day.");
                println!("Rest well. Tomorrow can wait.");
            }
        }
        if !self.goals.is_empty() {
            println!(
                "Goals: {} set, {} done.",
                self.goals.len(),
                self.goals.completed_count()
            );
        }
        self.notifier.notify(
            "Ritual complete",
            match self.kind {
                FlowKind::Rise => "You've aligned your energy.",
                FlowKind::Rest => "You've released the day.",
            },
        );
        info!("Session complete");
    }
}
