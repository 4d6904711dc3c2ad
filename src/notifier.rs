//! Desktop notifications via notify-rust (D-Bus).

use notify_rust::Notification;
use tracing::{debug, warn};

pub struct Notifier {
    enabled: bool,
}

impl Notifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Gentle session milestones.
    pub fn notify(&self, summary: &str, body: &str) {
        self.show(summary, body, "weather-clear", 3000);
    }

    /// Something the user should act on, visible even while the terminal
    /// is buried behind other windows.
    pub fn notify_problem(&self, summary: &str, body: &str) {
        self.show(summary, body, "dialog-warning", 5000);
    }

    fn show(&self, summary: &str, body: &str, icon: &str, timeout_ms: i32) {
        if !self.enabled {
            return;
        }

        debug!("Notification: {summary}");

        if let Err(e) = Notification::new()
            .appname("rise-rest")
            .summary(summary)
            .body(body)
            .icon(icon)
            .timeout(timeout_ms)
            .show()
        {
            warn!("Failed to show notification: {e}");
        }
    }
}
