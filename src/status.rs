//! Transient status messages that fall back to "Ready"

use std::time::{Duration, Instant};

use tracing::info;

pub const READY: &str = "Ready";

/// How long a message stays before the line reverts to [`READY`]
pub const STATUS_TTL: Duration = Duration::from_secs(5);

/// Transient user-visible status message
#[derive(Debug, Clone)]
pub struct StatusLine {
    message: Option<(String, Instant)>,
    ttl: Duration,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(STATUS_TTL)
    }
}

impl StatusLine {
    pub fn new(ttl: Duration) -> Self {
        Self { message: None, ttl }
    }

    pub fn set(&mut self, message: impl Into<String>) {
        self.set_at(message, Instant::now());
    }

    pub fn set_at(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        info!(status = %message);
        self.message = Some((message, now));
    }

    /// Text to show at `now`
    pub fn text_at(&self, now: Instant) -> &str {
        match &self.message {
            Some((message, set_at)) if now.saturating_duration_since(*set_at) < self.ttl => {
                message
            }
            _ => READY,
        }
    }

    pub fn text(&self) -> &str {
        self.text_at(Instant::now())
    }

    /// Most recent message regardless of age
    pub fn last(&self) -> Option<&str> {
        self.message.as_ref().map(|(m, _)| m.as_str())
    }
}
