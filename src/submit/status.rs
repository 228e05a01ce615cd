use std::time::{Duration, Instant};

pub const DEFAULT_STATUS_HOLD: Duration = Duration::from_secs(3);

/// A transient, self-clearing status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    text: Option<String>,
    expires_at: Option<Instant>,
    hold: Duration,
}

impl StatusLine {
    pub fn new(hold: Duration) -> Self {
        Self {
            text: None,
            expires_at: None,
            hold,
        }
    }

    /// Show `text`, replacing any current message and restarting the timer.
    pub fn set(&mut self, text: impl Into<String>, now: Instant) {
        self.text = Some(text.into());
        self.expires_at = Some(now + self.hold);
    }

    pub fn current(&self, now: Instant) -> Option<&str> {
        match self.expires_at {
            Some(deadline) if now < deadline => self.text.as_deref(),
            _ => None,
        }
    }

    /// Drop the message once its hold time has passed. Returns `true` when a
    /// message was cleared by this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) if now >= deadline => {
                self.text = None;
                self.expires_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none()
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_HOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_expires_after_hold() {
        let start = Instant::now();
        let mut status = StatusLine::default();
        status.set("Drawing submitted successfully!", start);

        assert_eq!(
            status.current(start + Duration::from_millis(2999)),
            Some("Drawing submitted successfully!")
        );
        assert!(!status.tick(start + Duration::from_millis(2999)));
        assert_eq!(status.current(start + Duration::from_secs(3)), None);
        assert!(status.tick(start + Duration::from_secs(3)));
        assert!(status.is_empty());
    }

    #[test]
    fn new_message_restarts_timer() {
        let start = Instant::now();
        let mut status = StatusLine::new(Duration::from_secs(3));
        status.set("first", start);
        status.set("second", start + Duration::from_secs(2));

        assert_eq!(
            status.current(start + Duration::from_secs(4)),
            Some("second")
        );
    }
}
