use std::time::{Duration, Instant};

use uuid::Uuid;

/// How long a notification stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub text: String,
    expires_at: Instant,
}

/// Transient notifications. Each entry carries its own deadline, so one
/// arriving late does not extend or shorten the others.
#[derive(Debug)]
pub struct NotificationTray {
    entries: Vec<Notification>,
    ttl: Duration,
}

impl Default for NotificationTray {
    fn default() -> Self {
        Self::with_ttl(NOTIFICATION_TTL)
    }
}

impl NotificationTray {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Vec::new(),
            ttl,
        }
    }

    pub fn push(&mut self, text: String, now: Instant) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.push(Notification {
            id,
            text,
            expires_at: now + self.ttl,
        });
        id
    }

    /// Drops every entry whose deadline has passed. Returns how many went.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn visible(&self) -> &[Notification] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
