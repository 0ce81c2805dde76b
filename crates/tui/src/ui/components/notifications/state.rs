use std::collections::VecDeque;
use std::time::{Duration, Instant};

use reana_types::Severity;

const TOAST_TTL: Duration = Duration::from_secs(5);
const ERROR_TTL: Duration = Duration::from_secs(10);
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
}

impl Notification {
    fn ttl(&self) -> Duration {
        match self.severity {
            Severity::Warning | Severity::Error => ERROR_TTL,
            Severity::Info | Severity::Success => TOAST_TTL,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl()
    }
}

/// Fire-and-forget toast queue. Newest first; identical toasts are coalesced
/// so a failing poll does not stack the same warning.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    toasts: VecDeque<Notification>,
}

impl NotificationCenter {
    pub fn push(&mut self, title: impl Into<String>, message: impl Into<String>, severity: Severity, now: Instant) {
        let notification = Notification {
            title: title.into(),
            message: message.into(),
            severity,
            created_at: now,
        };
        self.toasts
            .retain(|existing| existing.title != notification.title || existing.message != notification.message);
        self.toasts.push_front(notification);
        self.toasts.truncate(MAX_VISIBLE);
    }

    /// Drop expired toasts; returns whether anything changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| !toast.is_expired(now));
        before != self.toasts.len()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.toasts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
