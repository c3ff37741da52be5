//! User-facing notifications
//!
//! Bounded log of the toasts shown after connect/disconnect actions.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Action succeeded
    Success,
    /// Action failed
    Error,
}

/// A single toast
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Text shown to the user
    pub message: String,
    /// When it was raised
    pub at: DateTime<Utc>,
}

impl Notification {
    /// Success toast stamped now
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    /// Error toast stamped now
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Ring buffer of notifications, oldest first
#[derive(Debug, Clone)]
pub struct NotificationLog {
    entries: VecDeque<Notification>,
    /// Maximum number of entries to keep (0 = unlimited)
    max_entries: usize,
}

impl NotificationLog {
    /// Create a log keeping at most `max_entries` (0 = unlimited)
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    /// Append, evicting the oldest entry when full
    pub fn push(&mut self, notification: Notification) {
        self.entries.push_back(notification);
        if self.max_entries > 0 && self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&Notification> {
        self.entries.back()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new(50)
    }
}
