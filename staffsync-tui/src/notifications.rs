//! Notification system for the TUI.

use crate::constants::MAX_MESSAGES;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl NotificationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "SUCCESS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Dismissible inline messages, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>) -> Uuid {
        let notification = Notification::new(level, message);
        let id = notification.id;
        match level {
            NotificationLevel::Error => {
                tracing::error!(message = %notification.message, "Notification")
            }
            NotificationLevel::Warning => {
                tracing::warn!(message = %notification.message, "Notification")
            }
            _ => tracing::info!(message = %notification.message, "Notification"),
        }
        self.items.push(notification);
        if self.items.len() > MAX_MESSAGES {
            let excess = self.items.len() - MAX_MESSAGES;
            self.items.drain(..excess);
        }
        id
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Dismiss the newest message.
    pub fn dismiss_latest(&mut self) -> Option<Notification> {
        self.items.pop()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Messages at `level`, oldest first.
    pub fn with_level(&self, level: NotificationLevel) -> Vec<&Notification> {
        self.items.iter().filter(|n| n.level == level).collect()
    }

    pub fn contains(&self, level: NotificationLevel, needle: &str) -> bool {
        self.items
            .iter()
            .any(|n| n.level == level && n.message.contains(needle))
    }
}
