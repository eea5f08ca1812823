//! User-visible notifications (toasts).
//!
//! Workflows never surface errors by panicking or returning them to the front end;
//! they push a notification here and return control to an interactive state.

use std::collections::VecDeque;

use estately_states::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }
}

/// Ordered queue of notifications not yet shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notifications {
    queue: VecDeque<Notification>,
}

impl State for Notifications {}

impl Notifications {
    pub fn push(&mut self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => log::warn!("notify: {}", notification.message),
            _ => log::info!("notify: {}", notification.message),
        }
        self.queue.push_back(notification);
    }

    /// Take every queued notification, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn last(&self) -> Option<&Notification> {
        self.queue.back()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }
}
