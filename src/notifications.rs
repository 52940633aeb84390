//! User-facing notifications.
//!
//! The catalog service reports the outcome of every write through a
//! [`Notifier`]. Texts are fixed; raw backend errors never reach a
//! notification and are only logged.

use std::sync::{Mutex, MutexGuard};

pub const TITLE_SUCCESS: &str = "Success";
pub const TITLE_ERROR: &str = "Error";
pub const TITLE_INVALID_FILE: &str = "Invalid file";

pub const MSG_CREATED: &str = "Service created successfully";
pub const MSG_UPDATED: &str = "Service updated successfully";
pub const MSG_DELETED: &str = "Service deleted successfully";
pub const MSG_SAVE_FAILED: &str = "Failed to save service";
pub const MSG_DELETE_FAILED: &str = "Failed to delete service";
pub const MSG_LOAD_FAILED: &str = "Failed to load services";
pub const MSG_INVALID_FILE: &str = "Please select an image file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A short message for the person using the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            title: TITLE_SUCCESS.to_string(),
            description: description.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: TITLE_ERROR.to_string(),
            description: description.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn invalid_file() -> Self {
        Self {
            title: TITLE_INVALID_FILE.to_string(),
            description: MSG_INVALID_FILE.to_string(),
            level: NotificationLevel::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log. Used by the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                tracing::info!(title = %notification.title, "{}", notification.description)
            }
            NotificationLevel::Error => {
                tracing::warn!(title = %notification.title, "{}", notification.description)
            }
        }
    }
}

/// Keeps every notification in memory, in order.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        self.lock().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_notifier_keeps_order() {
        let notifier = CollectingNotifier::new();
        notifier.notify(Notification::success(MSG_CREATED));
        notifier.notify(Notification::error(MSG_DELETE_FAILED));

        let received = notifier.notifications();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].title, "Success");
        assert_eq!(received[1].description, "Failed to delete service");
        assert!(notifier.last().unwrap().is_error());

        notifier.clear();
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn test_invalid_file_text() {
        let n = Notification::invalid_file();
        assert_eq!(n.title, "Invalid file");
        assert_eq!(n.description, "Please select an image file");
        assert!(n.is_error());
    }
}
