//! Notification port - how resources tell the user what happened
//!
//! Resources never talk to a UI directly; they hold an `Arc<dyn Notifier>`
//! and fire messages at it. Nothing is returned or awaited.

use std::sync::Mutex;

pub trait Notifier: Send + Sync {
    fn notify_success(&self, message: &str);
    fn notify_error(&self, message: &str);
}

/// Sends notifications to the log. Used when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_success(&self, message: &str) {
        tracing::info!(%message, "notify success");
    }

    fn notify_error(&self, message: &str) {
        tracing::warn!(%message, "notify error");
    }
}

/// A notification captured by [`MemoryNotifier`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::Success(m) | Notification::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }
}

/// Keeps every notification in order; for headless callers and tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(Notification::is_error)
            .map(|n| n.message().to_string())
            .collect()
    }

    pub fn successes(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|n| !n.is_error())
            .map(|n| n.message().to_string())
            .collect()
    }

    fn push(&self, notification: Notification) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}

impl Notifier for MemoryNotifier {
    fn notify_success(&self, message: &str) {
        self.push(Notification::Success(message.to_string()));
    }

    fn notify_error(&self, message: &str) {
        self.push(Notification::Error(message.to_string()));
    }
}
