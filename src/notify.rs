//! Completion notifications. Modeled as an optional capability: an
//! implementation may show a desktop notification, play a chime, or do
//! nothing at all, but it must never block or fail timer logic.

use log::info;

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _message: &str) {}
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        info!("{message}");
    }
}
