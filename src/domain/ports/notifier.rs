//! Notification port.

/// Delivers a short user-facing notification.
pub trait Notifier: Send + Sync {
    /// Deliver one notification. Must not block.
    fn notify(&self, title: &str, body: &str);
}

/// A notifier that drops every notification.
///
/// Use this when notifications are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _title: &str, _body: &str) {}
}
