//! Notification adapter that reports through `tracing`.

use tracing::info;

use crate::domain::ports::Notifier;

/// Emits each notification as an `info` event on the `repolens::notify`
/// target. Hosts without a desktop notification facility use this.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, title: &str, body: &str) {
        info!(target: "repolens::notify", title, body, "notification");
    }
}
