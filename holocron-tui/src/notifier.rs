//! Routes mutation notifications into the UI event loop.

use crate::events::TuiEvent;
use holocron_client::{Notification, Notifier};
use tokio::sync::mpsc;

pub struct EventNotifier {
    sender: mpsc::Sender<TuiEvent>,
}

impl EventNotifier {
    pub fn new(sender: mpsc::Sender<TuiEvent>) -> Self {
        Self { sender }
    }
}

impl Notifier for EventNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(err) = self.sender.try_send(TuiEvent::Notify(notification)) {
            tracing::warn!(error = %err, "dropping notification, event queue unavailable");
        }
    }
}
