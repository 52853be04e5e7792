//! Notifications emitted by the read queue

use log::trace;
use std::sync::mpsc;

use crate::models::TextNo;

/// A change in the read queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// Text numbers that were not already pending
    Added(Vec<TextNo>),
    /// A text number was taken out of the pending set
    Removed(TextNo),
    /// An advancement finished; carries the current text afterwards
    Changed(Option<TextNo>),
}

/// Receives read queue notifications
///
/// Observers are called synchronously, in subscription order, while the
/// queue is mutably borrowed.
pub trait QueueObserver: Send + Sync {
    fn on_event(&self, event: &QueueEvent);
}

impl QueueObserver for mpsc::Sender<QueueEvent> {
    fn on_event(&self, event: &QueueEvent) {
        if self.send(event.clone()).is_err() {
            trace!("Dropping {:?}, receiver is gone", event);
        }
    }
}
