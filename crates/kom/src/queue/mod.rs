//! Read queue: the order in which unread texts are presented

mod events;
mod read_queue;

pub use events::{QueueEvent, QueueObserver};
pub use read_queue::{AdvanceStep, ReadQueue};
