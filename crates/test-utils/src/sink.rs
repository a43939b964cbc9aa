use std::sync::{Arc, Mutex};

use jac::events::{Event, EventSink, Notification, TailEvent};
use jac::types::NotificationKind;

/// Event sink that keeps everything it receives, in order.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn tail_events(&self) -> Vec<TailEvent> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Tail(t) => Some(t),
                Event::Notify(_) => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Notify(n) => Some(n),
                Event::Tail(_) => None,
            })
            .collect()
    }

    pub fn notifications_of(&self, kind: NotificationKind) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|n| n.kind == kind)
            .collect()
    }

    /// Every tailed line, flattened across `Lines` batches.
    pub fn lines(&self) -> Vec<String> {
        self.tail_events()
            .into_iter()
            .filter_map(|t| match t {
                TailEvent::Lines(lines) => Some(lines),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Sizes of the `Lines` batches, in emission order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.tail_events()
            .into_iter()
            .filter_map(|t| match t {
                TailEvent::Lines(lines) => Some(lines.len()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}
