// src/events.rs

//! Outbound events: tail session output and operator notifications.
//!
//! Producers never wait for the consumer. The channel sink is unbounded, so
//! a slow consumer only ever sees more (bounded-size) events queued up.

use std::fmt::Debug;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::debug;

use crate::types::NotificationKind;

/// Events produced by the log tail engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailEvent {
    Started(PathBuf),
    Lines(Vec<String>),
    Error(String),
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Tail(TailEvent),
    Notify(Notification),
}

/// Anything that can accept events without blocking.
pub trait EventSink: Send + Sync + Debug {
    fn emit(&self, event: Event);

    fn notify(&self, kind: NotificationKind, title: &str, message: &str) {
        self.emit(Event::Notify(Notification::new(kind, title, message)));
    }

    fn info(&self, title: &str, message: &str) {
        self.notify(NotificationKind::Info, title, message);
    }

    fn warn(&self, title: &str, message: &str) {
        self.notify(NotificationKind::Warn, title, message);
    }

    fn error(&self, title: &str, message: &str) {
        self.notify(NotificationKind::Error, title, message);
    }

    fn success(&self, title: &str, message: &str) {
        self.notify(NotificationKind::Success, title, message);
    }
}

/// Sink backed by an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { tx }
    }

    /// Convenience: create a sink together with its receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: Event) {
        if self.tx.send(event).is_err() {
            debug!("event receiver dropped; discarding event");
        }
    }
}
