// src/engine/tail/mod.rs

//! Poll-based log tailing.
//!
//! The read logic lives in [`cursor`] and has no timers; [`session`] is the
//! async shell that owns the open file and reports through the event sink.
//! [`ticks`] decides when the shell polls.

pub mod cursor;
pub mod session;
pub mod ticks;

pub use cursor::{TailCursor, into_batches};
pub use session::{LogTailer, TailOptions};
pub use ticks::{IntervalTicks, ManualTicks, TickHandle, TickSource, manual_ticks};
