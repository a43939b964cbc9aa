// src/engine/mod.rs

//! Background work driven by the supervisor.
//!
//! - [`sequencer`] runs ordered, delayed bulk starts, one at a time.
//! - [`tail`] follows a worker's log file and streams its lines.
//! - [`single_flight`] is the guard that keeps bulk starts exclusive.

pub mod sequencer;
pub mod single_flight;
pub mod tail;

pub use sequencer::{BulkStartSummary, StartupSequencer, startup_order};
pub use single_flight::{SingleFlight, SingleFlightPermit};
pub use tail::{LogTailer, TailOptions};
