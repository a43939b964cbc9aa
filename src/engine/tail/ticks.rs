// src/engine/tail/ticks.rs

//! Tick sources driving the tail poll loop.
//!
//! Production uses [`IntervalTicks`]. Tests use [`manual_ticks`], which
//! lets them fire ticks one at a time and wait until each one has been fully
//! handled, with no wall-clock sleeps involved.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};

use crate::process::BoxFuture;

pub trait TickSource: Send + 'static {
    /// Wait for the next tick. Returns `false` once the source is exhausted,
    /// which ends the poll loop.
    fn tick(&mut self) -> BoxFuture<'_, bool>;
}

/// Fixed-period ticks. The first tick fires immediately.
#[derive(Debug)]
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

impl TickSource for IntervalTicks {
    fn tick(&mut self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            self.interval.tick().await;
            true
        })
    }
}

/// Tick source fed by a [`TickHandle`].
#[derive(Debug)]
pub struct ManualTicks {
    ticks: mpsc::UnboundedReceiver<oneshot::Sender<()>>,
    pending_ack: Option<oneshot::Sender<()>>,
}

/// Test-side handle of a [`ManualTicks`] source.
#[derive(Debug, Clone)]
pub struct TickHandle {
    tx: mpsc::UnboundedSender<oneshot::Sender<()>>,
}

/// Create a connected tick handle / tick source pair.
pub fn manual_ticks() -> (TickHandle, ManualTicks) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        TickHandle { tx },
        ManualTicks {
            ticks: rx,
            pending_ack: None,
        },
    )
}

impl TickHandle {
    /// Fire one tick and wait until the poll loop has handled it and asks
    /// for the next one.
    ///
    /// Returns `false` if the loop ended before acknowledging the tick.
    pub async fn advance(&self) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(ack_tx).is_err() {
            return false;
        }
        ack_rx.await.is_ok()
    }
}

impl TickSource for ManualTicks {
    fn tick(&mut self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            // Being asked for the next tick means the previous one is done.
            if let Some(ack) = self.pending_ack.take() {
                let _ = ack.send(());
            }

            match self.ticks.recv().await {
                Some(ack) => {
                    self.pending_ack = Some(ack);
                    true
                }
                None => false,
            }
        })
    }
}
