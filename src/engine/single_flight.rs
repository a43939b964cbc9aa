// src/engine/single_flight.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Guard allowing at most one holder at a time.
///
/// The flag can only be taken through [`SingleFlight::try_acquire`]
/// (compare-and-swap) and is released when the returned permit is dropped,
/// which also covers early returns and panics in the holder.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the guard if nobody holds it.
    pub fn try_acquire(&self) -> Option<SingleFlightPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SingleFlightPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof of holding a [`SingleFlight`]; releases it on drop.
#[derive(Debug)]
pub struct SingleFlightPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for SingleFlightPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
