//! Ticker contract between running units and whatever drives their ticks

use std::fmt;

use crate::state::UnitId;

/// Receives the ticks a scheduler produces.
///
/// Schedulers only hold a non-owning reference to their sink, so a sink that
/// has been dropped simply stops receiving ticks.
pub trait TickSink: Send + Sync {
    /// Deliver one tick for `unit` from the ticker with the given generation.
    ///
    /// Returns whether the ticker should keep firing. A tick for a unit that
    /// no longer exists, or from a ticker that has since been replaced, is
    /// dropped and reported as `false`.
    fn deliver_tick(&self, unit: UnitId, generation: u64) -> bool;
}

/// Allocates periodic tickers for running units
pub trait TickScheduler: Send + Sync {
    /// Begin ticking `unit` once per period. The ticker keeps running until
    /// the returned handle is dropped.
    fn schedule(&self, unit: UnitId, generation: u64) -> Ticker;
}

/// Live registration of a periodic tick for one unit.
///
/// Owned exclusively by the unit while it is running. Dropping it cancels
/// every tick that has not been dispatched yet.
pub struct Ticker {
    generation: u64,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Ticker {
    pub fn new<F>(generation: u64, cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            generation,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticker")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[test]
    fn dropping_a_ticker_cancels_it_once() {
        let cancelled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&cancelled);
        let ticker = Ticker::new(4, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(ticker.generation(), 4);
        assert_eq!(cancelled.load(Ordering::SeqCst), 0);
        drop(ticker);
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }
}
