//! Manually driven scheduler

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::ticker::{TickScheduler, TickSink, Ticker};
use crate::state::UnitId;

/// A ticker registration recorded by [`ManualScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTick {
    pub unit: UnitId,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct Registrations {
    live: Vec<ScheduledTick>,
    scheduled: usize,
    cancelled: usize,
}

/// Scheduler that never fires on its own.
///
/// It records which tickers are live so the owner can fire them explicitly,
/// which keeps tick delivery deterministic.
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    inner: Arc<Mutex<Registrations>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn registrations(&self) -> MutexGuard<'_, Registrations> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tickers that have been scheduled and not yet cancelled
    pub fn live(&self) -> Vec<ScheduledTick> {
        self.registrations().live.clone()
    }

    /// Live ticker for `unit`, if any
    pub fn live_for(&self, unit: UnitId) -> Option<ScheduledTick> {
        self.registrations().live.iter().copied().find(|t| t.unit == unit)
    }

    pub fn scheduled_count(&self) -> usize {
        self.registrations().scheduled
    }

    pub fn cancelled_count(&self) -> usize {
        self.registrations().cancelled
    }

    /// Fire every live ticker once against `sink`, returning how many ticks
    /// were accepted.
    pub fn fire_all(&self, sink: &dyn TickSink) -> usize {
        self.live()
            .into_iter()
            .filter(|tick| sink.deliver_tick(tick.unit, tick.generation))
            .count()
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&self, unit: UnitId, generation: u64) -> Ticker {
        let tick = ScheduledTick { unit, generation };
        {
            let mut registrations = self.registrations();
            registrations.live.push(tick);
            registrations.scheduled += 1;
        }

        let inner = Arc::clone(&self.inner);
        Ticker::new(generation, move || {
            let mut registrations = inner.lock().unwrap_or_else(PoisonError::into_inner);
            registrations.live.retain(|live| *live != tick);
            registrations.cancelled += 1;
        })
    }
}
