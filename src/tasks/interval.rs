//! Interval-driven ticker background tasks

use std::{sync::Weak, time::Duration};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use super::ticker::{TickScheduler, TickSink, Ticker};
use crate::state::UnitId;

/// Scheduler that spawns one tokio task per running unit.
///
/// Each task fires once per `period`, starting one period after the unit was
/// started. Late ticks are delayed rather than bunched up, and no attempt is
/// made to catch up on drift.
pub struct IntervalScheduler {
    sink: Weak<dyn TickSink>,
    period: Duration,
}

impl IntervalScheduler {
    pub fn new(sink: Weak<dyn TickSink>, period: Duration) -> Self {
        Self { sink, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl TickScheduler for IntervalScheduler {
    fn schedule(&self, unit: UnitId, generation: u64) -> Ticker {
        let sink = self.sink.clone();
        let period = self.period;

        let task = tokio::spawn(async move {
            debug!("Ticker {} started for unit {}", generation, unit);

            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let Some(target) = sink.upgrade() else {
                    debug!("Tick sink dropped, ending ticker {} for unit {}", generation, unit);
                    break;
                };

                if !target.deliver_tick(unit, generation) {
                    debug!("Ticker {} for unit {} retired", generation, unit);
                    break;
                }
            }
        });

        let abort = task.abort_handle();
        Ticker::new(generation, move || abort.abort())
    }
}
