//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::{
    RunState, TimeUnitRegistry, Transition, UnitAction, UnitEvent, UnitId, UnitKind, UnitSnapshot,
};
use crate::{
    error::{CoreError, Result},
    tasks::{IntervalScheduler, TickScheduler, TickSink},
};

/// Notifications a subscriber may fall behind by before it starts lagging
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Main application state that owns the unit registry and publishes changes
#[derive(Debug)]
pub struct AppState {
    /// Every live unit, in display order
    registry: Mutex<TimeUnitRegistry>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for unit change notifications
    unit_events_tx: broadcast::Sender<UnitEvent>,
}

impl AppState {
    /// Create the state with interval tickers firing every `tick_interval`
    /// and room for `event_capacity` undelivered notifications per subscriber.
    ///
    /// Tickers are spawned on the current tokio runtime when units start.
    pub fn new(port: u16, host: String, tick_interval: Duration, event_capacity: usize) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<AppState>| {
            let sink: Weak<dyn TickSink> = weak.clone();
            let scheduler = Arc::new(IntervalScheduler::new(sink, tick_interval));
            Self::build(port, host, scheduler, event_capacity)
        })
    }

    /// Create the state with a caller-provided scheduler
    pub fn with_scheduler(port: u16, host: String, scheduler: Arc<dyn TickScheduler>) -> Self {
        Self::build(port, host, scheduler, DEFAULT_EVENT_CAPACITY)
    }

    fn build(port: u16, host: String, scheduler: Arc<dyn TickScheduler>, event_capacity: usize) -> Self {
        let (unit_events_tx, _) = broadcast::channel(event_capacity.max(1));

        Self {
            registry: Mutex::new(TimeUnitRegistry::new(scheduler)),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            unit_events_tx,
        }
    }

    fn registry(&self) -> Result<MutexGuard<'_, TimeUnitRegistry>> {
        self.registry
            .lock()
            .map_err(|_| CoreError::LockPoisoned("unit registry"))
    }

    /// Subscribe to unit change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<UnitEvent> {
        self.unit_events_tx.subscribe()
    }

    fn publish(&self, event: UnitEvent) {
        // Sending only fails when nobody is listening
        if self.unit_events_tx.send(event).is_err() {
            debug!("No subscribers for unit event");
        }
    }

    fn record_action(&self, action: String) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action);
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Apply `updater` to the registry and publish the events it produces.
    ///
    /// Events are sent before the registry lock is released, so subscribers
    /// observe them in the order the mutations happened.
    fn update_registry<T, F>(&self, updater: F) -> Result<T>
    where
        F: FnOnce(&mut TimeUnitRegistry) -> Result<(T, Vec<UnitEvent>)>,
    {
        let mut registry = self.registry()?;
        let (value, events) = updater(&mut registry)?;
        for event in events {
            self.publish(event);
        }
        drop(registry);
        Ok(value)
    }

    /// Create a new idle unit at the end of the list
    pub fn add_unit(&self, kind: UnitKind, name: Option<String>, duration_seconds: u64) -> Result<UnitSnapshot> {
        let snapshot = self.update_registry(|registry| {
            let id = registry.add(kind, name, duration_seconds);
            let snapshot = registry.snapshot(id)?;
            Ok((snapshot.clone(), vec![UnitEvent::Added { unit: snapshot }]))
        })?;

        self.record_action(format!("create {}", kind.label().to_lowercase()));
        Ok(snapshot)
    }

    /// Run a lifecycle operation on a unit
    pub fn apply(&self, id: UnitId, action: UnitAction) -> Result<(Transition, UnitSnapshot)> {
        let result = self.update_registry(|registry| {
            let (transition, snapshot) = registry.apply(id, action)?;
            Ok(((transition, snapshot.clone()), changed_if_applied(transition, snapshot)))
        })?;

        self.record_action(format!("{} {}", action, id));
        Ok(result)
    }

    pub fn rename(&self, id: UnitId, name: String) -> Result<UnitSnapshot> {
        let snapshot = self.update_registry(|registry| {
            let snapshot = registry.rename(id, name)?;
            Ok((snapshot.clone(), vec![UnitEvent::Changed { unit: snapshot }]))
        })?;

        self.record_action(format!("rename {}", id));
        Ok(snapshot)
    }

    pub fn set_duration(&self, id: UnitId, seconds: i64) -> Result<(Transition, UnitSnapshot)> {
        let result = self.update_registry(|registry| {
            let (transition, snapshot) = registry.set_duration(id, seconds)?;
            Ok(((transition, snapshot.clone()), changed_if_applied(transition, snapshot)))
        })?;

        self.record_action(format!("set duration {}", id));
        Ok(result)
    }

    /// Stop and delete a unit by identity
    pub fn remove(&self, id: UnitId) -> Result<UnitSnapshot> {
        let snapshot = self.update_registry(|registry| {
            let snapshot = registry.remove(id)?;
            Ok((snapshot.clone(), vec![UnitEvent::Removed { unit: snapshot }]))
        })?;

        self.record_action(format!("delete {}", id));
        Ok(snapshot)
    }

    /// Stop and delete the unit currently at `position`
    pub fn remove_at(&self, position: usize) -> Result<UnitSnapshot> {
        let snapshot = self.update_registry(|registry| {
            let snapshot = registry.remove_at(position)?;
            Ok((snapshot.clone(), vec![UnitEvent::Removed { unit: snapshot }]))
        })?;

        self.record_action(format!("delete {}", snapshot.id));
        Ok(snapshot)
    }

    pub fn unit(&self, id: UnitId) -> Result<UnitSnapshot> {
        self.registry()?.snapshot(id)
    }

    pub fn units(&self) -> Result<Vec<UnitSnapshot>> {
        Ok(self.registry()?.snapshots())
    }

    /// Stop every unit that is still running or paused
    pub fn stop_all(&self) -> Result<usize> {
        let count = self.update_registry(|registry| {
            let events: Vec<UnitEvent> = registry
                .stop_all()
                .into_iter()
                .map(|unit| UnitEvent::Changed { unit })
                .collect();
            Ok((events.len(), events))
        })?;

        if count > 0 {
            info!("Stopped {} active units", count);
        }
        Ok(count)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

impl TickSink for AppState {
    fn deliver_tick(&self, unit: UnitId, generation: u64) -> bool {
        let delivered = self.update_registry(|registry| {
            Ok(match registry.tick(unit, generation) {
                Some(snapshot) => {
                    let keep_going = snapshot.run_state == RunState::Running;
                    (keep_going, vec![UnitEvent::Changed { unit: snapshot }])
                }
                None => (false, Vec::new()),
            })
        });

        match delivered {
            Ok(keep_going) => keep_going,
            Err(e) => {
                tracing::error!("Failed to deliver tick to unit {}: {}", unit, e);
                false
            }
        }
    }
}

fn changed_if_applied(transition: Transition, unit: UnitSnapshot) -> Vec<UnitEvent> {
    if transition.is_applied() {
        vec![UnitEvent::Changed { unit }]
    } else {
        Vec::new()
    }
}
