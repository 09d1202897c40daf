//! Ordered collection of time units

use std::{fmt, sync::Arc};

use tracing::{debug, info};

use super::snapshot::UnitSnapshot;
use super::time_unit::{TimeUnit, Transition, UnitAction, UnitId, UnitKind};
use crate::{
    error::{CoreError, Result},
    tasks::TickScheduler,
};

/// Owns every live unit in display order.
///
/// Units are only ever mutated through their own operations, and a unit is
/// always stopped before it leaves the registry so its ticker cannot outlive it.
pub struct TimeUnitRegistry {
    units: Vec<TimeUnit>,
    next_id: u64,
    scheduler: Arc<dyn TickScheduler>,
}

impl TimeUnitRegistry {
    pub fn new(scheduler: Arc<dyn TickScheduler>) -> Self {
        Self {
            units: Vec::new(),
            next_id: 1,
            scheduler,
        }
    }

    fn allocate_id(&mut self) -> UnitId {
        let id = UnitId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create an idle unit at the end of the list. `initial_duration` is only
    /// used by countdowns.
    pub fn add(&mut self, kind: UnitKind, name: Option<String>, initial_duration: u64) -> UnitId {
        let id = self.allocate_id();
        let name = name.unwrap_or_else(|| format!("{} {}", kind.label(), id.get()));
        let unit = match kind {
            UnitKind::Stopwatch => TimeUnit::stopwatch(id, name),
            UnitKind::Countdown => TimeUnit::countdown(id, name, initial_duration),
        };

        info!("Added {} {} ({}) at position {}", kind.label(), id, unit.name(), self.units.len());
        self.units.push(unit);
        id
    }

    pub fn add_stopwatch(&mut self, name: Option<String>) -> UnitId {
        self.add(UnitKind::Stopwatch, name, 0)
    }

    pub fn add_countdown(&mut self, name: Option<String>, duration_seconds: u64) -> UnitId {
        self.add(UnitKind::Countdown, name, duration_seconds)
    }

    /// Stop and remove the unit at `position`; later units shift down by one
    pub fn remove_at(&mut self, position: usize) -> Result<UnitSnapshot> {
        if position >= self.units.len() {
            return Err(CoreError::IndexOutOfRange {
                position,
                len: self.units.len(),
            });
        }

        self.units[position].stop();
        let unit = self.units.remove(position);
        info!("Removed unit {} ({}) from position {}", unit.id(), unit.name(), position);
        Ok(unit.snapshot())
    }

    /// Stop and remove the unit with `id`, resolving its position now
    pub fn remove(&mut self, id: UnitId) -> Result<UnitSnapshot> {
        let position = self.position_of(id).ok_or(CoreError::UnknownUnit(id))?;
        self.remove_at(position)
    }

    pub fn position_of(&self, id: UnitId) -> Option<usize> {
        self.units.iter().position(|unit| unit.id() == id)
    }

    pub fn get(&self, position: usize) -> Option<&TimeUnit> {
        self.units.get(position)
    }

    pub fn get_by_id(&self, id: UnitId) -> Option<&TimeUnit> {
        self.units.iter().find(|unit| unit.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeUnit> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn running_count(&self) -> usize {
        self.units.iter().filter(|unit| unit.is_running()).count()
    }

    pub fn snapshots(&self) -> Vec<UnitSnapshot> {
        self.units.iter().map(TimeUnit::snapshot).collect()
    }

    pub fn snapshot(&self, id: UnitId) -> Result<UnitSnapshot> {
        self.get_by_id(id)
            .map(TimeUnit::snapshot)
            .ok_or(CoreError::UnknownUnit(id))
    }

    fn unit_mut(&mut self, id: UnitId) -> Result<&mut TimeUnit> {
        self.units
            .iter_mut()
            .find(|unit| unit.id() == id)
            .ok_or(CoreError::UnknownUnit(id))
    }

    /// Run a lifecycle operation on the unit with `id`
    pub fn apply(&mut self, id: UnitId, action: UnitAction) -> Result<(Transition, UnitSnapshot)> {
        let scheduler = Arc::clone(&self.scheduler);
        let unit = self.unit_mut(id)?;
        let transition = match action {
            UnitAction::Start => unit.start(scheduler.as_ref()),
            UnitAction::Pause => unit.pause(),
            UnitAction::Resume => unit.resume(scheduler.as_ref()),
            UnitAction::Toggle => unit.toggle(scheduler.as_ref()),
            UnitAction::Stop => unit.stop(),
        };
        Ok((transition, unit.snapshot()))
    }

    pub fn rename(&mut self, id: UnitId, name: impl Into<String>) -> Result<UnitSnapshot> {
        let unit = self.unit_mut(id)?;
        unit.rename(name);
        debug!("Unit {} renamed to {}", id, unit.name());
        Ok(unit.snapshot())
    }

    pub fn set_duration(&mut self, id: UnitId, seconds: i64) -> Result<(Transition, UnitSnapshot)> {
        let unit = self.unit_mut(id)?;
        let transition = unit.set_duration(seconds);
        Ok((transition, unit.snapshot()))
    }

    /// Deliver one tick. Returns the updated snapshot, or `None` when the unit
    /// is gone or the tick came from a ticker that is no longer live.
    pub fn tick(&mut self, id: UnitId, generation: u64) -> Option<UnitSnapshot> {
        let Ok(unit) = self.unit_mut(id) else {
            debug!("Dropping tick {} for removed unit {}", generation, id);
            return None;
        };
        match unit.tick(generation) {
            Transition::Applied => Some(unit.snapshot()),
            Transition::Ignored => None,
        }
    }

    /// Stop every running or paused unit, returning the snapshots that changed
    pub fn stop_all(&mut self) -> Vec<UnitSnapshot> {
        self.units
            .iter_mut()
            .filter(|unit| unit.is_running() || unit.is_paused())
            .map(|unit| {
                unit.stop();
                unit.snapshot()
            })
            .collect()
    }
}

impl fmt::Debug for TimeUnitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeUnitRegistry")
            .field("units", &self.units)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}
