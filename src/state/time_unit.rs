//! Time unit state machine
//!
//! ```text
//! Idle ──start──▶ Running ──pause──▶ Paused
//!                  ▲   │  ◀──resume──┘
//!                  │   └──stop / expiry──▶ Stopped
//!                  └────────start────────────┘
//! ```
//!
//! `stop` is accepted from every state. Idle is never re-entered.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::counter::{Advance, Countdown, Counter, Progression, Stopwatch};
use super::snapshot::UnitSnapshot;
use crate::tasks::{TickScheduler, Ticker};
use crate::utils::format::{format_hms, format_ms};

/// Stable identity of a unit within a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(u64);

impl UnitId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Stopwatch,
    Countdown,
}

impl UnitKind {
    pub fn label(self) -> &'static str {
        match self {
            UnitKind::Stopwatch => "Stopwatch",
            UnitKind::Countdown => "Countdown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Stopped => "stopped",
        }
    }
}

/// Icon the toggle button should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleIcon {
    Play,
    Pause,
}

impl From<RunState> for ToggleIcon {
    fn from(state: RunState) -> Self {
        match state {
            RunState::Running => ToggleIcon::Pause,
            RunState::Idle | RunState::Paused | RunState::Stopped => ToggleIcon::Play,
        }
    }
}

/// What `toggle` resolves to in a given state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Start,
    Pause,
    Resume,
}

/// User-driven lifecycle operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitAction {
    Start,
    Pause,
    Resume,
    Toggle,
    Stop,
}

impl UnitAction {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitAction::Start => "start",
            UnitAction::Pause => "pause",
            UnitAction::Resume => "resume",
            UnitAction::Toggle => "toggle",
            UnitAction::Stop => "stop",
        }
    }
}

impl fmt::Display for UnitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an operation changed the unit.
///
/// Operations are defined in every state; those that make no sense in the
/// current one leave the unit untouched and report `Ignored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Applied,
    Ignored,
}

impl Transition {
    pub fn is_applied(self) -> bool {
        self == Transition::Applied
    }
}

/// One stopwatch or countdown with its own identity, progress and run state
#[derive(Debug)]
pub struct TimeUnit {
    id: UnitId,
    name: String,
    counter: Counter,
    run_state: RunState,
    /// Present exactly while `run_state` is `Running`
    ticker: Option<Ticker>,
    generation: u64,
}

impl TimeUnit {
    pub fn stopwatch(id: UnitId, name: impl Into<String>) -> Self {
        Self::with_counter(id, name.into(), Counter::Stopwatch(Stopwatch::default()))
    }

    pub fn countdown(id: UnitId, name: impl Into<String>, duration_seconds: u64) -> Self {
        Self::with_counter(
            id,
            name.into(),
            Counter::Countdown(Countdown::new(duration_seconds)),
        )
    }

    fn with_counter(id: UnitId, name: String, counter: Counter) -> Self {
        Self {
            id,
            name,
            counter,
            run_state: RunState::Idle,
            ticker: None,
            generation: 0,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn kind(&self) -> UnitKind {
        match self.counter {
            Counter::Stopwatch(_) => UnitKind::Stopwatch,
            Counter::Countdown(_) => UnitKind::Countdown,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn progress(&self) -> u64 {
        self.counter.progress()
    }

    /// Configured duration of a countdown; `None` for stopwatches
    pub fn configured_duration(&self) -> Option<u64> {
        self.counter.configured_duration()
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.run_state == RunState::Paused
    }

    pub fn icon(&self) -> ToggleIcon {
        self.run_state.into()
    }

    pub fn has_ticker(&self) -> bool {
        self.ticker.is_some()
    }

    /// Generation of the live ticker, if the unit is running
    pub fn ticker_generation(&self) -> Option<u64> {
        self.ticker.as_ref().map(Ticker::generation)
    }

    /// Formatted progress: `HH:MM:SS` for stopwatches, `MM:SS` for countdowns
    pub fn display(&self) -> String {
        match self.kind() {
            UnitKind::Stopwatch => format_hms(self.progress()),
            UnitKind::Countdown => format_ms(self.progress()),
        }
    }

    /// Operation `toggle` dispatches to in the current state
    pub fn toggle_action(&self) -> ToggleAction {
        if self.is_paused() {
            ToggleAction::Resume
        } else if self.is_running() {
            ToggleAction::Pause
        } else {
            ToggleAction::Start
        }
    }

    pub fn start(&mut self, scheduler: &dyn TickScheduler) -> Transition {
        if self.is_running() {
            debug!("Unit {} is already running", self.id);
            return Transition::Ignored;
        }
        if !self.counter.can_start() {
            debug!("Unit {} has no time left, not starting", self.id);
            return Transition::Ignored;
        }

        self.generation += 1;
        self.ticker = Some(scheduler.schedule(self.id, self.generation));
        self.run_state = RunState::Running;
        info!("Unit {} ({}) running at {}", self.id, self.name, self.display());
        Transition::Applied
    }

    pub fn pause(&mut self) -> Transition {
        if !self.is_running() {
            debug!("Unit {} is not running, nothing to pause", self.id);
            return Transition::Ignored;
        }

        self.ticker = None;
        self.run_state = RunState::Paused;
        info!("Unit {} ({}) paused at {}", self.id, self.name, self.display());
        Transition::Applied
    }

    pub fn resume(&mut self, scheduler: &dyn TickScheduler) -> Transition {
        if !self.is_paused() {
            debug!("Unit {} is not paused, nothing to resume", self.id);
            return Transition::Ignored;
        }
        self.start(scheduler)
    }

    pub fn toggle(&mut self, scheduler: &dyn TickScheduler) -> Transition {
        match self.toggle_action() {
            ToggleAction::Resume => self.resume(scheduler),
            ToggleAction::Pause => self.pause(),
            ToggleAction::Start => self.start(scheduler),
        }
    }

    /// Release the ticker and return to the resting progress. A unit that is
    /// not in progress (idle, or stopped and possibly re-armed) keeps its
    /// remaining time.
    pub fn stop(&mut self) -> Transition {
        let configuring = matches!(self.run_state, RunState::Idle | RunState::Stopped);
        self.ticker = None;
        self.counter.rest(configuring);
        self.run_state = RunState::Stopped;
        info!("Unit {} ({}) stopped", self.id, self.name);
        Transition::Applied
    }

    /// Apply one second from the ticker with the given generation.
    ///
    /// Ticks from a cancelled or replaced ticker are ignored.
    pub fn tick(&mut self, generation: u64) -> Transition {
        if self.ticker_generation() != Some(generation) {
            debug!("Dropping stale tick {} for unit {}", generation, self.id);
            return Transition::Ignored;
        }

        if self.counter.advance() == Advance::Expired {
            info!("Unit {} ({}) expired", self.id, self.name);
            self.stop();
        }
        Transition::Applied
    }

    /// Configure a countdown's duration. Only idle or stopped countdowns
    /// accept a new duration; negative input counts as 0.
    pub fn set_duration(&mut self, seconds: i64) -> Transition {
        if matches!(self.run_state, RunState::Running | RunState::Paused) {
            debug!("Unit {} is in progress, keeping its duration", self.id);
            return Transition::Ignored;
        }

        let Counter::Countdown(countdown) = &mut self.counter else {
            debug!("Unit {} is a stopwatch and has no duration", self.id);
            return Transition::Ignored;
        };

        let seconds = u64::try_from(seconds).unwrap_or(0);
        countdown.configure(seconds);
        info!("Unit {} ({}) set to {}", self.id, self.name, format_ms(seconds));
        Transition::Applied
    }

    pub fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            kind: self.kind(),
            name: self.name.clone(),
            progress: self.progress(),
            configured_duration: self.configured_duration(),
            run_state: self.run_state,
            icon: self.icon(),
            display: self.display(),
            ticking: self.has_ticker(),
        }
    }
}
