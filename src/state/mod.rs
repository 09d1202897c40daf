//! State management module
//!
//! This module contains the time unit state machine, the registry that owns
//! every unit, and the shared application state built on top of it.

pub mod app_state;
pub mod counter;
pub mod registry;
pub mod snapshot;
pub mod time_unit;

// Re-export main types
pub use app_state::AppState;
pub use counter::{Advance, Countdown, Counter, Progression, Stopwatch};
pub use registry::TimeUnitRegistry;
pub use snapshot::{UnitEvent, UnitSnapshot};
pub use time_unit::{
    RunState, TimeUnit, ToggleAction, ToggleIcon, Transition, UnitAction, UnitId, UnitKind,
};
