//! Observable views of units and the change events published for them

use serde::{Deserialize, Serialize};

use super::time_unit::{RunState, ToggleIcon, UnitId, UnitKind};

/// Everything the presentation layer needs to render one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub kind: UnitKind,
    pub name: String,
    /// Elapsed seconds for stopwatches, remaining seconds for countdowns
    pub progress: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configured_duration: Option<u64>,
    pub run_state: RunState,
    pub icon: ToggleIcon,
    pub display: String,
    pub ticking: bool,
}

/// State change notification, one per mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum UnitEvent {
    Added { unit: UnitSnapshot },
    Changed { unit: UnitSnapshot },
    Removed { unit: UnitSnapshot },
}

impl UnitEvent {
    pub fn name(&self) -> &'static str {
        match self {
            UnitEvent::Added { .. } => "added",
            UnitEvent::Changed { .. } => "changed",
            UnitEvent::Removed { .. } => "removed",
        }
    }

    pub fn unit(&self) -> &UnitSnapshot {
        match self {
            UnitEvent::Added { unit } | UnitEvent::Changed { unit } | UnitEvent::Removed { unit } => {
                unit
            }
        }
    }
}
