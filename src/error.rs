//! Error types shared by the registry, the application state and the API

use thiserror::Error;

use crate::state::UnitId;

/// Failures surfaced to the caller of a registry or application state operation.
///
/// Operations requested in a state where they have no meaning (pausing an idle
/// unit, starting an empty countdown) are not errors; they come back as
/// [`Transition::Ignored`](crate::state::Transition::Ignored).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("position {position} is out of range for {len} units")]
    IndexOutOfRange { position: usize, len: usize },

    #[error("no unit with id {0}")]
    UnknownUnit(UnitId),

    #[error("failed to lock {0}")]
    LockPoisoned(&'static str),
}

impl CoreError {
    /// Whether the error is caused by addressing a unit that is not there
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. } | Self::UnknownUnit(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
