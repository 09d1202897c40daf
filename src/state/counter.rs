//! Progress counters for the two kinds of time unit

use serde::{Deserialize, Serialize};

/// Result of advancing a counter by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Continue,
    Expired,
}

/// Behaviour shared by every counter variant
pub trait Progression {
    /// Seconds shown for the unit: elapsed for stopwatches, remaining for countdowns
    fn progress(&self) -> u64;

    /// Whether a ticker may be started from the current progress
    fn can_start(&self) -> bool;

    /// Apply one elapsed second
    fn advance(&mut self) -> Advance;

    /// Return to the resting value after a stop. `configuring` is set when the
    /// unit was not in progress (idle or already stopped).
    fn rest(&mut self, configuring: bool);
}

/// Counts elapsed seconds upward without bound
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stopwatch {
    elapsed: u64,
}

impl Progression for Stopwatch {
    fn progress(&self) -> u64 {
        self.elapsed
    }

    fn can_start(&self) -> bool {
        true
    }

    fn advance(&mut self) -> Advance {
        self.elapsed = self.elapsed.saturating_add(1);
        Advance::Continue
    }

    fn rest(&mut self, _configuring: bool) {
        self.elapsed = 0;
    }
}

/// Counts remaining seconds down from a configured duration.
///
/// `remaining` never exceeds `configured`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u64,
    configured: u64,
}

impl Countdown {
    pub fn new(duration: u64) -> Self {
        Self {
            remaining: duration,
            configured: duration,
        }
    }

    pub fn configured(&self) -> u64 {
        self.configured
    }

    /// Replace the configured duration and rearm the remaining time
    pub fn configure(&mut self, duration: u64) {
        self.configured = duration;
        self.remaining = duration;
    }
}

impl Progression for Countdown {
    fn progress(&self) -> u64 {
        self.remaining
    }

    fn can_start(&self) -> bool {
        self.remaining > 0
    }

    fn advance(&mut self) -> Advance {
        if self.remaining == 0 {
            return Advance::Expired;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            Advance::Expired
        } else {
            Advance::Continue
        }
    }

    fn rest(&mut self, configuring: bool) {
        if !configuring {
            self.remaining = 0;
        }
    }
}

/// Counter of a time unit, tagged by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Stopwatch(Stopwatch),
    Countdown(Countdown),
}

impl Counter {
    fn as_progression(&self) -> &dyn Progression {
        match self {
            Counter::Stopwatch(stopwatch) => stopwatch,
            Counter::Countdown(countdown) => countdown,
        }
    }

    fn as_progression_mut(&mut self) -> &mut dyn Progression {
        match self {
            Counter::Stopwatch(stopwatch) => stopwatch,
            Counter::Countdown(countdown) => countdown,
        }
    }

    pub fn configured_duration(&self) -> Option<u64> {
        match self {
            Counter::Stopwatch(_) => None,
            Counter::Countdown(countdown) => Some(countdown.configured()),
        }
    }
}

impl Progression for Counter {
    fn progress(&self) -> u64 {
        self.as_progression().progress()
    }

    fn can_start(&self) -> bool {
        self.as_progression().can_start()
    }

    fn advance(&mut self) -> Advance {
        self.as_progression_mut().advance()
    }

    fn rest(&mut self, configuring: bool) {
        self.as_progression_mut().rest(configuring)
    }
}
