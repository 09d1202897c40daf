//! Background tasks module
//!
//! This module contains the tickers that drive running units, one periodic
//! registration per unit.

pub mod interval;
pub mod manual;
pub mod ticker;

// Re-export main types
pub use interval::IntervalScheduler;
pub use manual::{ManualScheduler, ScheduledTick};
pub use ticker::{TickScheduler, TickSink, Ticker};
