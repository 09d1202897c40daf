//! Timekeeper - A state-managed HTTP server hosting stopwatches and countdowns
//!
//! This library provides independent stopwatch and countdown units, the
//! registry that owns them, the tickers that drive them once per second, and
//! an HTTP surface a front end can use to control and observe them.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::CoreError;
pub use state::{AppState, TimeUnit, TimeUnitRegistry};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
