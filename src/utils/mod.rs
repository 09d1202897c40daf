//! Utility functions module
//!
//! This module contains utility functions used throughout the application.

pub mod format;
pub mod signals;

// Re-export main functions
pub use format::{format_hms, format_ms, parse_duration_input};
pub use signals::shutdown_signal;
