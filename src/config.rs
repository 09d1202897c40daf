//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "timekeeper")]
#[command(about = "A state-managed HTTP server hosting independent stopwatches and countdowns")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20553")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Milliseconds between ticks of a running unit
    #[arg(long = "tick-ms", default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Unit change notifications buffered per event subscriber
    #[arg(long = "event-buffer", default_value = "100", value_parser = clap::value_parser!(u64).range(1..=1_000_000))]
    pub event_buffer: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn event_capacity(&self) -> usize {
        usize::try_from(self.event_buffer).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["timekeeper"]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:20553");
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.event_capacity(), 100);
    }

    #[test]
    fn overrides() {
        let config =
            Config::try_parse_from(["timekeeper", "-p", "8080", "--tick-ms", "250", "-v"]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        assert!(Config::try_parse_from(["timekeeper", "--tick-ms", "0"]).is_err());
    }
}
