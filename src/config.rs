//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "relay-timer")]
#[command(about = "A sequencing countdown-timer service with pause/skip/reset control")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the saved queue and settings
    #[arg(short, long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Keep the queue and settings in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Interval between clock samples in milliseconds
    #[arg(long, default_value = "16", value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub frame_ms: u64,

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

    /// Clock sampling interval of the ticker task
    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
