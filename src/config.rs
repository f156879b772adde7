//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::{state::FieldId, timer::ValidationMode};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "countdown-dial")]
#[command(about = "A countdown timer with a circular progress dial")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port for the control API
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Initial hours field
    #[arg(long, default_value = "00")]
    pub hours: String,

    /// Initial minutes field
    #[arg(short, long, default_value = "00")]
    pub minutes: String,

    /// Initial seconds field
    #[arg(short, long, default_value = "00")]
    pub seconds: String,

    /// Initial hundredths field
    #[arg(long, default_value = "00")]
    pub hundredths: String,

    /// Drop the hundredths field; the shortest countdown is then one second
    #[arg(long)]
    pub no_hundredths: bool,

    /// Digit shape a field must have: lenient takes 1-2 digits, strict exactly 2
    #[arg(long, value_enum, default_value_t = ValidationMode::Lenient)]
    pub validation: ValidationMode,

    /// Milliseconds between dial frames
    #[arg(long, default_value = "16", value_parser = clap::value_parser!(u64).range(1..))]
    pub frame_ms: u64,

    /// Start counting down right away
    #[arg(long)]
    pub start: bool,

    /// Do not draw the dial in the terminal
    #[arg(short, long)]
    pub quiet: bool,

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

    pub fn with_hundredths(&self) -> bool {
        !self.no_hundredths
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    /// Field texts to enter before the server starts
    pub fn initial_fields(&self) -> Vec<(FieldId, &str)> {
        let mut fields = vec![
            (FieldId::Hours, self.hours.as_str()),
            (FieldId::Minutes, self.minutes.as_str()),
            (FieldId::Seconds, self.seconds.as_str()),
        ];
        if self.with_hundredths() {
            fields.push((FieldId::Hundredths, self.hundredths.as_str()));
        }
        fields
    }
}
