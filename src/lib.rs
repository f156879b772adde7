//! Countdown Dial - a countdown timer with a circular progress dial
//! 
//! This library provides the countdown state machine, the duration editor
//! that feeds it, the dial mapping, and an HTTP control surface around them.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod surface;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{ControlError, ValidationError};
pub use state::{AppState, TimerSnapshot, TimerState};
pub use tasks::{countdown_task, Command};
pub use timer::{DurationEditor, TimerEngine};
pub use utils::signals::shutdown_signal;
