//! Handles the timer talks to instead of a concrete UI
//!
//! The editor and the engine only ever see these traits, so the same state
//! machine drives the terminal dial, the HTTP server, and the tests.

pub mod headless;
pub mod terminal;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationError,
    state::ToggleIcon,
};

/// A text-bearing duration input
pub trait FieldHandle: Send {
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);
    fn is_invalid(&self) -> bool;
    /// Visual error marker (the reference page paints the digits red)
    fn set_invalid(&mut self, invalid: bool);
    fn is_editable(&self) -> bool;
    fn set_editable(&mut self, editable: bool);
}

/// The start/pause button
pub trait ToggleControl: Send {
    fn set_icon(&mut self, icon: ToggleIcon);
}

/// Draws the dial for a progress value in `[-0.5, 1.5]`
pub trait RenderSink: Send {
    fn render(&mut self, progress: f64);
}

/// Receives user-facing alerts
pub trait Notifier: Send {
    fn notify(&mut self, notice: Notice);
}

/// Alerts raised towards the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    CorrectInputErrors,
    DurationMustExceedZero,
    Expired,
}

impl From<ValidationError> for Notice {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::MalformedField => Notice::CorrectInputErrors,
            ValidationError::ZeroDuration => Notice::DurationMustExceedZero,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::CorrectInputErrors => f.write_str("Please correct mistakes in duration."),
            Notice::DurationMustExceedZero => f.write_str("The duration must be more than zero."),
            Notice::Expired => f.write_str("Time is up!"),
        }
    }
}
