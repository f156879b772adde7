//! Error types surfaced by the editor, the engine and the control channel

use thiserror::Error;

use crate::state::FieldId;

/// Reasons a duration cannot be turned into a countdown.
///
/// Both are user-correctable: nothing is clamped or auto-filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please correct the highlighted duration fields before starting")]
    MalformedField,

    #[error("the duration must be greater than zero")]
    ZeroDuration,
}

/// Errors returned to whoever sends commands to the countdown task
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("this timer has no {0} field")]
    UnknownField(FieldId),

    #[error("countdown task is not running")]
    DriverUnavailable,
}
