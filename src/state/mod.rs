//! State management module
//! 
//! This module contains the timer's state types and the shared application state.

pub mod app_state;
pub mod duration_fields;
pub mod snapshot;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use duration_fields::{FieldId, FieldView};
pub use snapshot::TimerSnapshot;
pub use timer_state::{TimerState, ToggleIcon};
