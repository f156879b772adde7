//! Serializable picture of the timer at one instant

use serde::{Deserialize, Serialize};

use crate::timer::dial::{self, DialArc};

use super::{FieldView, TimerState, ToggleIcon};

/// What the status endpoint and snapshot watchers see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub icon: ToggleIcon,
    pub fields: Vec<FieldView>,
    pub remaining_ms: u64,
    /// Duration configured at the last start, while a run is live
    pub initial_ms: Option<u64>,
    pub progress: f64,
    pub dial: DialArc,
    /// Runs that reached zero since launch
    pub expirations: u64,
}

impl TimerSnapshot {
    pub fn field_text(&self, id: super::FieldId) -> Option<&str> {
        self.fields
            .iter()
            .find(|view| view.id == id)
            .map(|view| view.text.as_str())
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self {
            state: TimerState::Idle,
            icon: ToggleIcon::Play,
            fields: Vec::new(),
            remaining_ms: 0,
            initial_ms: None,
            progress: dial::PROGRESS_FULL,
            dial: DialArc::from_progress(dial::PROGRESS_FULL),
            expirations: 0,
        }
    }
}
