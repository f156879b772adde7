//! Timer state and the play/pause icon that mirrors it

use serde::{Deserialize, Serialize};

/// Lifecycle of one countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Nothing configured, fields are editable
    #[default]
    Idle,
    Running,
    Paused,
    /// The last run reached zero; stays here until stopped, edited or restarted
    Expired,
}

impl TimerState {
    /// Running and Paused carry a live run
    pub fn is_live(self) -> bool {
        matches!(self, TimerState::Running | TimerState::Paused)
    }

    /// Whether the duration fields accept input in this state
    pub fn accepts_edits(self) -> bool {
        matches!(self, TimerState::Idle | TimerState::Expired)
    }
}

/// Icon shown by the start/pause toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleIcon {
    #[default]
    Play,
    Pause,
}

impl ToggleIcon {
    /// Icon matching a timer state: pause while running, play otherwise
    pub fn for_state(state: TimerState) -> Self {
        if state == TimerState::Running {
            ToggleIcon::Pause
        } else {
            ToggleIcon::Play
        }
    }
}
