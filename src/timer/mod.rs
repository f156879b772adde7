//! Countdown core: duration entry, the state machine and the dial mapping

pub mod breakdown;
pub mod dial;
pub mod editor;
pub mod engine;

pub use breakdown::TimeParts;
pub use dial::DialArc;
pub use editor::{DurationEditor, EditOutcome, ValidationMode};
pub use engine::{Backstop, TimerEngine};
