//! Millisecond totals split into the four displayed components

use serde::{Deserialize, Serialize};

use crate::state::FieldId;

const HOUR_MS: u64 = 3_600_000;
const MINUTE_MS: u64 = 60_000;
const SECOND_MS: u64 = 1_000;
const HUNDREDTH_MS: u64 = 10;

/// Remaining time as shown on the readout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeParts {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub hundredths: u64,
}

impl TimeParts {
    pub fn new(hours: u64, minutes: u64, seconds: u64, hundredths: u64) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            hundredths,
        }
    }

    /// Splits by successive subtraction. Hours are never wrapped, so a total
    /// above 99 hours yields a three digit hour count.
    pub fn from_millis(millis: u64) -> Self {
        let hours = millis / HOUR_MS;
        let rest = millis % HOUR_MS;
        let minutes = rest / MINUTE_MS;
        let rest = rest % MINUTE_MS;
        let seconds = rest / SECOND_MS;
        let hundredths = (rest % SECOND_MS) / HUNDREDTH_MS;

        Self {
            hours,
            minutes,
            seconds,
            hundredths,
        }
    }

    pub fn to_millis(&self) -> u64 {
        self.hours * HOUR_MS
            + self.minutes * MINUTE_MS
            + self.seconds * SECOND_MS
            + self.hundredths * HUNDREDTH_MS
    }

    pub fn get(&self, field: FieldId) -> u64 {
        match field {
            FieldId::Hours => self.hours,
            FieldId::Minutes => self.minutes,
            FieldId::Seconds => self.seconds,
            FieldId::Hundredths => self.hundredths,
        }
    }

    /// Zero-padded text for one component
    pub fn text(&self, field: FieldId) -> String {
        format!("{:02}", self.get(field))
    }
}
