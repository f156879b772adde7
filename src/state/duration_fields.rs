//! Identifiers and views of the duration input fields

use std::fmt;

use serde::{Deserialize, Serialize};

/// One component of the entered duration, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldId {
    Hours,
    Minutes,
    Seconds,
    Hundredths,
}

impl FieldId {
    /// Hours, minutes and seconds; hundredths are optional
    pub const REQUIRED: [FieldId; 3] = [FieldId::Hours, FieldId::Minutes, FieldId::Seconds];
    pub const ALL: [FieldId; 4] = [
        FieldId::Hours,
        FieldId::Minutes,
        FieldId::Seconds,
        FieldId::Hundredths,
    ];

    /// Milliseconds represented by one unit of this field
    pub fn unit_ms(self) -> u64 {
        match self {
            FieldId::Hours => 3_600_000,
            FieldId::Minutes => 60_000,
            FieldId::Seconds => 1_000,
            FieldId::Hundredths => 10,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldId::Hours => "hours",
            FieldId::Minutes => "minutes",
            FieldId::Seconds => "seconds",
            FieldId::Hundredths => "hundredths",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Observable state of a single field, as reported in snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldView {
    pub id: FieldId,
    pub text: String,
    pub invalid: bool,
    pub editable: bool,
}
