//! Editable duration fields and their validation

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::ValidationError,
    state::{FieldId, FieldView},
    surface::{headless::memory_fields, FieldHandle},
};

use super::breakdown::TimeParts;

/// How much digit shape a field must have to be accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// One or two ASCII digits
    #[default]
    Lenient,
    /// Exactly two ASCII digits
    Strict,
}

impl ValidationMode {
    pub fn accepts(self, raw: &str) -> bool {
        let digits_only = !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit());
        match self {
            ValidationMode::Lenient => digits_only && raw.len() <= 2,
            ValidationMode::Strict => digits_only && raw.len() == 2,
        }
    }
}

/// What happened to a single field edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Accepted,
    /// Text kept as it was, field flagged
    Invalid,
    /// Locked editor, or no such field
    Rejected,
}

/// Holds the hours/minutes/seconds(/hundredths) fields
pub struct DurationEditor {
    mode: ValidationMode,
    fields: Vec<(FieldId, Box<dyn FieldHandle>)>,
    locked: bool,
}

impl DurationEditor {
    pub fn new(mode: ValidationMode, fields: Vec<(FieldId, Box<dyn FieldHandle>)>) -> Self {
        Self {
            mode,
            fields,
            locked: false,
        }
    }

    /// Editor over in-memory fields
    pub fn headless(mode: ValidationMode, with_hundredths: bool) -> Self {
        Self::new(mode, memory_fields(with_hundredths))
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn has_field(&self, id: FieldId) -> bool {
        self.fields.iter().any(|(field_id, _)| *field_id == id)
    }

    pub fn field_text(&self, id: FieldId) -> Option<String> {
        self.field(id).map(|field| field.text())
    }

    pub fn is_invalid(&self, id: FieldId) -> bool {
        self.field(id).is_some_and(|field| field.is_invalid())
    }

    fn field(&self, id: FieldId) -> Option<&dyn FieldHandle> {
        self.fields
            .iter()
            .find(|(field_id, _)| *field_id == id)
            .map(|(_, field)| &**field)
    }

    fn field_mut(&mut self, id: FieldId) -> Option<&mut Box<dyn FieldHandle>> {
        self.fields
            .iter_mut()
            .find(|(field_id, _)| *field_id == id)
            .map(|(_, field)| field)
    }

    /// Handles user input on one field.
    ///
    /// Valid text is stored and the field unflagged; anything else only
    /// flags the field. Unknown fields are ignored.
    pub fn on_field_edited(&mut self, id: FieldId, raw: &str) -> EditOutcome {
        if self.locked {
            debug!("Ignoring edit of {} while locked", id);
            return EditOutcome::Rejected;
        }

        let accepted = self.mode.accepts(raw);
        let Some(field) = self.field_mut(id) else {
            return EditOutcome::Rejected;
        };

        if accepted {
            field.set_text(raw);
            field.set_invalid(false);
            EditOutcome::Accepted
        } else {
            debug!("Flagging {} as invalid: {:?}", id, raw);
            field.set_invalid(true);
            EditOutcome::Invalid
        }
    }

    /// Total entered duration in milliseconds
    pub fn to_milliseconds(&self) -> Result<u64, ValidationError> {
        if self.fields.iter().any(|(_, field)| field.is_invalid()) {
            return Err(ValidationError::MalformedField);
        }

        let total: u64 = self
            .fields
            .iter()
            .map(|(id, field)| parse_component(&field.text()) * id.unit_ms())
            .sum();

        if total == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        Ok(total)
    }

    /// Writes a countdown sample into the fields
    pub fn display(&mut self, parts: &TimeParts) {
        for (id, field) in self.fields.iter_mut() {
            field.set_text(&parts.text(*id));
        }
    }

    /// Puts every field back to "00" with no error marker
    pub fn reset(&mut self) {
        for (_, field) in self.fields.iter_mut() {
            field.set_text("00");
            field.set_invalid(false);
        }
    }

    pub fn lock(&mut self) {
        self.set_locked(true);
    }

    pub fn unlock(&mut self) {
        self.set_locked(false);
    }

    fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        for (_, field) in self.fields.iter_mut() {
            field.set_editable(!locked);
        }
    }

    pub fn views(&self) -> Vec<FieldView> {
        self.fields
            .iter()
            .map(|(id, field)| FieldView {
                id: *id,
                text: field.text(),
                invalid: field.is_invalid(),
                editable: field.is_editable(),
            })
            .collect()
    }
}

/// Unset or non-numeric text counts as zero
fn parse_component(text: &str) -> u64 {
    text.trim().parse().unwrap_or(0)
}
