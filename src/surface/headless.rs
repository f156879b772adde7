//! In-memory handles for running without a display

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::state::{FieldId, ToggleIcon};

use super::{FieldHandle, Notice, Notifier, RenderSink, ToggleControl};

/// A field that only remembers its text and flags
#[derive(Debug, Clone)]
pub struct MemoryField {
    text: String,
    invalid: bool,
    editable: bool,
}

impl MemoryField {
    pub fn new() -> Self {
        Self {
            text: "00".to_string(),
            invalid: false,
            editable: true,
        }
    }
}

impl Default for MemoryField {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldHandle for MemoryField {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn is_invalid(&self) -> bool {
        self.invalid
    }

    fn set_invalid(&mut self, invalid: bool) {
        self.invalid = invalid;
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }
}

/// Memory fields for every component, hundredths included on request
pub fn memory_fields(with_hundredths: bool) -> Vec<(FieldId, Box<dyn FieldHandle>)> {
    let ids: &[FieldId] = if with_hundredths {
        &FieldId::ALL
    } else {
        &FieldId::REQUIRED
    };
    ids.iter()
        .map(|&id| (id, Box::new(MemoryField::new()) as Box<dyn FieldHandle>))
        .collect()
}

/// Shared log of everything pushed into a sink.
///
/// Clones share the same log, so a test can keep one clone and hand the
/// other to the engine.
#[derive(Debug)]
pub struct Recorder<T> {
    entries: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone> Recorder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: T) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(e) => warn!("Failed to lock recorder: {}", e),
        }
    }

    pub fn entries(&self) -> Vec<T> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<T> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.last().cloned())
    }
}

impl RenderSink for Recorder<f64> {
    fn render(&mut self, progress: f64) {
        self.push(progress);
    }
}

impl Notifier for Recorder<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

impl ToggleControl for Recorder<ToggleIcon> {
    fn set_icon(&mut self, icon: ToggleIcon) {
        self.push(icon);
    }
}

/// Accepts renders and icon changes and drops them
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl RenderSink for Discard {
    fn render(&mut self, _progress: f64) {}
}

impl ToggleControl for Discard {
    fn set_icon(&mut self, _icon: ToggleIcon) {}
}

/// Reports notices through the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::Expired => info!("{}", notice),
            _ => warn!("{}", notice),
        }
    }
}
