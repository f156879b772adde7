//! Single-line terminal dial
//!
//! The fields, the toggle, the renderer and the notifier all share one
//! screen buffer. Each render redraws the line in place so the readout and
//! the gauge always come from the same tick. Edits, error markers and icon
//! changes redraw too; countdown samples written into locked fields wait for
//! the render that follows them.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use tracing::debug;

use crate::{
    state::{FieldId, ToggleIcon},
    timer::dial::{self, DialArc},
};

use super::{FieldHandle, Notice, Notifier, RenderSink, ToggleControl};

const GAUGE_WIDTH: usize = 30;

#[derive(Debug, Clone)]
struct FieldSlot {
    id: FieldId,
    text: String,
    invalid: bool,
    editable: bool,
}

#[derive(Debug)]
struct ScreenBuffer {
    fields: Vec<FieldSlot>,
    icon: ToggleIcon,
    progress: f64,
}

type Output = Arc<Mutex<Box<dyn Write + Send>>>;

/// Shared terminal screen handing out the individual handles
#[derive(Clone)]
pub struct Screen {
    inner: Arc<Mutex<ScreenBuffer>>,
    out: Output,
}

impl Screen {
    /// Screen drawing to stdout
    pub fn new(with_hundredths: bool) -> Self {
        Self::with_writer(with_hundredths, Box::new(io::stdout()))
    }

    pub fn with_writer(with_hundredths: bool, writer: Box<dyn Write + Send>) -> Self {
        let ids: &[FieldId] = if with_hundredths {
            &FieldId::ALL
        } else {
            &FieldId::REQUIRED
        };
        let fields = ids
            .iter()
            .map(|&id| FieldSlot {
                id,
                text: "00".to_string(),
                invalid: false,
                editable: true,
            })
            .collect();

        Self {
            inner: Arc::new(Mutex::new(ScreenBuffer {
                fields,
                icon: ToggleIcon::Play,
                progress: dial::PROGRESS_FULL,
            })),
            out: Arc::new(Mutex::new(writer)),
        }
    }

    /// One handle per field, in display order
    pub fn fields(&self) -> Vec<(FieldId, Box<dyn FieldHandle>)> {
        let ids: Vec<FieldId> = match self.inner.lock() {
            Ok(buffer) => buffer.fields.iter().map(|slot| slot.id).collect(),
            Err(_) => Vec::new(),
        };
        ids.into_iter()
            .enumerate()
            .map(|(index, id)| {
                let field = TerminalField {
                    screen: self.clone(),
                    index,
                };
                (id, Box::new(field) as Box<dyn FieldHandle>)
            })
            .collect()
    }

    pub fn toggle(&self) -> TerminalToggle {
        TerminalToggle { screen: self.clone() }
    }

    pub fn renderer(&self) -> TerminalRenderer {
        TerminalRenderer { screen: self.clone() }
    }

    pub fn notifier(&self) -> TerminalNotifier {
        TerminalNotifier { screen: self.clone() }
    }

    fn with_slot<R>(&self, index: usize, f: impl FnOnce(&mut FieldSlot) -> R) -> Option<R> {
        let mut buffer = self.inner.lock().ok()?;
        buffer.fields.get_mut(index).map(f)
    }

    fn redraw(&self, progress: Option<f64>, notice: Option<Notice>) {
        let line = match self.inner.lock() {
            Ok(mut buffer) => {
                if let Some(progress) = progress {
                    buffer.progress = progress;
                }
                compose_line(&buffer.fields, buffer.icon, buffer.progress)
            }
            Err(e) => {
                debug!("Screen buffer unavailable: {}", e);
                return;
            }
        };

        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(e) => {
                debug!("Dial output unavailable: {}", e);
                return;
            }
        };
        let result = match notice {
            Some(notice) => write!(out, "\r\x1b[2K{}\n{}", notice, line),
            None => write!(out, "{}", line),
        }
        .and_then(|()| out.flush());

        if let Err(e) = result {
            debug!("Failed to draw dial: {}", e);
        }
    }
}

/// Builds the dial line: toggle icon, readout, then a gauge of the time left
fn compose_line(fields: &[FieldSlot], icon: ToggleIcon, progress: f64) -> String {
    let readout = fields
        .iter()
        .map(|slot| {
            if slot.invalid {
                format!("\x1b[31m{}\x1b[0m", slot.text)
            } else {
                slot.text.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(":");

    let filled = (dial::remaining_fraction(progress) * GAUGE_WIDTH as f64).round() as usize;
    let filled = filled.min(GAUGE_WIDTH);
    let (red, green, blue) = DialArc::from_progress(progress).color.to_rgb8();
    let icon = match icon {
        ToggleIcon::Play => '▶',
        ToggleIcon::Pause => '⏸',
    };

    format!(
        "\r\x1b[2K{} {} [\x1b[38;2;{};{};{}m{}\x1b[0m{}]",
        icon,
        readout,
        red,
        green,
        blue,
        "█".repeat(filled),
        "░".repeat(GAUGE_WIDTH - filled),
    )
}

/// Field handle backed by one slot of the screen
pub struct TerminalField {
    screen: Screen,
    index: usize,
}

impl FieldHandle for TerminalField {
    fn text(&self) -> String {
        self.screen
            .with_slot(self.index, |slot| slot.text.clone())
            .unwrap_or_default()
    }

    fn set_text(&mut self, text: &str) {
        let editable = self.screen.with_slot(self.index, |slot| {
            slot.text = text.to_string();
            slot.editable
        });
        if editable == Some(true) {
            self.screen.redraw(None, None);
        }
    }

    fn is_invalid(&self) -> bool {
        self.screen
            .with_slot(self.index, |slot| slot.invalid)
            .unwrap_or(false)
    }

    fn set_invalid(&mut self, invalid: bool) {
        let changed = self.screen.with_slot(self.index, |slot| {
            let changed = slot.invalid != invalid;
            slot.invalid = invalid;
            changed
        });
        if changed == Some(true) {
            self.screen.redraw(None, None);
        }
    }

    fn is_editable(&self) -> bool {
        self.screen
            .with_slot(self.index, |slot| slot.editable)
            .unwrap_or(false)
    }

    fn set_editable(&mut self, editable: bool) {
        self.screen.with_slot(self.index, |slot| slot.editable = editable);
    }
}

pub struct TerminalToggle {
    screen: Screen,
}

impl ToggleControl for TerminalToggle {
    fn set_icon(&mut self, icon: ToggleIcon) {
        let changed = match self.screen.inner.lock() {
            Ok(mut buffer) => {
                let changed = buffer.icon != icon;
                buffer.icon = icon;
                changed
            }
            Err(_) => false,
        };
        if changed {
            self.screen.redraw(None, None);
        }
    }
}

pub struct TerminalRenderer {
    screen: Screen,
}

impl RenderSink for TerminalRenderer {
    fn render(&mut self, progress: f64) {
        self.screen.redraw(Some(progress), None);
    }
}

/// Prints notices above the dial line
pub struct TerminalNotifier {
    screen: Screen,
}

impl Notifier for TerminalNotifier {
    fn notify(&mut self, notice: Notice) {
        self.screen.redraw(None, Some(notice));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(texts: &[&str]) -> Vec<FieldSlot> {
        texts
            .iter()
            .zip(FieldId::ALL)
            .map(|(text, id)| FieldSlot {
                id,
                text: text.to_string(),
                invalid: false,
                editable: true,
            })
            .collect()
    }

    #[test]
    fn full_dial_is_all_green() {
        let line = compose_line(&slots(&["00", "01", "30", "00"]), ToggleIcon::Pause, -0.5);
        assert!(line.contains("00:01:30:00"));
        assert!(line.contains("38;2;0;255;0m"));
        assert_eq!(line.matches('█').count(), GAUGE_WIDTH);
        assert!(!line.contains('░'));
    }

    #[test]
    fn empty_dial_is_red_and_hollow() {
        let line = compose_line(&slots(&["00", "00", "00"]), ToggleIcon::Play, 1.5);
        assert!(line.contains("38;2;255;0;0m"));
        assert_eq!(line.matches('░').count(), GAUGE_WIDTH);
    }

    #[test]
    fn invalid_fields_are_highlighted() {
        let mut fields = slots(&["00", "1a", "00"]);
        fields[1].invalid = true;
        let line = compose_line(&fields, ToggleIcon::Play, -0.5);
        assert!(line.contains("\x1b[31m1a\x1b[0m"));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn take(&self) -> String {
            let bytes = std::mem::take(&mut *self.0.lock().unwrap());
            String::from_utf8(bytes).unwrap()
        }
    }

    fn captured_screen() -> (Screen, Captured) {
        let captured = Captured::default();
        let screen = Screen::with_writer(true, Box::new(captured.clone()));
        (screen, captured)
    }

    #[test]
    fn edits_and_error_markers_are_drawn_immediately() {
        let (screen, captured) = captured_screen();
        let mut fields = screen.fields();

        fields[1].1.set_text("05");
        assert!(captured.take().contains("00:05:00:00"));

        fields[2].1.set_invalid(true);
        assert!(captured.take().contains("\x1b[31m00\x1b[0m"));

        fields[2].1.set_invalid(true);
        assert!(captured.take().is_empty());
    }

    #[test]
    fn countdown_samples_wait_for_the_render() {
        let (screen, captured) = captured_screen();
        let mut fields = screen.fields();
        for (_, field) in fields.iter_mut() {
            field.set_editable(false);
        }

        fields[2].1.set_text("41");
        assert!(captured.take().is_empty());

        screen.renderer().render(0.5);
        assert!(captured.take().contains("00:00:41:00"));
    }

    #[test]
    fn icon_changes_are_drawn() {
        let (screen, captured) = captured_screen();
        let mut toggle = screen.toggle();

        toggle.set_icon(ToggleIcon::Pause);
        assert!(captured.take().contains('⏸'));

        toggle.set_icon(ToggleIcon::Play);
        assert!(captured.take().contains('▶'));
    }

    #[test]
    fn notices_print_above_the_line() {
        let (screen, captured) = captured_screen();
        screen.notifier().notify(Notice::Expired);
        let output = captured.take();
        assert!(output.contains("Time is up!\n"));
        assert!(output.ends_with(']'));
    }

    #[test]
    fn handles_write_through_to_the_shared_buffer() {
        let screen = Screen::with_writer(false, Box::new(Captured::default()));
        let mut fields = screen.fields();
        assert_eq!(fields.len(), 3);

        let (id, field) = &mut fields[2];
        assert_eq!(*id, FieldId::Seconds);
        field.set_text("42");
        field.set_invalid(true);

        let reread = screen.fields();
        assert_eq!(reread[2].1.text(), "42");
        assert!(reread[2].1.is_invalid());
    }
}
