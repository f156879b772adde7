//! Countdown state machine
//!
//! Remaining time is never accumulated tick by tick. It is recomputed from
//! the anchor pair captured when the timer last entered Running: the
//! milliseconds left at that instant and the instant itself. Every method
//! takes `now` from the caller so the engine has no clock of its own.
//!
//! Two things can end a run: a tick that samples zero, and the backstop
//! deadline armed for exactly the time left. Both go through
//! [`TimerEngine::handle_expiry`], which only acts while Running, and a
//! backstop is only honoured if its generation is still the armed one.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    error::{ControlError, ValidationError},
    state::{FieldId, TimerSnapshot, TimerState, ToggleIcon},
    surface::{Notice, Notifier, RenderSink, ToggleControl},
};

use super::{
    breakdown::TimeParts,
    dial::{self, DialArc},
    editor::{DurationEditor, EditOutcome},
};

/// Deadline at which the current run must be over at the latest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backstop {
    pub generation: u64,
    pub deadline: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Run {
    initial_ms: u64,
    total_at_last_resume: u64,
    resumed_at: Instant,
}

impl Run {
    fn remaining_ms(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.resumed_at).as_millis();
        let elapsed = u64::try_from(elapsed).unwrap_or(u64::MAX);
        self.total_at_last_resume.saturating_sub(elapsed)
    }
}

pub struct TimerEngine {
    state: TimerState,
    editor: DurationEditor,
    toggle: Box<dyn ToggleControl>,
    renderer: Box<dyn RenderSink>,
    notifier: Box<dyn Notifier>,
    run: Option<Run>,
    backstop: Option<Backstop>,
    generation: u64,
    expirations: u64,
    last_progress: f64,
}

impl TimerEngine {
    /// Builds an idle engine and draws the full dial
    pub fn new(
        editor: DurationEditor,
        toggle: Box<dyn ToggleControl>,
        renderer: Box<dyn RenderSink>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let mut engine = Self {
            state: TimerState::Idle,
            editor,
            toggle,
            renderer,
            notifier,
            run: None,
            backstop: None,
            generation: 0,
            expirations: 0,
            last_progress: dial::PROGRESS_FULL,
        };
        engine.editor.unlock();
        engine.toggle.set_icon(ToggleIcon::Play);
        engine.renderer.render(dial::PROGRESS_FULL);
        engine
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn editor(&self) -> &DurationEditor {
        &self.editor
    }

    /// Number of runs that reached zero
    pub fn expirations(&self) -> u64 {
        self.expirations
    }

    pub fn backstop(&self) -> Option<Backstop> {
        self.backstop
    }

    /// Frames are only needed while counting down
    pub fn wants_frames(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn initial_ms(&self) -> Option<u64> {
        self.run.map(|run| run.initial_ms)
    }

    pub fn remaining_ms(&self, now: Instant) -> u64 {
        match (self.state, self.run) {
            (TimerState::Running, Some(run)) => run.remaining_ms(now),
            (TimerState::Paused, Some(run)) => run.total_at_last_resume,
            _ => 0,
        }
    }

    /// Progress of the live run, or whatever was drawn last
    pub fn progress(&self, now: Instant) -> f64 {
        match self.run {
            Some(run) if self.state.is_live() => dial::progress(run.initial_ms, self.remaining_ms(now)),
            _ => self.last_progress,
        }
    }

    /// Routes a field edit through the state guard.
    ///
    /// Editing an expired timer acknowledges the expiry.
    pub fn edit_field(&mut self, field: FieldId, raw: &str) -> Result<EditOutcome, ControlError> {
        if !self.editor.has_field(field) {
            return Err(ControlError::UnknownField(field));
        }
        if !self.state.accepts_edits() {
            debug!("Ignoring edit of {} while {:?}", field, self.state);
            return Ok(EditOutcome::Rejected);
        }
        if self.state == TimerState::Expired {
            self.state = TimerState::Idle;
        }
        Ok(self.editor.on_field_edited(field, raw))
    }

    /// Idle/Expired -> Running
    pub fn start(&mut self, now: Instant) -> Result<(), ValidationError> {
        if self.state.is_live() {
            debug!("Start ignored, timer already {:?}", self.state);
            return Ok(());
        }

        let total = match self.editor.to_milliseconds() {
            Ok(total) => total,
            Err(e) => {
                warn!("Refusing to start: {}", e);
                self.notifier.notify(Notice::from(e));
                return Err(e);
            }
        };

        self.run = Some(Run {
            initial_ms: total,
            total_at_last_resume: total,
            resumed_at: now,
        });
        self.editor.lock();
        self.state = TimerState::Running;
        self.toggle.set_icon(ToggleIcon::Pause);
        self.arm_backstop(now, total);
        info!("Countdown started for {} ms", total);

        self.tick(now);
        Ok(())
    }

    /// Running -> Paused
    pub fn pause(&mut self, now: Instant) {
        if self.state != TimerState::Running {
            debug!("Pause ignored while {:?}", self.state);
            return;
        }
        let Some(run) = self.run.as_mut() else {
            return;
        };

        let remaining = run.remaining_ms(now);
        if remaining == 0 {
            self.handle_expiry();
            return;
        }

        run.total_at_last_resume = remaining;
        self.backstop = None;
        self.state = TimerState::Paused;
        self.toggle.set_icon(ToggleIcon::Play);
        info!("Countdown paused with {} ms left", remaining);
    }

    /// Paused -> Running
    pub fn resume(&mut self, now: Instant) {
        if self.state != TimerState::Paused {
            debug!("Resume ignored while {:?}", self.state);
            return;
        }
        let Some(run) = self.run.as_mut() else {
            return;
        };

        run.resumed_at = now;
        let remaining = run.total_at_last_resume;
        self.state = TimerState::Running;
        self.toggle.set_icon(ToggleIcon::Pause);
        self.arm_backstop(now, remaining);
        info!("Countdown resumed with {} ms left", remaining);

        self.tick(now);
    }

    /// The start/pause button
    pub fn toggle(&mut self, now: Instant) -> Result<(), ValidationError> {
        match self.state {
            TimerState::Idle | TimerState::Expired => self.start(now),
            TimerState::Running => {
                self.pause(now);
                Ok(())
            }
            TimerState::Paused => {
                self.resume(now);
                Ok(())
            }
        }
    }

    /// Any state -> Idle. Safe to call repeatedly.
    pub fn stop(&mut self) {
        let was_live = self.state.is_live();
        self.halt();
        self.state = TimerState::Idle;

        if was_live {
            self.draw(dial::PROGRESS_EMPTY);
            info!("Countdown stopped");
        } else {
            debug!("Stop on an idle timer");
        }
    }

    /// One animation frame: sample, show, draw, and expire on zero
    pub fn tick(&mut self, now: Instant) {
        if self.state != TimerState::Running {
            return;
        }
        let Some(run) = self.run else {
            return;
        };

        let remaining = run.remaining_ms(now);
        let parts = TimeParts::from_millis(remaining);
        let progress = dial::progress(run.initial_ms, remaining);

        self.editor.display(&parts);
        self.draw(progress);

        if remaining == 0 {
            self.handle_expiry();
        }
    }

    /// Called when an armed backstop deadline passes
    pub fn fire_backstop(&mut self, generation: u64, now: Instant) {
        match self.backstop {
            Some(armed) if armed.generation == generation => {
                debug!(
                    "Backstop {} fired with {} ms left by the anchors",
                    generation,
                    self.remaining_ms(now)
                );
                self.handle_expiry();
            }
            _ => debug!("Stale backstop {} ignored", generation),
        }
    }

    /// Running -> Expired; a no-op in every other state
    pub fn handle_expiry(&mut self) {
        if self.state != TimerState::Running {
            return;
        }

        self.halt();
        self.state = TimerState::Expired;
        self.draw(dial::PROGRESS_EMPTY);
        self.expirations += 1;
        self.notifier.notify(Notice::Expired);
        info!("Countdown expired");
    }

    pub fn snapshot(&self, now: Instant) -> TimerSnapshot {
        let progress = self.progress(now);
        TimerSnapshot {
            state: self.state,
            icon: ToggleIcon::for_state(self.state),
            fields: self.editor.views(),
            remaining_ms: self.remaining_ms(now),
            initial_ms: self.initial_ms(),
            progress,
            dial: DialArc::from_progress(progress),
            expirations: self.expirations,
        }
    }

    fn arm_backstop(&mut self, now: Instant, remaining_ms: u64) {
        self.generation += 1;
        self.backstop = Some(Backstop {
            generation: self.generation,
            deadline: now + Duration::from_millis(remaining_ms),
        });
    }

    /// Drops the run and returns the editor to an editable, zeroed state
    fn halt(&mut self) {
        self.backstop = None;
        self.run = None;
        self.editor.unlock();
        self.editor.reset();
        self.toggle.set_icon(ToggleIcon::Play);
    }

    fn draw(&mut self, progress: f64) {
        self.last_progress = progress;
        self.renderer.render(progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        surface::headless::Recorder,
        timer::editor::ValidationMode,
    };

    struct Harness {
        engine: TimerEngine,
        frames: Recorder<f64>,
        notices: Recorder<Notice>,
        icons: Recorder<ToggleIcon>,
        t0: Instant,
    }

    impl Harness {
        fn new(mode: ValidationMode) -> Self {
            let frames = Recorder::new();
            let notices = Recorder::new();
            let icons = Recorder::new();
            let engine = TimerEngine::new(
                DurationEditor::headless(mode, true),
                Box::new(icons.clone()),
                Box::new(frames.clone()),
                Box::new(notices.clone()),
            );
            Self {
                engine,
                frames,
                notices,
                icons,
                t0: Instant::now(),
            }
        }

        fn at(&self, ms: u64) -> Instant {
            self.t0 + Duration::from_millis(ms)
        }

        fn set(&mut self, field: FieldId, text: &str) {
            self.engine.edit_field(field, text).unwrap();
        }

        fn text(&self, field: FieldId) -> String {
            self.engine.editor().field_text(field).unwrap()
        }
    }

    #[test]
    fn starts_with_a_full_dial() {
        let h = Harness::new(ValidationMode::Lenient);
        assert_eq!(h.engine.state(), TimerState::Idle);
        assert_eq!(h.frames.entries(), vec![dial::PROGRESS_FULL]);
        assert_eq!(h.icons.last(), Some(ToggleIcon::Play));
    }

    #[test]
    fn zero_duration_leaves_timer_idle_and_editable() {
        let mut h = Harness::new(ValidationMode::Lenient);
        let t0 = h.t0;

        assert_eq!(h.engine.start(t0), Err(ValidationError::ZeroDuration));
        assert_eq!(h.engine.state(), TimerState::Idle);
        assert!(!h.engine.editor().is_locked());
        assert!(h.engine.backstop().is_none());
        assert_eq!(h.notices.entries(), vec![Notice::DurationMustExceedZero]);
    }

    #[test]
    fn malformed_field_blocks_start() {
        let mut h = Harness::new(ValidationMode::Lenient);
        h.set(FieldId::Seconds, "05");
        h.set(FieldId::Minutes, "1a");
        let t0 = h.t0;

        assert_eq!(h.engine.start(t0), Err(ValidationError::MalformedField));
        assert_eq!(h.engine.state(), TimerState::Idle);
        assert!(!h.engine.editor().is_locked());
        assert_eq!(h.notices.entries(), vec![Notice::CorrectInputErrors]);
    }

    #[test]
    fn start_locks_editor_and_shows_first_frame() {
        let mut h = Harness::new(ValidationMode::Lenient);
        h.set(FieldId::Seconds, "10");
        let t0 = h.t0;

        h.engine.start(t0).unwrap();
        assert_eq!(h.engine.state(), TimerState::Running);
        assert!(h.engine.editor().is_locked());
        assert_eq!(h.engine.initial_ms(), Some(10_000));
        assert_eq!(h.icons.last(), Some(ToggleIcon::Pause));
        assert_eq!(h.frames.last(), Some(dial::PROGRESS_FULL));
        assert_eq!(
            h.engine.backstop().map(|b| b.deadline),
            Some(h.at(10_000))
        );

        assert_eq!(
            h.engine.edit_field(FieldId::Seconds, "20").unwrap(),
            EditOutcome::Rejected
        );
        assert_eq!(h.text(FieldId::Seconds), "10");
    }

    #[test]
    fn ticks_show_remaining_time() {
        let mut h = Harness::new(ValidationMode::Lenient);
        h.set(FieldId::Minutes, "01");
        h.set(FieldId::Seconds, "30");
        h.engine.start(h.at(0)).unwrap();

        h.engine.tick(h.at(45_250));
        assert_eq!(h.text(FieldId::Minutes), "00");
        assert_eq!(h.text(FieldId::Seconds), "44");
        assert_eq!(h.text(FieldId::Hundredths), "75");
        assert_eq!(h.frames.last(), Some(dial::progress(90_000, 44_750)));
    }

    #[test]
    fn pause_resume_conserves_remaining_time() {
        let mut h = Harness::new(ValidationMode::Lenient);
        h.set(FieldId::Seconds, "10");
        h.engine.start(h.at(0)).unwrap();

        h.engine.pause(h.at(3_000));
        assert_eq!(h.engine.state(), TimerState::Paused);
        assert!(h.engine.backstop().is_none());
        assert!(!h.engine.wants_frames());
        assert_eq!(h.engine.remaining_ms(h.at(60_000)), 7_000);

        h.engine.resume(h.at(63_000));
        assert_eq!(h.engine.state(), TimerState::Running);
        assert_eq!(h.engine.remaining_ms(h.at(63_000)), 7_000);
        assert_eq!(h.engine.remaining_ms(h.at(64_000)), 6_000);
        assert_eq!(
            h.engine.backstop().map(|b| b.deadline),
            Some(h.at(70_000))
        );
        assert_eq!(h.engine.initial_ms(), Some(10_000));
    }

    #[test]
    fn illegal_transitions_are_ignored() {
        let mut h = Harness::new(ValidationMode::Lenient);
        let t0 = h.t0;
        h.engine.pause(t0);
        h.engine.resume(t0);
        assert_eq!(h.engine.state(), TimerState::Idle);

        h.set(FieldId::Seconds, "05");
        h.engine.start(t0).unwrap();
        h.engine.resume(h.at(100));
        assert_eq!(h.engine.state(), TimerState::Running);

        let armed = h.engine.backstop();
        h.engine.start(h.at(200)).unwrap();
        assert_eq!(h.engine.backstop(), armed);
        assert_eq!(h.engine.initial_ms(), Some(5_000));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut h = Harness::new(ValidationMode::Lenient);
        h.set(FieldId::Hours, "02");
        h.engine.stop();
        h.engine.stop();
        assert_eq!(h.engine.state(), TimerState::Idle);
        assert!(h.engine.editor().views().iter().all(|v| v.text == "00"));

        h.set(FieldId::Seconds, "03");
        h.engine.start(h.at(0)).unwrap();
        h.engine.stop();
        h.engine.stop();
        assert_eq!(h.engine.state(), TimerState::Idle);
        assert!(h.engine.backstop().is_none());
        assert!(!h.engine.editor().is_locked());
        assert_eq!(h.engine.remaining_ms(h.at(1_000)), 0);
        assert_eq!(h.frames.last(), Some(dial::PROGRESS_EMPTY));
        assert!(h.notices.entries().is_empty());
    }

    #[test]
    fn tick_reaching_zero_expires_once() {
        let mut h = Harness::new(ValidationMode::Lenient);
        h.set(FieldId::Seconds, "02");
        h.engine.start(h.at(0)).unwrap();
        let generation = h.engine.backstop().unwrap().generation;

        h.engine.tick(h.at(2_016));
        assert_eq!(h.engine.state(), TimerState::Expired);
        assert_eq!(h.text(FieldId::Seconds), "00");
        assert!(!h.engine.editor().is_locked());

        h.engine.fire_backstop(generation, h.at(2_016));
        h.engine.tick(h.at(2_032));
        assert_eq!(h.engine.expirations(), 1);
        assert_eq!(h.notices.entries(), vec![Notice::Expired]);
    }

    #[test]
    fn backstop_expires_when_frames_stall() {
        let mut h = Harness::new(ValidationMode::Lenient);
        h.set(FieldId::Seconds, "01");
        h.engine.start(h.at(0)).unwrap();
        let backstop = h.engine.backstop().unwrap();

        h.engine.fire_backstop(backstop.generation, backstop.deadline);
        assert_eq!(h.engine.state(), TimerState::Expired);
        assert_eq!(h.notices.entries(), vec![Notice::Expired]);

        h.engine.tick(h.at(1_100));
        assert_eq!(h.engine.expirations(), 1);
    }

    #[test]
    fn backstop_from_an_earlier_run_is_ignored() {
        let mut h = Harness::new(ValidationMode::Lenient);
        h.set(FieldId::Seconds, "01");
        h.engine.start(h.at(0)).unwrap();
        let stale = h.engine.backstop().unwrap().generation;
        h.engine.stop();

        h.set(FieldId::Seconds, "05");
        h.engine.start(h.at(500)).unwrap();
        h.engine.fire_backstop(stale, h.at(1_000));
        assert_eq!(h.engine.state(), TimerState::Running);
        assert_eq!(h.engine.expirations(), 0);
    }

    #[test]
    fn expired_timer_restarts_or_acknowledges() {
        let mut h = Harness::new(ValidationMode::Lenient);
        h.set(FieldId::Hundredths, "50");
        h.engine.start(h.at(0)).unwrap();
        h.engine.tick(h.at(600));
        assert_eq!(h.engine.state(), TimerState::Expired);

        h.engine.stop();
        assert_eq!(h.engine.state(), TimerState::Idle);

        h.set(FieldId::Hundredths, "50");
        h.engine.toggle(h.at(1_000)).unwrap();
        h.engine.tick(h.at(2_000));
        assert_eq!(h.engine.state(), TimerState::Expired);

        h.set(FieldId::Seconds, "03");
        assert_eq!(h.engine.state(), TimerState::Idle);
        assert_eq!(h.engine.expirations(), 2);
    }

    #[test]
    fn toggle_cycles_through_run_states() {
        let mut h = Harness::new(ValidationMode::Strict);
        h.set(FieldId::Seconds, "04");
        h.engine.toggle(h.at(0)).unwrap();
        assert_eq!(h.engine.state(), TimerState::Running);
        h.engine.toggle(h.at(1_000)).unwrap();
        assert_eq!(h.engine.state(), TimerState::Paused);
        h.engine.toggle(h.at(5_000)).unwrap();
        assert_eq!(h.engine.state(), TimerState::Running);
        assert_eq!(h.engine.remaining_ms(h.at(5_000)), 3_000);
    }

    #[test]
    fn unknown_field_is_an_error() {
        let mut engine = TimerEngine::new(
            DurationEditor::headless(ValidationMode::Lenient, false),
            Box::new(Recorder::<ToggleIcon>::new()),
            Box::new(Recorder::<f64>::new()),
            Box::new(Recorder::<Notice>::new()),
        );
        assert_eq!(
            engine.edit_field(FieldId::Hundredths, "10"),
            Err(ControlError::UnknownField(FieldId::Hundredths))
        );
    }

    #[test]
    fn snapshot_reflects_live_run() {
        let mut h = Harness::new(ValidationMode::Lenient);
        h.set(FieldId::Seconds, "04");
        h.engine.start(h.at(0)).unwrap();

        let snapshot = h.engine.snapshot(h.at(1_000));
        assert_eq!(snapshot.state, TimerState::Running);
        assert_eq!(snapshot.icon, ToggleIcon::Pause);
        assert_eq!(snapshot.remaining_ms, 3_000);
        assert_eq!(snapshot.initial_ms, Some(4_000));
        assert!((snapshot.progress - 0.0).abs() < 1e-9);
    }
}
