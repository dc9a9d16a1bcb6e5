//! Press-and-hold repeater.
//!
//! Turns a normalized press/release stream into `Start`, `Repeat(n)` and
//! `End` signals. After the initial delay the repeater emits repeats at an
//! interval that shrinks by `acceleration_step` every
//! `acceleration_every_n_repeats` repeats, down to the configured floor.
//!
//! ## Resources
//!
//! | Phase | delay timer | repeat timer | surface listener |
//! |-------|-------------|--------------|------------------|
//! | Idle | — | — | — |
//! | Waiting | live | — | attached |
//! | Repeating | — | live | attached |
//!
//! A repeater built with [`PressRepeater::without_repeat`] never schedules
//! the delay timer and stays in `Waiting` until released.
//!
//! Every exit from a press (release, surface release, teardown, drop, a
//! timer found firing after release) goes through `release_resources`.

use crate::config::RepeatConfig;
use crate::input::PressInput;
use crate::release::{ListenerId, ReleaseListener, ReleaseSurface};
use crate::scheduler::{Scheduler, TimerHandle, TimerId};
use std::rc::Rc;
use std::time::Duration;

/// Where the repeater is in a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressPhase {
    Idle,
    /// Pressed, initial delay not yet elapsed.
    Waiting,
    /// Pressed and repeating.
    Repeating,
}

/// Logical output of the repeater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressSignal {
    /// Press began. Doubles as the immediate step, so a tap is never lost.
    Start,
    /// Held past the delay; carries the 1-based repeat count of this press.
    Repeat(u32),
    /// Press ended. Emitted exactly once per press.
    End,
}

/// State machine for one pressable element: emits `Start` on press,
/// accelerating `Repeat`s while held, and exactly one `End` on release.
pub struct PressRepeater {
    config: RepeatConfig,
    repeating: bool,
    scheduler: Rc<dyn Scheduler>,
    surface: Rc<dyn ReleaseSurface>,
    phase: PressPhase,
    origin_y: Option<f32>,
    delay_timer: Option<TimerHandle>,
    repeat_timer: Option<TimerHandle>,
    release_listener: Option<ReleaseListener>,
    /// Repeats left before the next speed-up.
    acceleration_counter: u32,
    repeat_interval: Duration,
    repeats: u32,
}

impl PressRepeater {
    pub fn new(
        config: RepeatConfig,
        scheduler: Rc<dyn Scheduler>,
        surface: Rc<dyn ReleaseSurface>,
    ) -> Self {
        let config = config.normalized();
        Self {
            acceleration_counter: config.acceleration_every_n_repeats,
            repeat_interval: config.initial_repeat_interval(),
            config,
            repeating: true,
            scheduler,
            surface,
            phase: PressPhase::Idle,
            origin_y: None,
            delay_timer: None,
            repeat_timer: None,
            release_listener: None,
            repeats: 0,
        }
    }

    /// Presses only emit `Start` and `End`; holding schedules nothing.
    pub fn without_repeat(mut self) -> Self {
        self.repeating = false;
        self
    }

    pub fn repeats_when_held(&self) -> bool {
        self.repeating
    }

    pub fn config(&self) -> &RepeatConfig {
        &self.config
    }

    pub fn phase(&self) -> PressPhase {
        self.phase
    }

    pub fn is_pressed(&self) -> bool {
        self.phase != PressPhase::Idle
    }

    /// Offset inside the element where the current press began.
    pub fn press_origin(&self) -> Option<f32> {
        self.origin_y
    }

    /// Interval the next repeat will be scheduled at.
    pub fn repeat_interval(&self) -> Duration {
        self.repeat_interval
    }

    /// Repeats emitted during the current (or last) press.
    pub fn repeats(&self) -> u32 {
        self.repeats
    }

    /// Id of the surface listener, while a press is live.
    pub fn listener(&self) -> Option<ListenerId> {
        self.release_listener.as_ref().map(ReleaseListener::id)
    }

    /// Whether `id` is one of this repeater's pending timers.
    pub fn owns_timer(&self, id: TimerId) -> bool {
        self.delay_timer.as_ref().is_some_and(|t| t.id() == id)
            || self.repeat_timer.as_ref().is_some_and(|t| t.id() == id)
    }

    /// Dispatch a normalized press transition.
    pub fn handle(&mut self, input: PressInput) -> Option<PressSignal> {
        match input {
            PressInput::Start { local_y } => self.handle_press_start(local_y),
            PressInput::End => self.handle_press_end(),
        }
    }

    /// Begin a press. A second start while already pressed is ignored:
    /// no extra step, no second timer, no second listener.
    pub fn handle_press_start(&mut self, local_y: Option<f32>) -> Option<PressSignal> {
        if self.is_pressed() {
            log::trace!("press start while pressed, ignored");
            return None;
        }

        self.phase = PressPhase::Waiting;
        self.origin_y = local_y;
        self.repeats = 0;
        self.acceleration_counter = self.config.acceleration_every_n_repeats;
        self.repeat_interval = self.config.initial_repeat_interval();

        if self.release_listener.is_none() {
            self.release_listener = Some(ReleaseListener::attach(&self.surface));
        }
        if self.repeating {
            self.delay_timer = Some(TimerHandle::schedule(
                &self.scheduler,
                self.config.initial_delay(),
            ));
        }

        log::debug!("press start (y = {local_y:?})");
        Some(PressSignal::Start)
    }

    /// End the press. Without a live press this is a no-op.
    pub fn handle_press_end(&mut self) -> Option<PressSignal> {
        if !self.is_pressed() {
            self.release_resources();
            return None;
        }
        self.release_resources();
        self.phase = PressPhase::Idle;
        log::debug!("press end after {} repeats", self.repeats);
        Some(PressSignal::End)
    }

    /// A release was observed somewhere on the input surface.
    pub fn handle_surface_release(&mut self, id: ListenerId) -> Option<PressSignal> {
        if self.listener() != Some(id) {
            log::trace!("surface release for {id:?} not ours, ignored");
            return None;
        }
        self.handle_press_end()
    }

    /// Deliver a timer fire from the scheduler.
    pub fn handle_timer(&mut self, id: TimerId) -> Option<PressSignal> {
        if let Some(timer) = self.delay_timer.take_if(|t| t.id() == id) {
            timer.fired();
            return self.start_repeating();
        }
        if let Some(timer) = self.repeat_timer.take_if(|t| t.id() == id) {
            timer.fired();
            return self.repeat();
        }
        log::trace!("{id} not ours, ignored");
        None
    }

    /// Release every resource without emitting `End`, for when the owning
    /// component goes away mid-press.
    pub fn teardown(&mut self) {
        if self.is_pressed() {
            log::debug!("teardown while pressed");
        }
        self.release_resources();
        self.phase = PressPhase::Idle;
    }

    fn start_repeating(&mut self) -> Option<PressSignal> {
        if !self.is_pressed() {
            self.release_resources();
            return None;
        }
        self.phase = PressPhase::Repeating;
        self.acceleration_counter = self.config.acceleration_every_n_repeats;
        self.repeat_interval = self.config.initial_repeat_interval();
        self.emit_repeat()
    }

    fn repeat(&mut self) -> Option<PressSignal> {
        if !self.is_pressed() {
            self.release_resources();
            return None;
        }
        self.acceleration_counter -= 1;
        if self.acceleration_counter == 0 {
            self.acceleration_counter = self.config.acceleration_every_n_repeats;
            self.repeat_interval = self.config.accelerate(self.repeat_interval);
        }
        self.emit_repeat()
    }

    fn emit_repeat(&mut self) -> Option<PressSignal> {
        self.repeats = self.repeats.saturating_add(1);
        self.repeat_timer = Some(TimerHandle::schedule(
            &self.scheduler,
            self.repeat_interval,
        ));
        log::trace!(
            "repeat {} (next in {:?})",
            self.repeats,
            self.repeat_interval
        );
        Some(PressSignal::Repeat(self.repeats))
    }

    /// Cancel both timers and detach the surface listener. Idempotent.
    fn release_resources(&mut self) {
        self.delay_timer = None;
        self.repeat_timer = None;
        self.release_listener = None;
    }
}

impl std::fmt::Debug for PressRepeater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PressRepeater")
            .field("phase", &self.phase)
            .field("repeating", &self.repeating)
            .field("repeats", &self.repeats)
            .field("repeat_interval", &self.repeat_interval)
            .field("delay_timer", &self.delay_timer)
            .field("repeat_timer", &self.repeat_timer)
            .field("release_listener", &self.release_listener)
            .finish()
    }
}
