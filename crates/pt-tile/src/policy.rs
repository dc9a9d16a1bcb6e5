//! Widget value policies.
//!
//! A tile knows nothing about what its value means. Each widget injects a
//! [`TilePolicy`] whose hooks the tile calls when a zone fires:
//!
//! | Policy | up / down | toggle | label |
//! |--------|-----------|--------|-------|
//! | [`Dimmer`] | `clamp(value, ±step)` | — | value |
//! | [`Fan`] | `cycle(level, direction)` | — | `Low` / `Medium` / `High` |
//! | [`Switch`] | — | value mirrors `on` | `ON` / `OFF` |
//! | [`Hooks`] | caller closures | caller closure | value |
//! | `()` | — | — | value |
//!
//! Flipping `on` and maintaining `pressed` belong to the tile, not to the
//! policy.

use crate::tile::TileState;
use serde::{Deserialize, Serialize};

/// Hooks a tile calls on zone activity. Every hook defaults to a no-op.
pub trait TilePolicy {
    /// Up zone pressed, or repeated while held.
    fn on_up(&mut self, _state: &mut TileState) {}

    /// Toggle zone pressed (`state.on` is already flipped). Never repeats.
    fn on_toggle(&mut self, _state: &mut TileState) {}

    /// Down zone pressed, or repeated while held.
    fn on_down(&mut self, _state: &mut TileState) {}

    /// Any zone released (`state.pressed` is already updated).
    fn on_end(&mut self, _state: &mut TileState) {}

    /// Text shown in the value band.
    fn label(&self, state: &TileState) -> String {
        format!("{}", state.value)
    }
}

impl TilePolicy for () {}

impl<P: TilePolicy + ?Sized> TilePolicy for Box<P> {
    fn on_up(&mut self, state: &mut TileState) {
        (**self).on_up(state);
    }

    fn on_toggle(&mut self, state: &mut TileState) {
        (**self).on_toggle(state);
    }

    fn on_down(&mut self, state: &mut TileState) {
        (**self).on_down(state);
    }

    fn on_end(&mut self, state: &mut TileState) {
        (**self).on_end(state);
    }

    fn label(&self, state: &TileState) -> String {
        (**self).label(state)
    }
}

/// Direction of a stepped change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

impl StepDirection {
    fn sign(self) -> f64 {
        match self {
            StepDirection::Up => 1.0,
            StepDirection::Down => -1.0,
        }
    }
}

// ─── Dimmer ──────────────────────────────────────────────────────────────

/// Bounds and step sizes of a numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValueRange {
    /// Default: **0**.
    pub min_value: f64,
    /// Default: **100**.
    pub max_value: f64,
    /// Applied by the up zone. Default: **1**.
    pub increment: f64,
    /// Applied by the down zone. Default: **-1**.
    pub decrement: f64,
}

impl Default for ValueRange {
    fn default() -> Self {
        Self {
            min_value: 0.0,
            max_value: 100.0,
            increment: 1.0,
            decrement: -1.0,
        }
    }
}

impl ValueRange {
    /// Swap inverted bounds instead of rejecting them.
    pub fn normalized(self) -> Self {
        let mut range = self;
        if range.min_value > range.max_value {
            log::warn!(
                "min_value ({}) above max_value ({}), swapping",
                range.min_value,
                range.max_value
            );
            std::mem::swap(&mut range.min_value, &mut range.max_value);
        }
        range
    }

    /// `current + delta`, saturated to `[min_value, max_value]`.
    pub fn clamp(&self, current: f64, delta: f64) -> f64 {
        (current + delta).max(self.min_value).min(self.max_value)
    }
}

/// Numeric value stepped up and down inside a range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimmer {
    range: ValueRange,
}

impl Dimmer {
    pub fn new(range: ValueRange) -> Self {
        Self {
            range: range.normalized(),
        }
    }

    pub fn range(&self) -> &ValueRange {
        &self.range
    }
}

impl TilePolicy for Dimmer {
    fn on_up(&mut self, state: &mut TileState) {
        state.value = self.range.clamp(state.value, self.range.increment);
    }

    fn on_down(&mut self, state: &mut TileState) {
        state.value = self.range.clamp(state.value, self.range.decrement);
    }
}

// ─── Fan ─────────────────────────────────────────────────────────────────

/// Three fan speeds; the tile value is the level index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FanLevel {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl FanLevel {
    pub fn from_value(value: f64) -> Self {
        match value.round() {
            v if v >= 2.0 => FanLevel::High,
            v if v >= 1.0 => FanLevel::Medium,
            _ => FanLevel::Low,
        }
    }

    pub fn value(self) -> f64 {
        self as u8 as f64
    }

    pub fn name(self) -> &'static str {
        match self {
            FanLevel::Low => "Low",
            FanLevel::Medium => "Medium",
            FanLevel::High => "High",
        }
    }
}

/// Tri-state fan speed. Stepping past `High` or below `Low` stays put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fan;

impl Fan {
    /// Next level in `direction`, saturating at both ends.
    pub fn cycle(current: f64, direction: StepDirection) -> f64 {
        let next = FanLevel::from_value(current).value() + direction.sign();
        FanLevel::from_value(next.clamp(0.0, 2.0)).value()
    }
}

impl TilePolicy for Fan {
    fn on_up(&mut self, state: &mut TileState) {
        state.value = Fan::cycle(state.value, StepDirection::Up);
    }

    fn on_down(&mut self, state: &mut TileState) {
        state.value = Fan::cycle(state.value, StepDirection::Down);
    }

    fn label(&self, state: &TileState) -> String {
        FanLevel::from_value(state.value).name().to_string()
    }
}

// ─── Switch ──────────────────────────────────────────────────────────────

/// Plain on/off switch; the value mirrors `on` as 1 or 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Switch;

impl TilePolicy for Switch {
    fn on_toggle(&mut self, state: &mut TileState) {
        state.value = if state.on { 1.0 } else { 0.0 };
    }

    fn label(&self, state: &TileState) -> String {
        String::from(if state.on { "ON" } else { "OFF" })
    }
}

// ─── Caller hooks ────────────────────────────────────────────────────────

type Hook = Box<dyn FnMut(&mut TileState)>;

/// Policy assembled from caller-supplied closures. Unset hooks do nothing.
#[derive(Default)]
pub struct Hooks {
    up: Option<Hook>,
    toggle: Option<Hook>,
    down: Option<Hook>,
    end: Option<Hook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn up(mut self, f: impl FnMut(&mut TileState) + 'static) -> Self {
        self.up = Some(Box::new(f));
        self
    }

    pub fn toggle(mut self, f: impl FnMut(&mut TileState) + 'static) -> Self {
        self.toggle = Some(Box::new(f));
        self
    }

    pub fn down(mut self, f: impl FnMut(&mut TileState) + 'static) -> Self {
        self.down = Some(Box::new(f));
        self
    }

    pub fn end(mut self, f: impl FnMut(&mut TileState) + 'static) -> Self {
        self.end = Some(Box::new(f));
        self
    }
}

fn call(hook: &mut Option<Hook>, state: &mut TileState) {
    if let Some(f) = hook {
        f(state);
    }
}

impl TilePolicy for Hooks {
    fn on_up(&mut self, state: &mut TileState) {
        call(&mut self.up, state);
    }

    fn on_toggle(&mut self, state: &mut TileState) {
        call(&mut self.toggle, state);
    }

    fn on_down(&mut self, state: &mut TileState) {
        call(&mut self.down, state);
    }

    fn on_end(&mut self, state: &mut TileState) {
        call(&mut self.end, state);
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("up", &self.up.is_some())
            .field("toggle", &self.toggle.is_some())
            .field("down", &self.down.is_some())
            .field("end", &self.end.is_some())
            .finish()
    }
}
