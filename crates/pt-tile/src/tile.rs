//! Three-zone tile.
//!
//! A tile stacks three independently pressable zones over one shared
//! value. Each zone owns a [`PressRepeater`]; the tile maps repeater
//! signals onto the injected [`TilePolicy`]:
//!
//! | Zone | `Start` | `Repeat(n)` | `End` |
//! |------|---------|-------------|-------|
//! | Up | `on_up` | `on_up` | `on_end` |
//! | Toggle | flip `on`, `on_toggle` | never scheduled | `on_end` |
//! | Down | `on_down` | `on_down` | `on_end` |

use crate::policy::TilePolicy;
use crate::zone::{Zone, ZoneLayout};
use pt_core::{
    ListenerId, PressInput, PressRepeater, PressSignal, RawInput, ReleaseSurface, RepeatConfig,
    Scheduler, TimerId,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::rc::Rc;

/// Mutable widget state handed to policy hooks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TileState {
    /// Persistent on/off flag, flipped by the toggle zone.
    pub on: bool,
    /// Current magnitude; meaning owned by the policy.
    pub value: f64,
    /// True while any zone is held.
    pub pressed: bool,
}

/// Read-only view for the rendering host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileSnapshot {
    pub title: String,
    pub icon: Option<String>,
    pub on: bool,
    pub value: f64,
    pub pressed: bool,
    pub label: String,
}

/// Construction parameters of a tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TileConfig {
    pub title: String,
    pub icon: Option<String>,
    /// Initial on/off flag. Default: **false**.
    pub on: bool,
    /// Initial value. Default: **0**.
    pub value: f64,
    /// Cadence shared by the up and down zones.
    #[serde(flatten)]
    pub repeat: RepeatConfig,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            icon: None,
            on: false,
            value: 0.0,
            repeat: RepeatConfig::default(),
        }
    }
}

/// What a zone did in response to one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneAction {
    Up,
    Toggle,
    Down,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileEvent {
    pub zone: Zone,
    pub action: ZoneAction,
}

pub type TileEvents = SmallVec<[TileEvent; 2]>;

/// Three press zones (up, toggle, down) over one `{on, value, pressed}`
/// state, with value changes delegated to `P`.
pub struct Tile<P: TilePolicy = ()> {
    title: String,
    icon: Option<String>,
    state: TileState,
    policy: P,
    layout: ZoneLayout,
    up: PressRepeater,
    toggle: PressRepeater,
    down: PressRepeater,
}

impl<P: TilePolicy> Tile<P> {
    pub fn new(
        config: TileConfig,
        policy: P,
        scheduler: Rc<dyn Scheduler>,
        surface: Rc<dyn ReleaseSurface>,
    ) -> Self {
        let repeater = || {
            PressRepeater::new(config.repeat, Rc::clone(&scheduler), Rc::clone(&surface))
        };
        let (up, toggle, down) = (repeater(), repeater().without_repeat(), repeater());
        Self {
            title: config.title,
            icon: config.icon,
            state: TileState {
                on: config.on,
                value: config.value,
                pressed: false,
            },
            policy,
            layout: ZoneLayout::default(),
            up,
            toggle,
            down,
        }
    }

    pub fn with_layout(mut self, layout: ZoneLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn state(&self) -> &TileState {
        &self.state
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn layout(&self) -> &ZoneLayout {
        &self.layout
    }

    pub fn repeater(&self, zone: Zone) -> &PressRepeater {
        match zone {
            Zone::Up => &self.up,
            Zone::Toggle => &self.toggle,
            Zone::Down => &self.down,
        }
    }

    fn repeater_mut(&mut self, zone: Zone) -> &mut PressRepeater {
        match zone {
            Zone::Up => &mut self.up,
            Zone::Toggle => &mut self.toggle,
            Zone::Down => &mut self.down,
        }
    }

    pub fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            title: self.title.clone(),
            icon: self.icon.clone(),
            on: self.state.on,
            value: self.state.value,
            pressed: self.state.pressed,
            label: self.policy.label(&self.state),
        }
    }

    // ─── Inputs ──────────────────────────────────────────────────────────

    /// Press-start on one zone's own element.
    pub fn zone_press_start(&mut self, zone: Zone, local_y: Option<f32>) -> Option<TileEvent> {
        self.handle_zone(zone, PressInput::Start { local_y })
    }

    /// Press-end on one zone's own element.
    pub fn zone_press_end(&mut self, zone: Zone) -> Option<TileEvent> {
        self.handle_zone(zone, PressInput::End)
    }

    pub fn handle_zone(&mut self, zone: Zone, input: PressInput) -> Option<TileEvent> {
        let signal = self.repeater_mut(zone).handle(input)?;
        self.apply(zone, signal)
    }

    /// Raw event on the tile as a whole. Starts go to the zone under the
    /// pointer; a release ends every held zone.
    pub fn handle_pointer(&mut self, raw: RawInput, height: f32) -> TileEvents {
        let mut events = TileEvents::new();
        match raw.normalize() {
            PressInput::Start { local_y } => {
                let zone = self.layout.hit(local_y.unwrap_or(height / 2.0), height);
                events.extend(self.zone_press_start(zone, local_y));
            }
            PressInput::End => {
                for zone in Zone::ALL {
                    events.extend(self.zone_press_end(zone));
                }
            }
        }
        events
    }

    /// Deliver a timer fire to the zone that owns it.
    pub fn handle_timer(&mut self, id: TimerId) -> Option<TileEvent> {
        let zone = Zone::ALL
            .into_iter()
            .find(|zone| self.repeater(*zone).owns_timer(id));
        let Some(zone) = zone else {
            log::trace!("{id} has no owner on this tile");
            return None;
        };
        let signal = self.repeater_mut(zone).handle_timer(id)?;
        self.apply(zone, signal)
    }

    /// A release seen by a surface-wide listener.
    pub fn handle_surface_release(&mut self, id: ListenerId) -> Option<TileEvent> {
        let zone = Zone::ALL
            .into_iter()
            .find(|zone| self.repeater(*zone).listener() == Some(id))?;
        let signal = self.repeater_mut(zone).handle_surface_release(id)?;
        self.apply(zone, signal)
    }

    /// Release every zone's timers and listeners without firing `on_end`.
    pub fn teardown(&mut self) {
        for zone in Zone::ALL {
            self.repeater_mut(zone).teardown();
        }
        self.state.pressed = false;
    }

    // ─── Signal mapping ──────────────────────────────────────────────────

    fn apply(&mut self, zone: Zone, signal: PressSignal) -> Option<TileEvent> {
        self.state.pressed = Zone::ALL
            .into_iter()
            .any(|z| self.repeater(z).is_pressed());

        let action = match (zone, signal) {
            (_, PressSignal::End) => {
                self.policy.on_end(&mut self.state);
                ZoneAction::End
            }
            (Zone::Up, PressSignal::Start | PressSignal::Repeat(_)) => {
                self.policy.on_up(&mut self.state);
                ZoneAction::Up
            }
            (Zone::Down, PressSignal::Start | PressSignal::Repeat(_)) => {
                self.policy.on_down(&mut self.state);
                ZoneAction::Down
            }
            (Zone::Toggle, PressSignal::Start) => {
                self.state.on = !self.state.on;
                self.policy.on_toggle(&mut self.state);
                ZoneAction::Toggle
            }
            (Zone::Toggle, PressSignal::Repeat(_)) => return None,
        };
        Some(TileEvent { zone, action })
    }
}

impl<P: TilePolicy> std::fmt::Debug for Tile<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tile")
            .field("title", &self.title)
            .field("state", &self.state)
            .field("up", &self.up)
            .field("toggle", &self.toggle)
            .field("down", &self.down)
            .finish()
    }
}
