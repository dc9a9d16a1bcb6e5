//! Zone hit testing: press offset → zone lookup.
//!
//! A tile is split vertically into three pressable bands. When the host
//! registers one handler for the whole tile, the press offset decides
//! which band was hit.

use serde::{Deserialize, Serialize};

/// One of the three pressable bands of a tile, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Up,
    Toggle,
    Down,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Up, Zone::Toggle, Zone::Down];

    pub fn name(self) -> &'static str {
        match self {
            Zone::Up => "up",
            Zone::Toggle => "toggle",
            Zone::Down => "down",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(Zone::Up),
            "toggle" => Some(Zone::Toggle),
            "down" => Some(Zone::Down),
            _ => None,
        }
    }
}

/// Relative heights of the three bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneLayout {
    pub up: f32,
    pub toggle: f32,
    pub down: f32,
}

impl Default for ZoneLayout {
    /// Title band, value band, icon band at 0.5 : 1 : 0.5.
    fn default() -> Self {
        Self {
            up: 0.5,
            toggle: 1.0,
            down: 0.5,
        }
    }
}

impl ZoneLayout {
    /// The whole tile is the toggle band (plain on/off switches).
    pub fn toggle_only() -> Self {
        Self {
            up: 0.0,
            toggle: 1.0,
            down: 0.0,
        }
    }

    /// Upper half increments, lower half decrements.
    pub fn halves() -> Self {
        Self {
            up: 1.0,
            toggle: 0.0,
            down: 1.0,
        }
    }

    fn weights(&self) -> [(Zone, f32); 3] {
        [
            (Zone::Up, self.up.max(0.0)),
            (Zone::Toggle, self.toggle.max(0.0)),
            (Zone::Down, self.down.max(0.0)),
        ]
    }

    /// Zone under a press at `local_y` inside an element `height` tall.
    ///
    /// Offsets outside the element snap to the nearest edge. A degenerate
    /// layout or height falls back to the toggle band.
    pub fn hit(&self, local_y: f32, height: f32) -> Zone {
        let weights = self.weights();
        let total: f32 = weights.iter().map(|(_, w)| w).sum();
        if height.is_nan() || height <= 0.0 || total <= 0.0 || local_y.is_nan() {
            return Zone::Toggle;
        }

        let pos = (local_y / height).clamp(0.0, 1.0) * total;
        let mut edge = 0.0;
        for (zone, weight) in weights {
            edge += weight;
            if weight > 0.0 && pos < edge {
                return zone;
            }
        }
        // pos == total: bottom edge belongs to the last non-empty band.
        weights
            .iter()
            .rev()
            .find(|(_, w)| *w > 0.0)
            .map_or(Zone::Toggle, |(zone, _)| *zone)
    }
}
