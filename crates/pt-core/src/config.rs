//! Repeat cadence configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing of the press-and-hold repeat curve, in milliseconds.
///
/// Deserializes from camelCase keys; the short legacy property names
/// (`initialDelay`, `initialRepeat`, `acceleration`, `accelerationAmount`,
/// `minRepeat`) are accepted as aliases. Missing keys take the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepeatConfig {
    /// Hold time before the first repeat. Default: **1000**.
    #[serde(alias = "initialDelay")]
    pub initial_delay_ms: u64,

    /// Interval between the first repeats. Default: **250**.
    #[serde(alias = "initialRepeat")]
    pub initial_repeat_interval_ms: u64,

    /// Repeats between two speed-ups. Default: **4**.
    #[serde(alias = "acceleration")]
    pub acceleration_every_n_repeats: u32,

    /// How much each speed-up shaves off the interval. Default: **10**.
    #[serde(alias = "accelerationAmount")]
    pub acceleration_step_ms: u64,

    /// Floor for the repeat interval. Default: **50**.
    #[serde(alias = "minRepeat")]
    pub min_repeat_interval_ms: u64,
}

impl Default for RepeatConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            initial_repeat_interval_ms: 250,
            acceleration_every_n_repeats: 4,
            acceleration_step_ms: 10,
            min_repeat_interval_ms: 50,
        }
    }
}

impl RepeatConfig {
    /// Repair contradictory settings instead of rejecting them.
    ///
    /// - the floor is at least 1 ms and never above the initial interval
    /// - at least one repeat between speed-ups
    pub fn normalized(self) -> Self {
        let mut cfg = self;
        if cfg.acceleration_every_n_repeats == 0 {
            log::warn!("acceleration_every_n_repeats = 0, using 1");
            cfg.acceleration_every_n_repeats = 1;
        }
        if cfg.min_repeat_interval_ms == 0 {
            log::warn!("min_repeat_interval_ms = 0, using 1");
            cfg.min_repeat_interval_ms = 1;
        }
        if cfg.initial_repeat_interval_ms < cfg.min_repeat_interval_ms {
            log::warn!(
                "min_repeat_interval_ms ({}) exceeds initial_repeat_interval_ms ({}), clamping",
                cfg.min_repeat_interval_ms,
                cfg.initial_repeat_interval_ms
            );
            cfg.min_repeat_interval_ms = cfg.initial_repeat_interval_ms.max(1);
            cfg.initial_repeat_interval_ms = cfg.min_repeat_interval_ms;
        }
        cfg
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn initial_repeat_interval(&self) -> Duration {
        Duration::from_millis(self.initial_repeat_interval_ms)
    }

    pub fn acceleration_step(&self) -> Duration {
        Duration::from_millis(self.acceleration_step_ms)
    }

    pub fn min_repeat_interval(&self) -> Duration {
        Duration::from_millis(self.min_repeat_interval_ms)
    }

    /// Interval that follows `current` after one speed-up.
    pub fn accelerate(&self, current: Duration) -> Duration {
        current
            .saturating_sub(self.acceleration_step())
            .max(self.min_repeat_interval())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = RepeatConfig::default();
        assert_eq!(cfg.initial_delay(), Duration::from_millis(1000));
        assert_eq!(cfg.initial_repeat_interval(), Duration::from_millis(250));
        assert_eq!(cfg.acceleration_every_n_repeats, 4);
        assert_eq!(cfg.acceleration_step(), Duration::from_millis(10));
        assert_eq!(cfg.min_repeat_interval(), Duration::from_millis(50));
    }

    #[test]
    fn normalized_default_is_unchanged() {
        assert_eq!(RepeatConfig::default().normalized(), RepeatConfig::default());
    }

    #[test]
    fn floor_above_initial_interval_is_clamped() {
        let cfg = RepeatConfig {
            initial_repeat_interval_ms: 100,
            min_repeat_interval_ms: 300,
            ..RepeatConfig::default()
        }
        .normalized();
        assert_eq!(cfg.min_repeat_interval_ms, 100);
        assert_eq!(cfg.initial_repeat_interval_ms, 100);
    }

    #[test]
    fn zero_counts_and_floors_are_repaired() {
        let cfg = RepeatConfig {
            initial_repeat_interval_ms: 0,
            acceleration_every_n_repeats: 0,
            min_repeat_interval_ms: 0,
            ..RepeatConfig::default()
        }
        .normalized();
        assert_eq!(cfg.acceleration_every_n_repeats, 1);
        assert_eq!(cfg.min_repeat_interval_ms, 1);
        assert_eq!(cfg.initial_repeat_interval_ms, 1);
    }

    #[test]
    fn deserializes_camel_case_and_legacy_names() {
        let cfg: RepeatConfig =
            serde_json::from_str(r#"{"initialDelayMs": 500, "minRepeat": 20}"#).unwrap();
        assert_eq!(cfg.initial_delay_ms, 500);
        assert_eq!(cfg.min_repeat_interval_ms, 20);
        assert_eq!(cfg.initial_repeat_interval_ms, 250);

        let legacy: RepeatConfig = serde_json::from_str(
            r#"{"initialDelay": 800, "initialRepeat": 200, "acceleration": 2, "accelerationAmount": 5}"#,
        )
        .unwrap();
        assert_eq!(legacy.initial_delay_ms, 800);
        assert_eq!(legacy.initial_repeat_interval_ms, 200);
        assert_eq!(legacy.acceleration_every_n_repeats, 2);
        assert_eq!(legacy.acceleration_step_ms, 5);
    }

    #[test]
    fn accelerate_never_drops_below_floor() {
        let cfg = RepeatConfig::default();
        assert_eq!(
            cfg.accelerate(Duration::from_millis(250)),
            Duration::from_millis(240)
        );
        assert_eq!(
            cfg.accelerate(Duration::from_millis(55)),
            Duration::from_millis(50)
        );
        assert_eq!(
            cfg.accelerate(Duration::from_millis(50)),
            Duration::from_millis(50)
        );
    }
}
