//! WASM bridge for Press Tiles: drives a tile from a browser host.
//!
//! Compiled via `wasm-pack build --target web`. The host forwards DOM
//! events, runs the timers and document listeners each response asks
//! for, and calls back with `timer_fired` / `surface_release`.
//!
//! ```js
//! const tile = new PressTile("dimmer", JSON.stringify({ title: "Lamp" }));
//! el.onmousedown = (e) => apply(JSON.parse(tile.pointer_down(e.offsetY, el.clientHeight, false, e.cancelable)));
//! ```

mod host;

pub use host::{HostCommands, HostQueue, HostResponse, ScheduleRequest};

use pt_core::{ListenerId, RawInput, TimerId};
use pt_tile::{
    Dimmer, Fan, Switch, Tile, TileConfig, TileEvent, TilePolicy, ValueRange, Zone, ZoneLayout,
};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Widget behavior selected by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Dimmer,
    Fan,
    Switch,
    Plain,
}

impl TileKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dimmer" => Some(TileKind::Dimmer),
            "fan" => Some(TileKind::Fan),
            "switch" => Some(TileKind::Switch),
            "plain" | "" => Some(TileKind::Plain),
            _ => None,
        }
    }
}

type DynTile = Tile<Box<dyn TilePolicy>>;

/// Build a tile wired to `queue` from a kind name and a JSON config.
///
/// The same JSON object carries the tile fields, the repeat cadence, and
/// for dimmers the value range. An empty string means all defaults.
pub fn build_tile(
    kind: &str,
    config_json: &str,
    queue: &Rc<HostQueue>,
) -> Result<DynTile, String> {
    parse_tile(kind, config_json, queue)
        .inspect_err(|e| log::debug!("tile {kind:?} rejected: {e}"))
}

fn parse_tile(
    kind: &str,
    config_json: &str,
    queue: &Rc<HostQueue>,
) -> Result<DynTile, String> {
    let kind = TileKind::from_name(kind).ok_or_else(|| format!("unknown tile kind: {kind:?}"))?;
    let json = if config_json.trim().is_empty() {
        "{}"
    } else {
        config_json
    };
    let config: TileConfig =
        serde_json::from_str(json).map_err(|e| format!("invalid tile config: {e}"))?;

    let (policy, layout): (Box<dyn TilePolicy>, ZoneLayout) = match kind {
        TileKind::Dimmer => {
            let range: ValueRange =
                serde_json::from_str(json).map_err(|e| format!("invalid value range: {e}"))?;
            (Box::new(Dimmer::new(range)), ZoneLayout::default())
        }
        TileKind::Fan => (Box::new(Fan), ZoneLayout::default()),
        TileKind::Switch => (Box::new(Switch), ZoneLayout::toggle_only()),
        TileKind::Plain => (Box::new(()), ZoneLayout::default()),
    };

    Ok(Tile::new(config, policy, queue.clone(), queue.clone()).with_layout(layout))
}

/// One tile as seen from JavaScript.
///
/// Every method returns a JSON `HostResponse`:
/// `{changed, preventDefault, events, state, schedule, cancel, attach, detach}`.
#[wasm_bindgen]
pub struct PressTile {
    tile: DynTile,
    queue: Rc<HostQueue>,
}

#[wasm_bindgen]
impl PressTile {
    /// `kind` is one of `dimmer`, `fan`, `switch`, `plain`.
    #[wasm_bindgen(constructor)]
    pub fn new(kind: &str, config_json: &str) -> Result<PressTile, JsValue> {
        console_error_panic_hook_setup();
        let queue = Rc::new(HostQueue::new());
        let tile = build_tile(kind, config_json, &queue).map_err(|e| JsValue::from_str(&e))?;
        Ok(Self { tile, queue })
    }

    /// `mousedown` / `touchstart` on the tile element.
    pub fn pointer_down(
        &mut self,
        offset_y: f32,
        height: f32,
        touch: bool,
        cancelable: bool,
    ) -> String {
        let raw = if touch {
            RawInput::TouchStart {
                offset_y,
                cancelable,
            }
        } else {
            RawInput::MouseDown {
                offset_y,
                cancelable,
            }
        };
        self.pointer(raw, height)
    }

    /// `mouseup` / `touchend` / `touchcancel` on the tile element.
    pub fn pointer_up(&mut self, touch: bool, cancel: bool, cancelable: bool) -> String {
        let raw = match (touch, cancel) {
            (true, true) => RawInput::TouchCancel { cancelable },
            (true, false) => RawInput::TouchEnd { cancelable },
            (false, _) => RawInput::MouseUp { cancelable },
        };
        self.pointer(raw, 0.0)
    }

    /// Press on a zone that has its own element. Unknown zone names are ignored.
    pub fn zone_press_start(&mut self, zone: &str, offset_y: Option<f32>) -> String {
        self.respond(|tile| {
            zone_named(zone)
                .and_then(|zone| tile.zone_press_start(zone, offset_y))
                .into_iter()
                .collect()
        })
        .prevent_default(true)
        .to_json()
    }

    pub fn zone_press_end(&mut self, zone: &str) -> String {
        self.respond(|tile| {
            zone_named(zone)
                .and_then(|zone| tile.zone_press_end(zone))
                .into_iter()
                .collect()
        })
        .prevent_default(true)
        .to_json()
    }

    /// A `setTimeout` requested earlier has fired.
    pub fn timer_fired(&mut self, id: f64) -> String {
        let id = TimerId::from_raw(id as u64);
        self.respond(|tile| tile.handle_timer(id).into_iter().collect())
            .to_json()
    }

    /// A document-level listener requested earlier saw a release.
    pub fn surface_release(&mut self, id: f64) -> String {
        let id = ListenerId::from_raw(id as u64);
        self.respond(|tile| tile.handle_surface_release(id).into_iter().collect())
            .to_json()
    }

    /// The element is leaving the page.
    pub fn teardown(&mut self) -> String {
        self.respond(|tile| {
            tile.teardown();
            Vec::new()
        })
        .to_json()
    }

    pub fn snapshot(&self) -> String {
        let state = self.tile.snapshot();
        HostResponse::new(&state, state.clone(), Vec::new(), self.queue.drain()).to_json()
    }
}

impl PressTile {
    fn pointer(&mut self, raw: RawInput, height: f32) -> String {
        self.respond(|tile| tile.handle_pointer(raw, height).into_vec())
            .prevent_default(raw.prevent_default())
            .to_json()
    }

    fn respond(&mut self, f: impl FnOnce(&mut DynTile) -> Vec<TileEvent>) -> HostResponse {
        let before = self.tile.snapshot();
        let events = f(&mut self.tile);
        let commands = self.queue.drain();
        if !commands.is_empty() {
            log::trace!("host commands: {commands:?}");
        }
        HostResponse::new(&before, self.tile.snapshot(), events, commands)
    }
}

fn zone_named(name: &str) -> Option<Zone> {
    let zone = Zone::from_name(name);
    if zone.is_none() {
        log::warn!("unknown zone {name:?}, ignored");
    }
    zone
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Press Tiles panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::cell::RefCell;

    fn tile(kind: &str, json: &str) -> PressTile {
        let queue = Rc::new(HostQueue::new());
        let tile = match build_tile(kind, json, &queue) {
            Ok(tile) => tile,
            Err(e) => panic!("{e}"),
        };
        PressTile { tile, queue }
    }

    struct Capture;

    thread_local! {
        static LINES: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
    }

    impl log::Log for Capture {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            LINES.with(|lines| {
                lines
                    .borrow_mut()
                    .push((record.level(), record.args().to_string()))
            });
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture;

    /// Log lines emitted on this thread while `f` runs.
    fn logged(f: impl FnOnce()) -> Vec<(log::Level, String)> {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Trace);
        LINES.with(|lines| lines.borrow_mut().clear());
        f();
        LINES.with(|lines| lines.take())
    }

    fn parse(json: String) -> Value {
        serde_json::from_str(&json).unwrap()
    }

    fn ids(value: &Value, key: &str) -> Vec<u64> {
        value[key]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_u64().unwrap())
            .collect()
    }

    #[test]
    fn press_requests_delay_timer_and_listener() {
        let mut t = tile("dimmer", r#"{"value": 10}"#);
        let res = parse(t.pointer_down(4.0, 128.0, false, true));
        assert_eq!(res["changed"], Value::Bool(true));
        assert_eq!(res["preventDefault"], Value::Bool(true));
        assert_eq!(res["state"]["value"], serde_json::json!(11.0));
        assert_eq!(res["schedule"][0]["delayMs"], serde_json::json!(1000));
        assert_eq!(ids(&res, "attach").len(), 1);
        assert_eq!(res["events"][0]["action"], Value::from("up"));
    }

    #[test]
    fn timer_fire_schedules_next_repeat() {
        let mut t = tile(
            "dimmer",
            r#"{"initialDelayMs": 300, "initialRepeatIntervalMs": 80}"#,
        );
        let res = parse(t.pointer_down(4.0, 128.0, true, true));
        assert_eq!(res["schedule"][0]["delayMs"], serde_json::json!(300));
        let delay = res["schedule"][0]["id"].as_f64().unwrap();

        let res = parse(t.timer_fired(delay));
        assert_eq!(res["state"]["value"], serde_json::json!(2.0));
        assert_eq!(res["schedule"][0]["delayMs"], serde_json::json!(80));
        assert!(ids(&res, "cancel").is_empty());

        // The delay timer is spent; a duplicate fire changes nothing.
        let res = parse(t.timer_fired(delay));
        assert_eq!(res["changed"], Value::Bool(false));
    }

    #[test]
    fn release_cancels_and_detaches() {
        let mut t = tile("fan", "");
        let down = parse(t.pointer_down(4.0, 128.0, false, true));
        let timer = down["schedule"][0]["id"].as_u64().unwrap();
        let listener = ids(&down, "attach");

        let res = parse(t.pointer_up(false, false, true));
        assert_eq!(ids(&res, "cancel"), vec![timer]);
        assert_eq!(ids(&res, "detach"), listener);
        assert_eq!(res["state"]["label"], Value::from("Medium"));
        assert_eq!(res["state"]["pressed"], Value::Bool(false));
    }

    #[test]
    fn surface_release_ends_press() {
        let mut t = tile("plain", "{}");
        let down = parse(t.zone_press_start("up", None));
        let listener = ids(&down, "attach")[0];
        let res = parse(t.surface_release(listener as f64));
        assert_eq!(res["events"][0]["action"], Value::from("end"));
        assert_eq!(ids(&res, "detach"), vec![listener]);
    }

    #[test]
    fn switch_toggles_anywhere() {
        let mut t = tile("switch", "{}");
        t.pointer_down(2.0, 128.0, true, true);
        let res = parse(t.pointer_up(true, false, true));
        assert_eq!(res["state"]["label"], Value::from("ON"));
        assert_eq!(parse(t.snapshot())["changed"], Value::Bool(false));
    }

    #[test]
    fn teardown_releases_everything() {
        let mut t = tile("dimmer", "{}");
        t.zone_press_start("down", Some(100.0));
        let res = parse(t.teardown());
        assert_eq!(ids(&res, "cancel").len(), 1);
        assert_eq!(ids(&res, "detach").len(), 1);
        assert_eq!(res["state"]["pressed"], Value::Bool(false));
    }

    #[test]
    fn bad_input_is_rejected_at_construction() {
        let queue = Rc::new(HostQueue::new());
        assert!(build_tile("toaster", "{}", &queue).is_err());
        assert!(build_tile("dimmer", "{not json", &queue).is_err());
        assert!(build_tile("dimmer", r#"{"minValue": "low"}"#, &queue).is_err());
    }

    #[test]
    fn unknown_zone_is_ignored() {
        let mut t = tile("plain", "");
        let res = parse(t.zone_press_start("sideways", None));
        assert_eq!(res["changed"], Value::Bool(false));
        assert!(ids(&res, "schedule").is_empty());
    }

    #[test]
    fn unknown_zone_logs_a_warning() {
        let mut t = tile("plain", "");
        let lines = logged(|| {
            t.zone_press_end("middle");
        });
        assert!(
            lines
                .iter()
                .any(|(level, msg)| *level == log::Level::Warn && msg.contains("\"middle\"")),
            "{lines:?}"
        );
    }

    #[test]
    fn rejected_config_is_logged() {
        let queue = Rc::new(HostQueue::new());
        let lines = logged(|| {
            assert!(build_tile("fan", r#"{"on": "yes"}"#, &queue).is_err());
        });
        assert!(
            lines
                .iter()
                .any(|(level, msg)| *level == log::Level::Debug && msg.contains("rejected")),
            "{lines:?}"
        );
    }

    #[test]
    fn toggle_hold_requests_no_timers() {
        let mut t = tile("switch", "{}");
        let res = parse(t.pointer_down(64.0, 128.0, false, true));
        assert_eq!(res["state"]["on"], Value::Bool(true));
        assert!(ids(&res, "schedule").is_empty());
        assert_eq!(ids(&res, "attach").len(), 1);
    }
}
