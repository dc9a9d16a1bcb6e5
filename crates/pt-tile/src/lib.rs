//! Three-zone press tiles.
//!
//! A [`Tile`] composes three [`pt_core::PressRepeater`]s (up, toggle, down)
//! over one shared value and delegates value semantics to an injected
//! [`TilePolicy`]: [`Dimmer`], [`Fan`], [`Switch`], or caller [`Hooks`].

pub mod policy;
pub mod tile;
pub mod zone;

pub use policy::{Dimmer, Fan, FanLevel, Hooks, StepDirection, Switch, TilePolicy, ValueRange};
pub use tile::{Tile, TileConfig, TileEvent, TileEvents, TileSnapshot, TileState, ZoneAction};
pub use zone::{Zone, ZoneLayout};
