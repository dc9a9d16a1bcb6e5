//! Press/hold/repeat input core.
//!
//! [`PressRepeater`] converts mouse and touch press transitions into an
//! accelerating "repeat while held" signal stream. Timers and the
//! surface-wide release listener are reached through the [`Scheduler`] and
//! [`ReleaseSurface`] seams, so the state machine runs unchanged in a
//! browser, on a device, or against a [`VirtualClock`] in tests.

pub mod config;
pub mod input;
pub mod release;
pub mod repeater;
pub mod scheduler;

pub use config::RepeatConfig;
pub use input::{PointerSource, PressInput, RawInput};
pub use release::{ListenerId, ReleaseListener, ReleaseSurface, VirtualSurface};
pub use repeater::{PressPhase, PressRepeater, PressSignal};
pub use scheduler::{Scheduler, TimerHandle, TimerId, VirtualClock};
