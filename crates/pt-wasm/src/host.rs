//! Command queue for a JavaScript host.
//!
//! The browser owns the real timers (`setTimeout`) and the document-level
//! release listeners. [`HostQueue`] implements both core seams by recording
//! what the tile asked for; each bridge call drains the queue into a
//! [`HostResponse`] that the host replays.

use pt_core::{ListenerId, ReleaseSurface, Scheduler, TimerId};
use pt_tile::{TileEvent, TileSnapshot};
use serde::Serialize;
use std::cell::RefCell;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub id: u64,
    pub delay_ms: u64,
}

/// Host work accumulated since the last drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostCommands {
    pub schedule: Vec<ScheduleRequest>,
    pub cancel: Vec<u64>,
    pub attach: Vec<u64>,
    pub detach: Vec<u64>,
}

impl HostCommands {
    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
            && self.cancel.is_empty()
            && self.attach.is_empty()
            && self.detach.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct HostQueue {
    commands: RefCell<HostCommands>,
}

impl HostQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything recorded so far.
    ///
    /// A timer scheduled and cancelled before the drain never reaches the
    /// host; neither does a listener attached and detached in the same call.
    pub fn drain(&self) -> HostCommands {
        let mut commands = self.commands.take();

        let scheduled: Vec<u64> = commands.schedule.iter().map(|r| r.id).collect();
        let cancelled = std::mem::take(&mut commands.cancel);
        commands.schedule.retain(|r| !cancelled.contains(&r.id));
        commands.cancel = cancelled
            .into_iter()
            .filter(|id| !scheduled.contains(id))
            .collect();

        let attached = std::mem::take(&mut commands.attach);
        let detached = std::mem::take(&mut commands.detach);
        commands.attach = attached
            .iter()
            .copied()
            .filter(|id| !detached.contains(id))
            .collect();
        commands.detach = detached
            .into_iter()
            .filter(|id| !attached.contains(id))
            .collect();

        commands
    }
}

impl Scheduler for HostQueue {
    fn schedule(&self, delay: Duration) -> TimerId {
        let id = TimerId::next();
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.commands.borrow_mut().schedule.push(ScheduleRequest {
            id: id.as_u64(),
            delay_ms,
        });
        id
    }

    fn cancel(&self, id: TimerId) {
        self.commands.borrow_mut().cancel.push(id.as_u64());
    }
}

impl ReleaseSurface for HostQueue {
    fn attach(&self) -> ListenerId {
        let id = ListenerId::next();
        self.commands.borrow_mut().attach.push(id.as_u64());
        id
    }

    fn detach(&self, id: ListenerId) {
        self.commands.borrow_mut().detach.push(id.as_u64());
    }
}

/// Reply to every bridge call, serialized to JSON for the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostResponse {
    /// The snapshot differs from the one before the call.
    pub changed: bool,
    pub prevent_default: bool,
    pub events: Vec<TileEvent>,
    pub state: TileSnapshot,
    pub schedule: Vec<ScheduleRequest>,
    pub cancel: Vec<u64>,
    pub attach: Vec<u64>,
    pub detach: Vec<u64>,
}

impl HostResponse {
    pub fn new(
        before: &TileSnapshot,
        state: TileSnapshot,
        events: Vec<TileEvent>,
        commands: HostCommands,
    ) -> Self {
        Self {
            changed: *before != state,
            prevent_default: false,
            events,
            state,
            schedule: commands.schedule,
            cancel: commands.cancel,
            attach: commands.attach,
            detach: commands.detach,
        }
    }

    pub fn prevent_default(mut self, prevent: bool) -> Self {
        self.prevent_default = prevent;
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
