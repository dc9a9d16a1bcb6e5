//! Timer seam.
//!
//! The repeater never touches a real event loop. It asks a [`Scheduler`]
//! for one-shot timers and receives their fires back through
//! `PressRepeater::handle_timer`. Hosts implement the trait on top of
//! whatever they have (`setTimeout`, an embassy timer, a game loop); tests
//! use [`VirtualClock`] and step time explicitly.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Opaque identifier of one scheduled timer.
///
/// Unique for the lifetime of the process, so a stale fire can never be
/// mistaken for a live timer of another repeater.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        TimerId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value (what a host hands back on fire).
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Rebuild an id from the raw value a host reported.
    pub fn from_raw(raw: u64) -> Self {
        TimerId(raw)
    }
}

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Schedule-after / cancel, the only two timer operations the core needs.
///
/// Methods take `&self`: schedulers are shared between the zones of a tile
/// behind an `Rc` and use interior mutability.
pub trait Scheduler {
    /// Arrange for `id` to be delivered back once `delay` has elapsed.
    fn schedule(&self, delay: Duration) -> TimerId;

    /// Forget a pending timer. Cancelling an unknown or already fired id
    /// is a no-op.
    fn cancel(&self, id: TimerId);
}

/// Owned handle to a pending timer. Dropping an armed handle cancels it.
pub struct TimerHandle {
    id: TimerId,
    scheduler: Rc<dyn Scheduler>,
    armed: bool,
}

impl TimerHandle {
    /// Schedule a timer and take ownership of it.
    pub fn schedule(scheduler: &Rc<dyn Scheduler>, delay: Duration) -> Self {
        let id = scheduler.schedule(delay);
        Self {
            id,
            scheduler: Rc::clone(scheduler),
            armed: true,
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Consume the handle after its timer was delivered; nothing is cancelled.
    pub fn fired(mut self) {
        self.armed = false;
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if self.armed {
            self.scheduler.cancel(self.id);
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.id)
            .field("armed", &self.armed)
            .finish()
    }
}

// ─── Virtual clock ───────────────────────────────────────────────────────

/// Deterministic scheduler driven by explicit time steps.
///
/// Timers due at the same instant fire in scheduling order.
#[derive(Default)]
pub struct VirtualClock {
    now: Cell<Duration>,
    queue: RefCell<BTreeSet<(Duration, TimerId)>>,
    deadlines: RefCell<HashMap<TimerId, Duration>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for the common `Rc<VirtualClock>` + `Rc<dyn Scheduler>` pair.
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Current virtual time since the clock was created.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of timers still waiting to fire.
    pub fn pending(&self) -> usize {
        self.deadlines.borrow().len()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.deadlines.borrow().contains_key(&id)
    }

    /// Deadline of the earliest pending timer, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.borrow().first().map(|(at, _)| *at)
    }

    /// Advance time by `by`, delivering every timer that falls due.
    ///
    /// Returns the number of timers fired.
    pub fn advance(&self, by: Duration, on_fire: impl FnMut(TimerId)) -> usize {
        self.run_until(self.now() + by, on_fire)
    }

    /// Advance time to the absolute instant `target`.
    ///
    /// `now` is set to each timer's deadline before `on_fire` runs, so
    /// timers scheduled from inside `on_fire` are measured from the fire
    /// time and still delivered if they land before `target`.
    pub fn run_until(&self, target: Duration, mut on_fire: impl FnMut(TimerId)) -> usize {
        let mut fired = 0;
        while let Some(id) = self.pop_due(target) {
            on_fire(id);
            fired += 1;
        }
        if target > self.now.get() {
            self.now.set(target);
        }
        fired
    }

    fn pop_due(&self, target: Duration) -> Option<TimerId> {
        let mut queue = self.queue.borrow_mut();
        let &(at, id) = queue.first()?;
        if at > target {
            return None;
        }
        queue.remove(&(at, id));
        self.deadlines.borrow_mut().remove(&id);
        self.now.set(at);
        Some(id)
    }
}

impl Scheduler for VirtualClock {
    fn schedule(&self, delay: Duration) -> TimerId {
        let id = TimerId::next();
        let at = self.now.get() + delay;
        self.queue.borrow_mut().insert((at, id));
        self.deadlines.borrow_mut().insert(id, at);
        id
    }

    fn cancel(&self, id: TimerId) {
        if let Some(at) = self.deadlines.borrow_mut().remove(&id) {
            self.queue.borrow_mut().remove(&(at, id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn timer_ids_are_unique() {
        let a = TimerId::next();
        let b = TimerId::next();
        assert_ne!(a, b);
        assert_eq!(TimerId::from_raw(a.as_u64()), a);
    }

    #[test]
    fn fires_in_deadline_order() {
        let clock = VirtualClock::new();
        let late = clock.schedule(ms(300));
        let early = clock.schedule(ms(100));
        let mut seen = Vec::new();
        let fired = clock.advance(ms(500), |id| seen.push((id, clock.now())));
        assert_eq!(fired, 2);
        assert_eq!(seen, vec![(early, ms(100)), (late, ms(300))]);
        assert_eq!(clock.now(), ms(500));
    }

    #[test]
    fn equal_deadlines_fire_in_schedule_order() {
        let clock = VirtualClock::new();
        let first = clock.schedule(ms(50));
        let second = clock.schedule(ms(50));
        let mut seen = Vec::new();
        clock.advance(ms(50), |id| seen.push(id));
        assert_eq!(seen, vec![first, second]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let clock = VirtualClock::new();
        let id = clock.schedule(ms(10));
        clock.cancel(id);
        assert!(!clock.is_scheduled(id));
        assert_eq!(clock.advance(ms(100), |_| panic!("cancelled timer fired")), 0);
        // Cancelling again is harmless.
        clock.cancel(id);
    }

    #[test]
    fn timers_scheduled_during_fire_are_honoured() {
        let clock = VirtualClock::new();
        clock.schedule(ms(10));
        let mut times = Vec::new();
        clock.advance(ms(35), |_| {
            times.push(clock.now());
            clock.schedule(ms(10));
        });
        assert_eq!(times, vec![ms(10), ms(20), ms(30)]);
        assert_eq!(clock.pending(), 1);
        assert_eq!(clock.next_deadline(), Some(ms(40)));
    }

    #[test]
    fn dropping_handle_cancels_timer() {
        let clock = VirtualClock::shared();
        let scheduler: Rc<dyn Scheduler> = clock.clone();
        let handle = TimerHandle::schedule(&scheduler, ms(10));
        let id = handle.id();
        assert!(clock.is_scheduled(id));
        drop(handle);
        assert!(!clock.is_scheduled(id));
    }

    #[test]
    fn fired_handle_does_not_cancel_a_later_timer() {
        let clock = VirtualClock::shared();
        let scheduler: Rc<dyn Scheduler> = clock.clone();
        let handle = TimerHandle::schedule(&scheduler, ms(10));
        clock.advance(ms(10), |_| {});
        handle.fired();
        assert_eq!(clock.pending(), 0);
    }
}
