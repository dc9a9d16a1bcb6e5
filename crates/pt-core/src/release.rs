//! Surface-wide release listener seam.
//!
//! A mouse release is delivered to whatever element is under the pointer,
//! not to the element that saw the press. While a press is live the
//! repeater therefore listens for releases on the whole input surface
//! (the document, the window, the touch panel). The listener is an owned
//! [`ReleaseListener`]; dropping it detaches, so every exit path of a press
//! gives the listener back.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of one attached surface listener.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        ListenerId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        ListenerId(raw)
    }
}

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// The top-level input surface a release listener is attached to.
pub trait ReleaseSurface {
    /// Start listening for releases anywhere on the surface.
    fn attach(&self) -> ListenerId;

    /// Stop listening. Unknown ids are ignored.
    fn detach(&self, id: ListenerId);
}

/// Owned registration on a [`ReleaseSurface`]; detaches on drop.
pub struct ReleaseListener {
    id: ListenerId,
    surface: Rc<dyn ReleaseSurface>,
}

impl ReleaseListener {
    pub fn attach(surface: &Rc<dyn ReleaseSurface>) -> Self {
        Self {
            id: surface.attach(),
            surface: Rc::clone(surface),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for ReleaseListener {
    fn drop(&mut self) {
        self.surface.detach(self.id);
    }
}

impl fmt::Debug for ReleaseListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReleaseListener").field(&self.id).finish()
    }
}

/// In-memory surface for tests and headless hosts.
#[derive(Default)]
pub struct VirtualSurface {
    listeners: RefCell<BTreeSet<ListenerId>>,
}

impl VirtualSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Number of listeners currently attached.
    pub fn attached(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_attached(&self, id: ListenerId) -> bool {
        self.listeners.borrow().contains(&id)
    }

    /// Simulate a release somewhere on the surface: returns every listener
    /// that would be notified, in attach order.
    pub fn release(&self) -> Vec<ListenerId> {
        self.listeners.borrow().iter().copied().collect()
    }
}

impl ReleaseSurface for VirtualSurface {
    fn attach(&self) -> ListenerId {
        let id = ListenerId::next();
        self.listeners.borrow_mut().insert(id);
        id
    }

    fn detach(&self, id: ListenerId) {
        self.listeners.borrow_mut().remove(&id);
    }
}
