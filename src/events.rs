//! Document-level pointer events
//!
//! [`EventScope`] plays the role of the page document: components subscribe
//! to pointer events for as long as they are mounted and get back a
//! [`Subscription`] guard. Dropping the guard removes the listener.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

/// Cell position on the rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Bounding region of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right and bottom edges are exclusive
    pub fn contains(&self, point: Point) -> bool {
        let right = u32::from(self.x) + u32::from(self.width);
        let bottom = u32::from(self.y) + u32::from(self.height);
        point.x >= self.x
            && u32::from(point.x) < right
            && point.y >= self.y
            && u32::from(point.y) < bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down(Point),
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down(point) => *point,
        }
    }
}

type Listener = Box<dyn FnMut(&PointerEvent)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
    dispatching: bool,
    /// Subscriptions dropped while their listener was taken out for dispatch
    cancelled: Vec<u64>,
}

/// Pointer listener registry shared by all components of one page
#[derive(Clone, Default)]
pub struct EventScope {
    registry: Rc<RefCell<Registry>>,
}

impl EventScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every pointer event dispatched on this scope
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&PointerEvent) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, Box::new(listener));
        trace!(listener_id = id, "Pointer listener added");

        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver an event to every live listener, in subscription order
    pub fn dispatch(&self, event: &PointerEvent) {
        let mut active = {
            let mut registry = self.registry.borrow_mut();
            registry.dispatching = true;
            std::mem::take(&mut registry.listeners)
        };

        // No borrow is held here, so listeners may subscribe or drop guards.
        for listener in active.values_mut() {
            listener(event);
        }

        let mut registry = self.registry.borrow_mut();
        registry.dispatching = false;
        for id in std::mem::take(&mut registry.cancelled) {
            active.remove(&id);
        }
        active.append(&mut registry.listeners);
        registry.listeners = active;
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

impl fmt::Debug for EventScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventScope")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Guard for a registered listener; the listener is removed on drop
#[must_use = "dropping the subscription removes the listener immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.borrow_mut();
        if registry.listeners.remove(&self.id).is_none() && registry.dispatching {
            registry.cancelled.push(self.id);
        }
        trace!(listener_id = self.id, "Pointer listener removed");
    }
}
