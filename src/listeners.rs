//! Scoped registration of window-level listeners.
//!
//! Keyboard and blur handling is process-wide while a widget is mounted.
//! Every registration hands back a [`Subscription`]; dropping it removes the
//! handler, so an unmounted widget can never keep receiving events.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::keybindings::Key;

/// Window events the widget listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    KeyDown(Key),
    KeyUp(Key),
    Blur,
}

type Handler<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Registry<E> {
    next_id: u64,
    handlers: Vec<(u64, Handler<E>)>,
}

/// A dispatcher standing in for the window event target.
pub struct EventHub<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E: 'static> EventHub<E> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Register a handler until the returned subscription is dropped.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
    {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            let handler: Handler<E> = Rc::new(RefCell::new(handler));
            registry.handlers.push((id, handler));
            id
        };
        let registry: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.borrow_mut().handlers.retain(|(h, _)| *h != id);
            }
        })
    }

    /// Deliver an event to every registered handler.
    pub fn dispatch(&self, event: &E) {
        // Snapshot so handlers may subscribe or unsubscribe while running
        let handlers: Vec<Handler<E>> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            if let Ok(mut f) = handler.try_borrow_mut() {
                (&mut *f)(event);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }
}

impl<E: 'static> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for a registered listener. Releases it on drop.
#[must_use = "dropping a subscription immediately unregisters the listener"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a release action.
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Release now instead of at drop.
    pub fn cancel(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_dropping_subscription_unregisters() {
        let hub: EventHub<WindowEvent> = EventHub::new();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let sub = hub.subscribe(move |_| seen.set(seen.get() + 1));

        hub.dispatch(&WindowEvent::Blur);
        assert_eq!(count.get(), 1);
        assert_eq!(hub.listener_count(), 1);

        drop(sub);
        hub.dispatch(&WindowEvent::Blur);
        assert_eq!(count.get(), 1);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_hub_is_harmless() {
        let hub: EventHub<WindowEvent> = EventHub::new();
        let sub = hub.subscribe(|_| {});
        drop(hub);
        sub.cancel();
    }
}
