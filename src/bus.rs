//! Theme change fan-out.
//!
//! Subsystems never reference each other; they only learn about theme
//! changes through a [`ThemeBus`] handed to them at construction.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::theme::Theme;

type Listener = Rc<dyn Fn(Theme)>;

#[derive(Default)]
struct Registry {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener)>>,
}

impl Registry {
    fn is_registered(&self, id: u64) -> bool {
        self.listeners.borrow().iter().any(|(known, _)| *known == id)
    }
}

/// Observer registry for theme changes.
///
/// Cloning yields another handle onto the same registry.
#[derive(Clone, Default)]
pub struct ThemeBus {
    registry: Rc<Registry>,
}

impl ThemeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. It stays registered until the returned
    /// [`Subscription`] is cancelled or dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn(Theme) + 'static) -> Subscription {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);
        self.registry
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        Subscription {
            registry: Rc::downgrade(&self.registry),
            id,
            armed: true,
        }
    }

    /// Delivers `theme` to every listener, synchronously, in subscription
    /// order.
    ///
    /// Listeners subscribed during delivery first hear the next publish.
    /// Listeners cancelled during delivery are skipped if not yet reached.
    pub fn publish(&self, theme: Theme) {
        // Snapshot so listeners may (un)subscribe or publish re-entrantly.
        let listeners: Vec<(u64, Listener)> = self
            .registry
            .listeners
            .borrow()
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();
        for (id, listener) in listeners {
            if self.registry.is_registered(id) {
                listener(theme);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.registry.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ThemeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeBus")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Registration handle returned by [`ThemeBus::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<Registry>,
    id: u64,
    armed: bool,
}

impl Subscription {
    pub fn cancel(mut self) {
        self.unsubscribe();
    }

    /// Keeps the listener registered for the lifetime of the bus.
    pub fn detach(mut self) {
        self.armed = false;
    }

    fn unsubscribe(&mut self) {
        if !std::mem::take(&mut self.armed) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry
                .listeners
                .borrow_mut()
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
