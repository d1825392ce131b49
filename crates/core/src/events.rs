//! Session change notifications
//!
//! Views that depend on the session (current user, cart badge, staff menu)
//! subscribe here and update their own state when the session changes.

use crate::session::UserProfile;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A change to the stored session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    TokenRefreshed,
    ProfileUpdated(UserProfile),
    SignedOut,
}

type Listener = Rc<dyn Fn(&SessionEvent)>;

/// Handle returned by [`SessionEvents::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Listener registry shared by every clone of a token store
#[derive(Clone, Default)]
pub struct SessionEvents {
    listeners: Rc<RefCell<Vec<(SubscriptionId, Listener)>>>,
    next_id: Rc<Cell<u64>>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it stays registered until unsubscribed
    pub fn subscribe(&self, listener: impl Fn(&SessionEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().retain(|(existing, _)| *existing != id);
    }

    /// Deliver an event to every listener registered at the time of the call
    pub fn emit(&self, event: &SessionEvent) {
        // Snapshot so listeners may subscribe or unsubscribe while being notified.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}
