//! Change subscriptions
//!
//! [`ObserverRegistry`] holds callbacks fired after every state change.
//! [`Subscription`] guards release their callback when dropped.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

/// What kind of transition happened
///
/// Observers re-read the editor state; the kind is only a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A mutation was applied
    Edited,
    /// Cursor moved back
    Undo,
    /// Cursor moved forward
    Redo,
    /// Cursor jumped to an arbitrary entry
    Jump,
    /// Whole state replaced from a snapshot
    Replaced,
}

type Callback = Arc<dyn Fn(ChangeKind) + Send + Sync>;

#[derive(Default)]
struct Slots {
    next_id: u64,
    callbacks: Vec<(u64, Callback)>,
}

/// Registry of change callbacks
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    slots: Arc<Mutex<Slots>>,
}

impl ObserverRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; it stays active while the guard lives
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(ChangeKind) + Send + Sync + 'static,
    {
        let mut slots = self.slots.lock();
        let id = slots.next_id;
        slots.next_id += 1;
        slots.callbacks.push((id, Arc::new(callback)));
        Subscription {
            id,
            slots: Arc::downgrade(&self.slots),
        }
    }

    /// Call every callback in subscription order
    ///
    /// The lock is released before callbacks run, so a callback may
    /// subscribe or drop guards.
    pub fn notify(&self, kind: ChangeKind) {
        let callbacks: Vec<Callback> = self
            .slots
            .lock()
            .callbacks
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(kind);
        }
    }

    /// Number of active subscriptions
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().callbacks.len()
    }

    /// Check if no callback is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every callback; outstanding guards become no-ops
    pub fn clear(&self) {
        self.slots.lock().callbacks.clear();
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("subscriptions", &self.len())
            .finish()
    }
}

/// Active subscription; unsubscribes on drop
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    slots: Weak<Mutex<Slots>>,
}

impl Subscription {
    /// Unsubscribe now
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            slots.lock().callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(registry: &ObserverRegistry) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let sub = registry.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (count, sub)
    }

    #[test]
    fn notify_reaches_subscribers() {
        let registry = ObserverRegistry::new();
        let (count, _sub) = counter(&registry);
        registry.notify(ChangeKind::Edited);
        registry.notify(ChangeKind::Undo);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dropping_guard_unsubscribes() {
        let registry = ObserverRegistry::new();
        let (count, sub) = counter(&registry);
        assert_eq!(registry.len(), 1);
        sub.cancel();
        assert!(registry.is_empty());
        registry.notify(ChangeKind::Edited);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn guard_outliving_registry_is_harmless() {
        let registry = ObserverRegistry::new();
        let (_count, sub) = counter(&registry);
        drop(registry);
        drop(sub);
    }

    #[test]
    fn callback_receives_kind() {
        let registry = ObserverRegistry::new();
        let last = Arc::new(Mutex::new(None));
        let seen = Arc::clone(&last);
        let _sub = registry.subscribe(move |kind| *seen.lock() = Some(kind));
        registry.notify(ChangeKind::Replaced);
        assert_eq!(*last.lock(), Some(ChangeKind::Replaced));
    }
}
