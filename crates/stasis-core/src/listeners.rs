use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

new_key_type! {
    /// Generational handle to a registered listener.
    ///
    /// Removing with a stale id is a no-op; it can never hit a listener that
    /// was registered later in the same slot.
    pub struct ListenerId;
}

type Callback<E> = Rc<dyn Fn(&E)>;

/// Registry of callbacks for one event source.
pub struct Listeners<E: 'static> {
    callbacks: SlotMap<ListenerId, Callback<E>>,
}

impl<E: 'static> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Listeners<E> {
    pub fn new() -> Self {
        Self {
            callbacks: SlotMap::with_key(),
        }
    }

    pub fn add(&mut self, f: impl Fn(&E) + 'static) -> ListenerId {
        self.callbacks.insert(Rc::new(f))
    }

    /// Returns false if the id was already removed.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.callbacks.remove(id).is_some()
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.callbacks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// Copies the current callbacks out so the caller can drop its borrow of
    /// the registry before invoking them.
    pub fn snapshot(&self) -> SmallVec<[Callback<E>; 4]> {
        self.callbacks.values().cloned().collect()
    }

    /// Calls every listener registered at the time of the call.
    ///
    /// Only safe when the registry is not behind a `RefCell` that a callback
    /// could re-borrow; shared owners should use [`Listeners::snapshot`].
    pub fn emit(&self, event: &E) {
        for cb in self.snapshot() {
            cb(event);
        }
    }
}

/// Emits `event` to a registry living behind a `RefCell` without holding the
/// borrow while callbacks run.
pub fn emit_shared<E: 'static>(listeners: &std::cell::RefCell<Listeners<E>>, event: &E) {
    let callbacks = listeners.borrow().snapshot();
    for cb in callbacks {
        cb(event);
    }
}
