use std::cell::RefCell;
use std::rc::Rc;

use crate::listeners::{ListenerId, Listeners, emit_shared};

pub type SubId = ListenerId;

/// Cloneable observable value. Every clone shares the same cell and
/// subscriber list.
pub struct Signal<T: 'static>(Rc<Inner<T>>);

struct Inner<T: 'static> {
    value: RefCell<T>,
    subs: RefCell<Listeners<T>>,
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Default + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(Inner {
            value: RefCell::new(value),
            subs: RefCell::new(Listeners::new()),
        }))
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.value.borrow().clone()
    }

    pub fn set(&self, v: T)
    where
        T: Clone,
    {
        *self.0.value.borrow_mut() = v;
        self.notify();
    }

    pub fn update<F: FnOnce(&mut T)>(&self, f: F)
    where
        T: Clone,
    {
        f(&mut self.0.value.borrow_mut());
        self.notify();
    }

    /// Subscribers see a copy of the new value, taken after the write, and
    /// may freely read or write this signal again.
    fn notify(&self)
    where
        T: Clone,
    {
        if self.0.subs.borrow().is_empty() {
            return;
        }
        let value = self.get();
        emit_shared(&self.0.subs, &value);
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        self.0.subs.borrow_mut().add(f)
    }

    pub fn unsubscribe(&self, id: SubId) -> bool {
        self.0.subs.borrow_mut().remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.subs.borrow().len()
    }
}

pub fn signal<T>(t: T) -> Signal<T> {
    Signal::new(t)
}
