//! Keyed cache of suspended views.
//!
//! Showing a key deactivates whatever was on screen and re-activates the
//! cached view for that key (or builds, mounts and activates a new one).
//! Each entry gets its own [`Scope`], disposed when the entry is evicted, so
//! anything registered under it is released even if the view never comes
//! back.

use std::fmt::Debug;
use std::num::NonZeroUsize;

use stasis_core::Scope;

use crate::restoration::Lifecycle;

struct Entry<K> {
    key: K,
    view: Box<dyn Lifecycle>,
    /// Disposed when the entry is evicted.
    scope: Scope,
}

impl<K> Entry<K> {
    fn unmount(self) {
        self.view.on_unmounted();
        self.scope.dispose();
    }
}

pub struct KeepAlive<K: Clone + PartialEq + Debug> {
    // Least recently shown first; the current entry, if any, is last.
    entries: Vec<Entry<K>>,
    current: Option<K>,
    max: Option<NonZeroUsize>,
}

impl<K: Clone + PartialEq + Debug> Default for KeepAlive<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + PartialEq + Debug> KeepAlive<K> {
    /// Unbounded cache.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            max: None,
        }
    }

    /// Keeps at most `max` views; the least recently shown one is evicted.
    pub fn with_max(max: NonZeroUsize) -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            max: Some(max),
        }
    }

    pub fn current(&self) -> Option<&K> {
        self.current.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Least recently shown first.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|e| &e.key)
    }

    /// Brings `key` to the foreground. `factory` only runs on a cache miss and
    /// receives the new entry's scope to register cleanups with.
    pub fn show(&mut self, key: K, factory: impl FnOnce(&Scope) -> Box<dyn Lifecycle>) {
        if self.current.as_ref() == Some(&key) {
            return;
        }
        self.deactivate_current();

        match self.position(&key) {
            Some(idx) => {
                let entry = self.entries.remove(idx);
                self.entries.push(entry);
                log::debug!("keep-alive: resuming {key:?}");
            }
            None => {
                let scope = Scope::new();
                let view = factory(&scope);
                view.on_mounted();
                self.entries.push(Entry {
                    key: key.clone(),
                    view,
                    scope,
                });
                log::debug!("keep-alive: created {key:?}");
            }
        }

        if let Some(entry) = self.entries.last() {
            entry.view.on_activated();
        }
        self.current = Some(key);
        self.prune();
    }

    /// Unmounts one entry. False if `key` was not cached.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(idx) = self.position(key) else {
            return false;
        };
        if self.current.as_ref() == Some(key) {
            self.deactivate_current();
        }
        self.entries.remove(idx).unmount();
        log::debug!("keep-alive: removed {key:?}");
        true
    }

    /// Unmounts everything, oldest first.
    pub fn clear(&mut self) {
        self.deactivate_current();
        for entry in std::mem::take(&mut self.entries) {
            entry.unmount();
        }
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|e| &e.key == key)
    }

    fn deactivate_current(&mut self) {
        let Some(current) = self.current.take() else {
            return;
        };
        if let Some(idx) = self.position(&current) {
            self.entries[idx].view.on_deactivated();
        }
    }

    fn prune(&mut self) {
        let Some(max) = self.max else {
            return;
        };
        while self.entries.len() > max.get() {
            let Some(idx) = self
                .entries
                .iter()
                .position(|e| Some(&e.key) != self.current.as_ref())
            else {
                break;
            };
            let entry = self.entries.remove(idx);
            log::debug!("keep-alive: evicting {:?}", entry.key);
            entry.unmount();
        }
    }
}

impl<K: Clone + PartialEq + Debug> Drop for KeepAlive<K> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Lifecycle for Recorder {
        fn on_mounted(&self) {
            self.log.borrow_mut().push(format!("{}:mounted", self.name));
        }
        fn on_activated(&self) {
            self.log.borrow_mut().push(format!("{}:activated", self.name));
        }
        fn on_deactivated(&self) {
            self.log.borrow_mut().push(format!("{}:deactivated", self.name));
        }
        fn on_unmounted(&self) {
            self.log.borrow_mut().push(format!("{}:unmounted", self.name));
        }
    }

    fn recorder(name: &'static str, log: &Log) -> impl FnOnce(&Scope) -> Box<dyn Lifecycle> {
        let log = log.clone();
        move |_: &Scope| -> Box<dyn Lifecycle> { Box::new(Recorder { name, log }) }
    }

    fn drain(log: &Log) -> String {
        std::mem::take(&mut *log.borrow_mut()).join(" ")
    }

    #[test]
    fn switching_suspends_and_resumes_cached_views() {
        let log: Log = Rc::default();
        let mut cache = KeepAlive::new();

        cache.show("list", recorder("list", &log));
        assert_eq!(drain(&log), "list:mounted list:activated");

        cache.show("detail", recorder("detail", &log));
        assert_eq!(
            drain(&log),
            "list:deactivated detail:mounted detail:activated"
        );

        cache.show("list", |_| unreachable!("cached entry must be reused"));
        assert_eq!(drain(&log), "detail:deactivated list:activated");

        // Re-showing the current key does nothing.
        cache.show("list", |_| unreachable!());
        assert_eq!(drain(&log), "");
        assert_eq!(cache.current(), Some(&"list"));
        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec!["detail", "list"]);
    }

    #[test]
    fn max_evicts_least_recently_shown() {
        let log: Log = Rc::default();
        let mut cache = KeepAlive::with_max(NonZeroUsize::new(2).unwrap());

        cache.show("a", recorder("a", &log));
        cache.show("b", recorder("b", &log));
        cache.show("a", recorder("a", &log));
        drain(&log);

        cache.show("c", recorder("c", &log));
        assert_eq!(
            drain(&log),
            "a:deactivated c:mounted c:activated b:unmounted"
        );
        assert!(!cache.contains(&"b"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn remove_and_drop_unmount_and_dispose_scopes() {
        let log: Log = Rc::default();
        let disposed = Rc::new(RefCell::new(Vec::new()));
        let mut cache = KeepAlive::new();

        for name in ["x", "y"] {
            let log = log.clone();
            let disposed = disposed.clone();
            cache.show(name, move |scope: &Scope| {
                scope.add_disposer(move || disposed.borrow_mut().push(name));
                Box::new(Recorder { name, log }) as Box<dyn Lifecycle>
            });
        }
        drain(&log);

        assert!(cache.remove(&"y"));
        assert!(!cache.remove(&"y"));
        assert_eq!(drain(&log), "y:deactivated y:unmounted");
        assert_eq!(cache.current(), None);

        drop(cache);
        assert_eq!(drain(&log), "x:unmounted");
        assert_eq!(*disposed.borrow(), vec!["y", "x"]);
    }
}
