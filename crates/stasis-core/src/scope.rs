use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Ownership boundary for a view's resources.
///
/// Anything registered with [`Scope::add_disposer`] is released when the
/// scope is disposed, whichever path leads there.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    disposed: Cell<bool>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                disposers: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Registers cleanup. On an already disposed scope it runs right away.
    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        if self.inner.disposed.get() {
            disposer();
            return;
        }
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Runs the disposers in registration order. Later calls do nothing.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        self.inner.release();
    }
}

impl ScopeInner {
    fn release(&self) {
        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("disposed", &self.inner.disposed.get())
            .field("disposers", &self.inner.disposers.borrow().len())
            .finish()
    }
}

// The last handle going away counts as teardown.
impl Drop for ScopeInner {
    fn drop(&mut self) {
        if !self.disposed.replace(true) {
            self.release();
        }
    }
}
