//! # Signals, scopes and the event loop
//!
//! `stasis-core` is the small single-threaded runtime the Stasis widgets sit
//! on. There are four pieces:
//!
//! - `Signal<T>`: observable value with explicit subscribe/unsubscribe.
//! - `Listeners<E>`: the callback registry behind signals and widget events.
//! - `Scope` / `Dispose`: ownership of cleanups for a view's lifetime.
//! - `EventLoop`: `next_tick` and one-shot timers over a pluggable `Clock`.
//!
//! ## Signals
//!
//! ```rust
//! use stasis_core::*;
//! use std::{cell::Cell, rc::Rc};
//!
//! let count = signal(0);
//! let seen = Rc::new(Cell::new(0));
//!
//! let id = {
//!     let seen = seen.clone();
//!     count.subscribe(move |v| seen.set(*v))
//! };
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(seen.get(), 2);
//!
//! count.unsubscribe(id);
//! count.set(10);
//! assert_eq!(seen.get(), 2);
//! ```
//!
//! There is no implicit dependency tracking: whoever subscribes owns the
//! subscription and is expected to drop it when the owning view goes away.
//!
//! ## Scopes and cleanup
//!
//! ```rust
//! use stasis_core::*;
//! use std::{cell::Cell, rc::Rc};
//!
//! let released = Rc::new(Cell::new(0));
//! let scope = Scope::new();
//!
//! let guard = {
//!     let released = released.clone();
//!     Dispose::new(move || released.set(released.get() + 1))
//! };
//! let on_scope = guard.clone();
//! scope.add_disposer(move || on_scope.run());
//!
//! guard.run();
//! scope.dispose();
//! assert_eq!(released.get(), 1);
//! ```

pub mod clock;
pub mod effects;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod listeners;
pub mod scope;
pub mod signal;

pub use clock::*;
pub use effects::*;
pub use error::*;
pub use event_loop::*;
pub use geometry::*;
pub use listeners::*;
pub use scope::*;
pub use signal::*;
