//! # Scroll restoration
//!
//! Views inside a [`KeepAlive`](crate::keep_alive::KeepAlive) are suspended
//! rather than destroyed. Their scroll containers survive, but the host
//! usually re-lays them out on the way back, and for a moment the content is
//! too short to hold the old offset. [`ScrollRestoration`] remembers where
//! the user was and puts them back once the layout can take it.
//!
//! Moving parts, leaf first:
//!
//! - [`ScrollState`]: saved offset plus `active` / `restored` flags.
//! - [`ScrollTracker`]: records offset changes while active and visible.
//! - [`LayoutWatcher`]: retries on every size change until restored.
//! - [`RestorationEngine`]: one attempt: wait for extent, write, verify.
//! - [`ScrollRestoration`]: maps the [`Lifecycle`] hooks onto the above and
//!   arms a fallback timer for layouts that settle without a resize.
//!
//! ```rust
//! use stasis_core::*;
//! use stasis_ui::restoration::*;
//! use stasis_ui::scroll::*;
//!
//! let events = EventLoop::with_manual_clock(ManualClock::default());
//! let vp = ScrollViewport::shared(Size::new(300.0, 200.0));
//! vp.set_content_size(Size::new(300.0, 2000.0));
//!
//! let slot = viewport_slot();
//! let handle: ViewportRef = vp.clone();
//! slot.set(Some(handle));
//!
//! let restoration = ScrollRestoration::new(slot, events.clone());
//! restoration.on_mounted();
//! restoration.on_activated();
//! events.run_until_idle().unwrap();
//!
//! vp.user_scroll_to(Vec2::new(0.0, 640.0));
//! restoration.on_deactivated();
//!
//! // The host re-renders the suspended view from scratch.
//! vp.set_content_size(Size::ZERO);
//! restoration.on_activated();
//! events.run_until_idle().unwrap();
//! assert_eq!(vp.scroll_offset().y, 0.0);
//!
//! vp.set_content_size(Size::new(300.0, 2000.0));
//! assert_eq!(vp.scroll_offset().y, 640.0);
//! ```

pub mod config;
pub mod controller;
pub mod engine;
pub mod state;
pub mod tracker;
pub mod watcher;

pub use config::RestorationConfig;
pub use controller::{Lifecycle, Phase, ScrollRestoration};
pub use engine::{Axes, RestorationEngine, RestoreOutcome};
pub use state::{ScrollSnapshot, ScrollState};
pub use tracker::ScrollTracker;
pub use watcher::{LayoutNotifier, LayoutWatcher, ResizeNotifier};
