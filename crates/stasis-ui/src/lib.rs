//! Scroll viewports, keep-alive caching and scroll restoration.
//!
//! - [`scroll`]: the [`Viewport`](scroll::Viewport) abstraction and the
//!   in-memory [`ScrollViewport`](scroll::ScrollViewport).
//! - [`keep_alive`]: a keyed cache that suspends views instead of
//!   destroying them and drives their lifecycle hooks.
//! - [`restoration`]: puts a suspended view's scroll offset back once it is
//!   shown again.

pub mod error;
pub mod keep_alive;
pub mod restoration;
pub mod scroll;

pub use error::ConfigError;
pub use keep_alive::KeepAlive;
pub use restoration::{Lifecycle, RestorationConfig, ScrollRestoration};
pub use scroll::{ScrollViewport, Viewport, ViewportRef, ViewportSlot, viewport_slot};
