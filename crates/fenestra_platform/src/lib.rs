//! Fenestra Platform Abstraction Layer
//!
//! This crate provides platform-agnostic types and traits for windowing,
//! input handling, screen enumeration, and GPU surface handoff. It owns
//! everything a native backend shares: the normalized event model, the
//! input snapshot, the window state store, and the translation rules that
//! turn raw native notifications into well-behaved events.
//!
//! # Architecture
//!
//! The abstraction is built around three traits:
//!
//! - [`Platform`] - Window lifecycle, screens, and store access
//! - [`EventSource`] - Blocking and non-blocking event retrieval
//! - [`CursorControl`] - Cursor position, confinement, and visibility
//!
//! Backends implement all three over their native API; the shared
//! translation rules (resize dedup, move suppression, show-state edges,
//! read-clear dirty flags, focus-loss clearing) live on [`WindowState`] and
//! [`InputSnapshot`] so every backend behaves identically.
//!
//! # Platform Implementations
//!
//! - `fenestra_platform_x11` - Linux/X11 via Xlib, XRandR, and XInput2
//!
//! # Threading model
//!
//! One event-pumping thread per process: the thread that creates the
//! platform is the only one that may pump events or call platform methods.
//!
//! # Example
//!
//! ```ignore
//! use fenestra_platform::prelude::*;
//! use fenestra_platform_x11::X11Platform;
//!
//! fn main() -> Result<()> {
//!     let mut platform = X11Platform::new()?;
//!     let window = platform.create_window(
//!         &WindowConfig::new("demo").with_size(1280, 720),
//!     )?;
//!
//!     loop {
//!         platform.poll_events();
//!         if platform.was_closed(window) {
//!             break;
//!         }
//!         // Render, then pace the loop.
//!     }
//!     platform.destroy_window(window);
//!     Ok(())
//! }
//! ```

mod cursor;
mod error;
mod event;
mod input;
mod platform;
mod screen;
pub mod timing;
mod window;

// Re-export all public types
pub use cursor::{clamp_to_rect, confinement_warp, settle_visibility, CursorControl};
pub use error::{PlatformError, Result};
pub use event::{Event, EventSource};
pub use input::{InputSnapshot, Key, Modifiers, MouseButton, KEY_STATE_COUNT, MOUSE_BUTTON_COUNT};
pub use platform::{GlConfig, Platform};
pub use screen::{default_screen, screen_from_position, DisplayMode, Screen};
pub use window::{
    resolve_move_request, show_state_transition, Rect, ResizeEdge, ShowState, ShowStateChange,
    WindowConfig, WindowFlags, WindowHandle, WindowState, WindowStore, CENTER, CURRENT, STRETCH,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cursor::CursorControl;
    pub use crate::error::{PlatformError, Result};
    pub use crate::event::{Event, EventSource};
    pub use crate::input::{InputSnapshot, Key, Modifiers, MouseButton};
    pub use crate::platform::{GlConfig, Platform};
    pub use crate::screen::{DisplayMode, Screen};
    pub use crate::window::{
        Rect, ShowState, WindowConfig, WindowFlags, WindowHandle, CENTER, CURRENT, STRETCH,
    };
}
