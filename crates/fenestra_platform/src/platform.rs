//! Platform trait and abstraction
//!
//! Implemented by each native backend (x11, win32, cocoa) to provide a
//! unified interface over window lifecycle, screens, and the input
//! snapshot. State queries read the backend's window store, never the
//! native server; the store is authoritative for everything this layer
//! tracks.

use crate::error::Result;
use crate::input::InputSnapshot;
use crate::screen::Screen;
use crate::window::{Rect, WindowConfig, WindowHandle, WindowStore};

/// Requested GL framebuffer attributes, relayed verbatim to whatever
/// creates the context. This layer never creates one.
#[derive(Clone, Copy, Debug)]
pub struct GlConfig {
    pub red_bits: u8,
    pub green_bits: u8,
    pub blue_bits: u8,
    pub alpha_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub samples: u8,
    pub double_buffer: bool,
    pub srgb: bool,
}

impl Default for GlConfig {
    fn default() -> Self {
        Self {
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
            samples: 0,
            double_buffer: true,
            srgb: false,
        }
    }
}

/// Platform abstraction trait.
///
/// All methods are called from the single event-pumping thread, the same
/// one that constructed the platform.
pub trait Platform {
    /// The enumerated screen registry; the first entry is the default.
    fn screens(&self) -> &[Screen];

    /// The screen currently containing the cursor.
    fn screen_from_cursor(&self) -> Rect;

    /// The screen containing the window's origin.
    fn screen_from_window(&self, window: WindowHandle) -> Rect;

    /// Switch a screen to the mode at the given index, as found by
    /// [`Screen::select_mode`]. Returns `false` when the index is out of
    /// range or the native call fails; the registry's current-mode index
    /// moves only on success. The change is synchronous and nothing rolls
    /// it back.
    fn change_screen_mode(&mut self, screen: usize, mode_index: usize) -> bool;

    /// Create a native window and register it in the store.
    fn create_window(&mut self, config: &WindowConfig) -> Result<WindowHandle>;

    /// Destroy the native window and drop its store entry. Stale handles
    /// are a no-op.
    fn destroy_window(&mut self, window: WindowHandle);

    fn show_window(&mut self, window: WindowHandle, visible: bool);

    fn window_is_visible(&self, window: WindowHandle) -> bool;

    /// Apply a move/resize request. Coordinates may carry the
    /// [`CENTER`](crate::window::CENTER) / [`CURRENT`](crate::window::CURRENT)
    /// / [`STRETCH`](crate::window::STRETCH) sentinels.
    fn move_window(&mut self, window: WindowHandle, x: i32, y: i32, width: i32, height: i32);

    fn set_title(&mut self, window: WindowHandle, title: &str);

    /// Toggle window decorations.
    fn set_borderless(&mut self, window: WindowHandle, borderless: bool);

    /// Toggle fullscreen. Leaving restores the exact pre-fullscreen
    /// rectangle recorded when it was entered.
    fn set_fullscreen(&mut self, window: WindowHandle, fullscreen: bool);

    /// The window state side table.
    fn windows(&self) -> &WindowStore;
    fn windows_mut(&mut self) -> &mut WindowStore;

    /// The input snapshot maintained by this platform's event translator.
    fn input(&self) -> &InputSnapshot;

    // --- store-backed conveniences ------------------------------------

    /// Client rectangle from the store; zero rect for a stale handle.
    fn window_rect(&self, window: WindowHandle) -> Rect {
        self.windows().get(window).map(|w| w.rect()).unwrap_or_default()
    }

    fn window_position(&self, window: WindowHandle) -> (i32, i32) {
        let rect = self.window_rect(window);
        (rect.x, rect.y)
    }

    fn window_size(&self, window: WindowHandle) -> (i32, i32) {
        let rect = self.window_rect(window);
        (rect.width, rect.height)
    }

    /// Read-clears: whether a close was requested since the last call.
    fn was_closed(&mut self, window: WindowHandle) -> bool {
        self.windows_mut()
            .get_mut(window)
            .map(|w| w.take_was_closed())
            .unwrap_or(false)
    }

    /// Read-clears: the new size if the window was resized since the last
    /// call.
    fn was_resized(&mut self, window: WindowHandle) -> Option<(i32, i32)> {
        self.windows_mut().get_mut(window).and_then(|w| w.take_was_resized())
    }

    fn is_borderless(&self, window: WindowHandle) -> bool {
        self.windows().get(window).map(|w| w.is_borderless()).unwrap_or(false)
    }

    fn is_fullscreen(&self, window: WindowHandle) -> bool {
        self.windows().get(window).map(|w| w.is_fullscreen()).unwrap_or(false)
    }

    fn set_window_property(&mut self, window: WindowHandle, name: &str, value: &[u8]) {
        if let Some(w) = self.windows_mut().get_mut(window) {
            w.set_property(name, value);
        }
    }

    fn window_property(&self, window: WindowHandle, name: &str) -> Option<&[u8]> {
        self.windows().get(window).and_then(|w| w.property(name))
    }

    fn remove_window_property(&mut self, window: WindowHandle, name: &str) {
        if let Some(w) = self.windows_mut().get_mut(window) {
            w.remove_property(name);
        }
    }
}
