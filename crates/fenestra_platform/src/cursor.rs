//! Cursor control: position, confinement, visibility
//!
//! Cursor visibility is flat on purpose. Some native APIs keep an internal
//! show/hide counter, so a backend cannot simply forward the request; it
//! has to drive the counter until the cursor is actually in the requested
//! state. [`settle_visibility`] captures that loop independent of the
//! backend behind it.

use crate::window::{Rect, WindowHandle, WindowState};

/// Cursor operations a backend provides.
///
/// Confinement is a mode, not a one-shot: once set, the cursor stays inside
/// the window's client rectangle until released, and the rectangle follows
/// the window as it moves or resizes.
pub trait CursorControl {
    /// Current cursor position in virtual-desktop coordinates.
    fn cursor_position(&self) -> (i32, i32);

    /// Warp the cursor to a virtual-desktop position.
    fn move_cursor(&mut self, x: i32, y: i32);

    /// Confine the cursor to a window's client rectangle. A stale handle is
    /// a no-op.
    fn clip_cursor(&mut self, window: WindowHandle);

    /// Release any confinement.
    fn unclip_cursor(&mut self);

    /// Set cursor visibility. Repeated calls with the same value are
    /// idempotent; the first opposite call takes effect.
    fn show_cursor(&mut self, visible: bool);

    /// Whether the cursor is currently visible.
    fn cursor_visible(&self) -> bool;

    /// Hide the cursor and confine it to the window. The usual
    /// first-person-camera arrangement, paired with the raw-motion stream.
    fn grab_cursor(&mut self, window: WindowHandle) {
        self.show_cursor(false);
        self.clip_cursor(window);
    }

    /// Undo [`grab_cursor`](Self::grab_cursor).
    fn ungrab_cursor(&mut self) {
        self.unclip_cursor();
        self.show_cursor(true);
    }
}

/// Drive a counted native show/hide primitive until the cursor reaches the
/// requested state. `native_toggle` mirrors the native call: it adjusts the
/// counter by one in the given direction and returns the new counter value,
/// with the cursor visible iff the counter is `>= 0`.
pub fn settle_visibility(mut native_toggle: impl FnMut(bool) -> i32, visible: bool) {
    if visible {
        while native_toggle(true) < 0 {}
    } else {
        while native_toggle(false) >= 0 {}
    }
}

/// Clamp a point into a rectangle. Used by backends that emulate
/// confinement by warping the cursor back.
pub fn clamp_to_rect(rect: Rect, x: i32, y: i32) -> (i32, i32) {
    (
        x.clamp(rect.x, rect.x + rect.width - 1),
        y.clamp(rect.y, rect.y + rect.height - 1),
    )
}

/// Warp-back target for a confined cursor: the point clamped into the
/// window's client rectangle, or `None` when it is already inside. The
/// rectangle comes from the live state record, never from a value captured
/// when confinement began, so it tracks the window across moves and
/// resizes. A destroyed window yields `None`.
pub fn confinement_warp(state: Option<&WindowState>, x: i32, y: i32) -> Option<(i32, i32)> {
    let rect = state?.rect();
    let (cx, cy) = clamp_to_rect(rect, x, y);
    ((cx, cy) != (x, y)).then_some((cx, cy))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A native API with a show counter: visible iff counter >= 0.
    struct CountedCursor {
        counter: i32,
        calls: u32,
    }

    impl CountedCursor {
        fn toggle(&mut self, show: bool) -> i32 {
            self.calls += 1;
            self.counter += if show { 1 } else { -1 };
            self.counter
        }
    }

    #[test]
    fn test_settle_visibility_unwinds_nested_hides() {
        // Two hides deep; a single show request must surface the cursor.
        let mut native = CountedCursor { counter: -2, calls: 0 };
        settle_visibility(|s| native.toggle(s), true);
        assert!(native.counter >= 0);
        assert_eq!(native.calls, 2);
    }

    #[test]
    fn test_settle_visibility_hide_is_flat() {
        let mut native = CountedCursor { counter: 3, calls: 0 };
        settle_visibility(|s| native.toggle(s), false);
        assert!(native.counter < 0);
    }

    #[test]
    fn test_double_hide_single_show_ends_visible() {
        let mut native = CountedCursor { counter: 0, calls: 0 };
        settle_visibility(|s| native.toggle(s), false);
        settle_visibility(|s| native.toggle(s), false);
        settle_visibility(|s| native.toggle(s), true);
        assert!(native.counter >= 0, "visibility must be flat, not counted");
    }

    #[test]
    fn test_confinement_tracks_current_window_rect() {
        use crate::window::{WindowFlags, WindowState};

        let mut state = WindowState::new(100, 100, 800, 600, WindowFlags::default());
        assert_eq!(confinement_warp(Some(&state), 50, 300), Some((100, 300)));
        assert_eq!(confinement_warp(Some(&state), 400, 300), None);

        // Moving the window moves the fence; the old rectangle is gone.
        state.x = 1000;
        state.y = 0;
        assert_eq!(confinement_warp(Some(&state), 400, 300), Some((1000, 300)));

        state.apply_resize(200, 200);
        assert_eq!(confinement_warp(Some(&state), 1500, 300), Some((1199, 199)));

        assert_eq!(confinement_warp(None, 5, 5), None);
    }

    #[test]
    fn test_clamp_to_rect() {
        let rect = Rect::new(100, 100, 800, 600);
        assert_eq!(clamp_to_rect(rect, 50, 50), (100, 100));
        assert_eq!(clamp_to_rect(rect, 2000, 300), (899, 300));
        assert_eq!(clamp_to_rect(rect, 400, 400), (400, 400));
        assert_eq!(clamp_to_rect(rect, 400, 9999), (400, 699));
    }
}
