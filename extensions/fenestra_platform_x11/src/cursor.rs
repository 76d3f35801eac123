//! Cursor control over Xlib
//!
//! Visibility swaps the window cursor for an invisible one (a 1x1 empty
//! pixmap cursor) on every tracked window. Confinement grabs the pointer
//! with the window as `confine_to`, so the server itself keeps the cursor
//! on the window; the raw-motion path additionally warps it back into the
//! exact client rectangle, re-read from the store so it follows the
//! window across moves and resizes.

use std::os::raw::{c_int, c_uint};

use x11_dl::xlib;

use fenestra_platform::{confinement_warp, CursorControl, WindowHandle};

use crate::X11Platform;

impl X11Platform {
    pub(crate) fn warp_cursor(&mut self, x: i32, y: i32) {
        unsafe {
            (self.xlib.XWarpPointer)(self.display, 0, self.root, 0, 0, 0, 0, x, y);
            (self.xlib.XFlush)(self.display);
        }
    }
}

impl CursorControl for X11Platform {
    fn cursor_position(&self) -> (i32, i32) {
        unsafe {
            let mut root_return: xlib::Window = 0;
            let mut child_return: xlib::Window = 0;
            let mut root_x: c_int = 0;
            let mut root_y: c_int = 0;
            let mut win_x: c_int = 0;
            let mut win_y: c_int = 0;
            let mut mask: c_uint = 0;
            (self.xlib.XQueryPointer)(
                self.display,
                self.root,
                &mut root_return,
                &mut child_return,
                &mut root_x,
                &mut root_y,
                &mut win_x,
                &mut win_y,
                &mut mask,
            );
            (root_x, root_y)
        }
    }

    fn move_cursor(&mut self, x: i32, y: i32) {
        self.warp_cursor(x, y);
    }

    fn clip_cursor(&mut self, window: WindowHandle) {
        if !self.windows.contains(window) {
            return;
        }
        self.clip_window = Some(window);
        unsafe {
            (self.xlib.XGrabPointer)(
                self.display,
                window.raw(),
                xlib::True,
                (xlib::PointerMotionMask | xlib::ButtonPressMask | xlib::ButtonReleaseMask)
                    as c_uint,
                xlib::GrabModeAsync,
                xlib::GrabModeAsync,
                window.raw(),
                0,
                xlib::CurrentTime,
            );
        }
        // Start inside the rectangle; the grab and warp-back keep it there.
        let (x, y) = self.cursor_position();
        if let Some((cx, cy)) = confinement_warp(self.windows.get(window), x, y) {
            self.warp_cursor(cx, cy);
        }
    }

    fn unclip_cursor(&mut self) {
        if self.clip_window.take().is_none() {
            return;
        }
        unsafe {
            (self.xlib.XUngrabPointer)(self.display, xlib::CurrentTime);
            (self.xlib.XFlush)(self.display);
        }
    }

    fn show_cursor(&mut self, visible: bool) {
        if self.cursor_visible == visible {
            return;
        }
        self.cursor_visible = visible;

        // Xlib has no global cursor visibility; apply per window.
        let handles: Vec<_> = self.windows.handles().collect();
        unsafe {
            for handle in handles {
                if visible {
                    (self.xlib.XUndefineCursor)(self.display, handle.raw());
                } else {
                    (self.xlib.XDefineCursor)(self.display, handle.raw(), self.invisible_cursor);
                }
            }
            (self.xlib.XFlush)(self.display);
        }
    }

    fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }
}
