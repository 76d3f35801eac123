//! Native window operations: creation, geometry, hints
//!
//! Decorations are controlled through `_MOTIF_WM_HINTS`; fullscreen goes
//! through a `_NET_WM_STATE` client message to the root so the window
//! manager stays in charge of the actual geometry change.

use std::os::raw::{c_char, c_int, c_long, c_uchar, c_ulong};
use std::ptr;

use x11_dl::xlib;

use fenestra_platform::{PlatformError, Rect, Result, WindowConfig, WindowHandle};

use crate::X11Platform;

const MWM_HINTS_DECORATIONS: c_ulong = 1 << 1;

#[repr(C)]
struct MotifWmHints {
    flags: c_ulong,
    functions: c_ulong,
    decorations: c_ulong,
    input_mode: c_long,
    status: c_ulong,
}

const NET_WM_STATE_REMOVE: c_long = 0;
const NET_WM_STATE_ADD: c_long = 1;

const EVENT_MASK: c_long = xlib::KeyPressMask
    | xlib::KeyReleaseMask
    | xlib::ButtonPressMask
    | xlib::ButtonReleaseMask
    | xlib::PointerMotionMask
    | xlib::EnterWindowMask
    | xlib::LeaveWindowMask
    | xlib::FocusChangeMask
    | xlib::StructureNotifyMask
    | xlib::PropertyChangeMask;

impl X11Platform {
    pub(crate) fn create_native_window(
        &mut self,
        config: &WindowConfig,
        rect: Rect,
    ) -> Result<WindowHandle> {
        // SAFETY: display is live; the created resources are torn down in
        // destroy_native_window.
        unsafe {
            let mut attrs: xlib::XSetWindowAttributes = std::mem::zeroed();
            attrs.event_mask = EVENT_MASK;
            attrs.background_pixel = (self.xlib.XBlackPixel)(self.display, self.screen_num);

            let win = (self.xlib.XCreateWindow)(
                self.display,
                self.root,
                rect.x,
                rect.y,
                rect.width.max(1) as u32,
                rect.height.max(1) as u32,
                0,
                xlib::CopyFromParent,
                xlib::InputOutput as u32,
                ptr::null_mut(),
                xlib::CWEventMask | xlib::CWBackPixel,
                &mut attrs,
            );
            if win == 0 {
                return Err(PlatformError::WindowCreation(
                    "XCreateWindow returned no window".to_string(),
                ));
            }
            let handle = WindowHandle::from_raw(win);

            let mut protocols = [self.atoms.wm_delete_window];
            (self.xlib.XSetWMProtocols)(self.display, win, protocols.as_mut_ptr(), 1);

            self.set_native_title(handle, &config.title);

            if let Some(im) = self.im {
                let ic = (self.xlib.XCreateIC)(
                    im,
                    b"inputStyle\0".as_ptr() as *const c_char,
                    xlib::XIMPreeditNothing | xlib::XIMStatusNothing,
                    b"clientWindow\0".as_ptr() as *const c_char,
                    win,
                    ptr::null_mut::<c_char>(),
                );
                if !ic.is_null() {
                    self.ics.insert(handle, ic);
                }
            }

            // The WM repositions on map; pin the requested position after.
            (self.xlib.XMapWindow)(self.display, win);
            (self.xlib.XMoveWindow)(self.display, win, rect.x, rect.y);
            (self.xlib.XFlush)(self.display);

            Ok(handle)
        }
    }

    pub(crate) fn destroy_native_window(&mut self, window: WindowHandle) {
        unsafe {
            if let Some(ic) = self.ics.remove(&window) {
                (self.xlib.XDestroyIC)(ic);
            }
            (self.xlib.XDestroyWindow)(self.display, window.raw());
            (self.xlib.XFlush)(self.display);
        }
    }

    pub(crate) fn map_native_window(&mut self, window: WindowHandle, visible: bool) {
        unsafe {
            if visible {
                (self.xlib.XMapWindow)(self.display, window.raw());
            } else {
                (self.xlib.XUnmapWindow)(self.display, window.raw());
            }
            (self.xlib.XFlush)(self.display);
        }
    }

    pub(crate) fn move_native_window(&mut self, window: WindowHandle, rect: Rect) {
        unsafe {
            (self.xlib.XMoveResizeWindow)(
                self.display,
                window.raw(),
                rect.x,
                rect.y,
                rect.width.max(1) as u32,
                rect.height.max(1) as u32,
            );
            (self.xlib.XFlush)(self.display);
        }
    }

    pub(crate) fn set_native_title(&mut self, window: WindowHandle, title: &str) {
        let c_title = Self::cstring(title);
        unsafe {
            (self.xlib.XStoreName)(self.display, window.raw(), c_title.as_ptr());
            (self.xlib.XChangeProperty)(
                self.display,
                window.raw(),
                self.atoms.net_wm_name,
                self.atoms.utf8_string,
                8,
                xlib::PropModeReplace,
                title.as_ptr(),
                title.len() as c_int,
            );
            (self.xlib.XFlush)(self.display);
        }
    }

    /// Lock the window to a fixed size through WM_NORMAL_HINTS.
    pub(crate) fn apply_size_lock(&mut self, window: WindowHandle, width: i32, height: i32) {
        unsafe {
            let hints = (self.xlib.XAllocSizeHints)();
            if hints.is_null() {
                return;
            }
            (*hints).flags = xlib::PMinSize | xlib::PMaxSize;
            (*hints).min_width = width;
            (*hints).max_width = width;
            (*hints).min_height = height;
            (*hints).max_height = height;
            (self.xlib.XSetWMNormalHints)(self.display, window.raw(), hints);
            (self.xlib.XFree)(hints as *mut _);
        }
    }

    pub(crate) fn apply_decorations(&mut self, window: WindowHandle, decorated: bool) {
        let hints = MotifWmHints {
            flags: MWM_HINTS_DECORATIONS,
            functions: 0,
            decorations: decorated as c_ulong,
            input_mode: 0,
            status: 0,
        };
        unsafe {
            (self.xlib.XChangeProperty)(
                self.display,
                window.raw(),
                self.atoms.motif_wm_hints,
                self.atoms.motif_wm_hints,
                32,
                xlib::PropModeReplace,
                &hints as *const MotifWmHints as *const c_uchar,
                5,
            );
            (self.xlib.XFlush)(self.display);
        }
    }

    pub(crate) fn apply_net_wm_fullscreen(&mut self, window: WindowHandle, fullscreen: bool) {
        unsafe {
            let mut xev: xlib::XEvent = std::mem::zeroed();
            {
                let msg = &mut xev.client_message;
                msg.type_ = xlib::ClientMessage;
                msg.window = window.raw();
                msg.message_type = self.atoms.net_wm_state;
                msg.format = 32;
                msg.data.set_long(
                    0,
                    if fullscreen { NET_WM_STATE_ADD } else { NET_WM_STATE_REMOVE },
                );
                msg.data.set_long(1, self.atoms.net_wm_state_fullscreen as c_long);
                msg.data.set_long(2, 0);
            }
            (self.xlib.XSendEvent)(
                self.display,
                self.root,
                xlib::False,
                xlib::SubstructureNotifyMask | xlib::SubstructureRedirectMask,
                &mut xev,
            );
            (self.xlib.XFlush)(self.display);
        }
    }

    /// Fetch the `_NET_WM_STATE` atom list for a window. Used by the
    /// translator to diff show states on PropertyNotify.
    pub(crate) fn fetch_net_wm_state(&self, window: WindowHandle) -> Vec<xlib::Atom> {
        let mut atoms = Vec::new();
        unsafe {
            let mut actual_type: xlib::Atom = 0;
            let mut actual_format: c_int = 0;
            let mut item_count: c_ulong = 0;
            let mut bytes_after: c_ulong = 0;
            let mut data: *mut c_uchar = ptr::null_mut();

            let status = (self.xlib.XGetWindowProperty)(
                self.display,
                window.raw(),
                self.atoms.net_wm_state,
                0,
                64,
                xlib::False,
                xlib::XA_ATOM,
                &mut actual_type,
                &mut actual_format,
                &mut item_count,
                &mut bytes_after,
                &mut data,
            );
            if status == 0 && !data.is_null() {
                if actual_format == 32 {
                    let items = std::slice::from_raw_parts(data as *const c_ulong, item_count as usize);
                    atoms.extend_from_slice(items);
                }
                (self.xlib.XFree)(data as *mut _);
            }
        }
        atoms
    }
}
