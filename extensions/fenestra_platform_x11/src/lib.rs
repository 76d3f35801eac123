//! Fenestra X11 Platform
//!
//! Windowing and input for Linux/X11 using Xlib, XRandR, and XInput2,
//! loaded at runtime through `x11-dl`.
//!
//! This crate implements the `fenestra_platform` traits over the raw X11
//! protocol: window lifecycle and decoration hints, XRandR screen and mode
//! enumeration, XInput2 raw mouse motion, and XIM character composition.
//! All the cross-backend translation rules come from the core crate; this
//! crate only classifies native events and feeds them through.
//!
//! # Example
//!
//! ```ignore
//! use fenestra_platform::prelude::*;
//! use fenestra_platform_x11::X11Platform;
//!
//! fn main() -> Result<()> {
//!     let mut platform = X11Platform::new()?;
//!     let window = platform.create_window(&WindowConfig::new("demo"))?;
//!     loop {
//!         platform.poll_events();
//!         if platform.was_closed(window) {
//!             break;
//!         }
//!     }
//!     platform.destroy_window(window);
//!     Ok(())
//! }
//! ```

mod cursor;
mod events;
mod keys;
mod screens;
mod surface;
mod window;

pub use surface::{gl_visual_attribs, vulkan_instance_extensions, SurfaceTarget};

use std::collections::VecDeque;
use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_uint, c_ulong};
use std::ptr;

use rustc_hash::FxHashMap;
use tracing::{debug, error, warn};
use x11_dl::xinput2::{self, XInput2};
use x11_dl::xlib::{self, Xlib};
use x11_dl::xrandr::Xrandr;

use fenestra_platform::{
    resolve_move_request, screen_from_position, CursorControl, InputSnapshot, Platform,
    PlatformError, Rect, Result, Screen, WindowConfig, WindowHandle, WindowState, WindowStore,
};

/// Interned atoms used throughout the backend.
pub(crate) struct Atoms {
    pub wm_protocols: xlib::Atom,
    pub wm_delete_window: xlib::Atom,
    pub net_wm_name: xlib::Atom,
    pub utf8_string: xlib::Atom,
    pub net_wm_state: xlib::Atom,
    pub net_wm_state_hidden: xlib::Atom,
    pub net_wm_state_maximized_horz: xlib::Atom,
    pub net_wm_state_maximized_vert: xlib::Atom,
    pub net_wm_state_fullscreen: xlib::Atom,
    pub motif_wm_hints: xlib::Atom,
}

impl Atoms {
    fn intern(xlib: &Xlib, display: *mut xlib::Display) -> Self {
        let get = |name: &[u8]| unsafe {
            (xlib.XInternAtom)(display, name.as_ptr() as *const c_char, xlib::False)
        };
        Self {
            wm_protocols: get(b"WM_PROTOCOLS\0"),
            wm_delete_window: get(b"WM_DELETE_WINDOW\0"),
            net_wm_name: get(b"_NET_WM_NAME\0"),
            utf8_string: get(b"UTF8_STRING\0"),
            net_wm_state: get(b"_NET_WM_STATE\0"),
            net_wm_state_hidden: get(b"_NET_WM_STATE_HIDDEN\0"),
            net_wm_state_maximized_horz: get(b"_NET_WM_STATE_MAXIMIZED_HORZ\0"),
            net_wm_state_maximized_vert: get(b"_NET_WM_STATE_MAXIMIZED_VERT\0"),
            net_wm_state_fullscreen: get(b"_NET_WM_STATE_FULLSCREEN\0"),
            motif_wm_hints: get(b"_MOTIF_WM_HINTS\0"),
        }
    }
}

/// CRTC binding for one registry screen, needed for mode switches.
pub(crate) struct CrtcBinding {
    pub crtc: c_ulong,
    pub outputs: Vec<c_ulong>,
    pub rotation: u16,
}

/// X11 platform implementation.
///
/// Owns the display connection and every native resource derived from it.
/// Not `Send`: the thread that constructs it is the event thread.
pub struct X11Platform {
    pub(crate) xlib: Xlib,
    pub(crate) xrandr: Xrandr,
    pub(crate) xinput2: Option<XInput2>,
    pub(crate) display: *mut xlib::Display,
    pub(crate) root: xlib::Window,
    pub(crate) screen_num: c_int,
    pub(crate) atoms: Atoms,
    pub(crate) im: Option<xlib::XIM>,
    pub(crate) ics: FxHashMap<WindowHandle, xlib::XIC>,
    pub(crate) invisible_cursor: xlib::Cursor,
    pub(crate) xi_opcode: c_int,

    pub(crate) screens: Vec<Screen>,
    pub(crate) crtcs: Vec<CrtcBinding>,
    pub(crate) windows: WindowStore,
    pub(crate) snapshot: InputSnapshot,

    /// Normalized events synthesized during translation (composed
    /// characters, derived state edges), drained before the native queue.
    pub(crate) pending: VecDeque<fenestra_platform::Event>,
    /// Timestamp/keycode of a key release that turned out to be the first
    /// half of an auto-repeat pair.
    pub(crate) repeat_filter: Option<(xlib::Time, c_uint)>,

    /// Window the cursor is confined to, if any. The rectangle is re-read
    /// from the store on every re-assertion so it tracks the window.
    pub(crate) clip_window: Option<WindowHandle>,
    pub(crate) cursor_visible: bool,
    /// Window currently holding input focus; raw motion is billed to it.
    pub(crate) focused: Option<WindowHandle>,
}

impl X11Platform {
    /// Open the display and build the platform: screen registry, atom
    /// table, input method, and raw-motion subscription.
    pub fn new() -> Result<Self> {
        let xlib = Xlib::open()
            .map_err(|e| PlatformError::InitFailed(format!("libX11: {e}")))?;
        let xrandr = Xrandr::open()
            .map_err(|e| PlatformError::InitFailed(format!("libXrandr: {e}")))?;

        // SAFETY: the libraries are loaded; all calls below follow Xlib's
        // single-display-connection rules on this thread.
        unsafe {
            // XIM needs the locale set before the display opens.
            libc::setlocale(libc::LC_CTYPE, b"\0".as_ptr() as *const c_char);
            (xlib.XSetLocaleModifiers)(b"\0".as_ptr() as *const c_char);

            let display = (xlib.XOpenDisplay)(ptr::null());
            if display.is_null() {
                error!("XOpenDisplay failed; is DISPLAY set?");
                return Err(PlatformError::InitFailed(
                    "could not open X display".to_string(),
                ));
            }

            let screen_num = (xlib.XDefaultScreen)(display);
            let root = (xlib.XRootWindow)(display, screen_num);
            let atoms = Atoms::intern(&xlib, display);

            let im = {
                let im = (xlib.XOpenIM)(display, ptr::null_mut(), ptr::null_mut(), ptr::null_mut());
                if im.is_null() {
                    warn!("XOpenIM failed; character composition disabled");
                    None
                } else {
                    Some(im)
                }
            };

            let invisible_cursor = Self::create_invisible_cursor(&xlib, display, root);

            let (xinput2, xi_opcode) = Self::init_xinput2(&xlib, display, root);

            let (screens, crtcs) = screens::enumerate(&xlib, &xrandr, display, screen_num, root);
            debug!(screens = screens.len(), "screen registry enumerated");

            Ok(Self {
                xlib,
                xrandr,
                xinput2,
                display,
                root,
                screen_num,
                atoms,
                im,
                ics: FxHashMap::default(),
                invisible_cursor,
                xi_opcode,
                screens,
                crtcs,
                windows: WindowStore::new(),
                snapshot: InputSnapshot::new(),
                pending: VecDeque::new(),
                repeat_filter: None,
                clip_window: None,
                cursor_visible: true,
                focused: None,
            })
        }
    }

    unsafe fn create_invisible_cursor(
        xlib: &Xlib,
        display: *mut xlib::Display,
        root: xlib::Window,
    ) -> xlib::Cursor {
        let pixmap = (xlib.XCreatePixmap)(display, root, 1, 1, 1);
        let mut color: xlib::XColor = std::mem::zeroed();
        let color_ptr: *mut xlib::XColor = &mut color;
        let cursor = (xlib.XCreatePixmapCursor)(display, pixmap, pixmap, color_ptr, color_ptr, 0, 0);
        (xlib.XFreePixmap)(display, pixmap);
        cursor
    }

    /// Negotiate XInput2 and subscribe to raw motion on the root. Raw
    /// deltas degrade gracefully when the extension is missing.
    unsafe fn init_xinput2(
        xlib: &Xlib,
        display: *mut xlib::Display,
        root: xlib::Window,
    ) -> (Option<XInput2>, c_int) {
        let xinput2 = match XInput2::open() {
            Ok(xi) => xi,
            Err(e) => {
                warn!("libXi: {e}; raw mouse motion disabled");
                return (None, 0);
            }
        };

        let mut opcode = 0;
        let mut event_base = 0;
        let mut error_base = 0;
        let ok = (xlib.XQueryExtension)(
            display,
            b"XInputExtension\0".as_ptr() as *const c_char,
            &mut opcode,
            &mut event_base,
            &mut error_base,
        );
        if ok == xlib::False {
            warn!("XInputExtension not present; raw mouse motion disabled");
            return (None, 0);
        }

        let mut major = 2;
        let mut minor = 0;
        if (xinput2.XIQueryVersion)(display, &mut major, &mut minor) != 0 {
            warn!("XInput2 version negotiation failed; raw mouse motion disabled");
            return (None, 0);
        }

        let mut mask = [0u8; 4];
        mask[(xinput2::XI_RawMotion >> 3) as usize] |= 1u8 << (xinput2::XI_RawMotion & 7);
        let mut event_mask = xinput2::XIEventMask {
            deviceid: xinput2::XIAllMasterDevices,
            mask_len: mask.len() as c_int,
            mask: mask.as_mut_ptr(),
        };
        (xinput2.XISelectEvents)(display, root, &mut event_mask, 1);

        (Some(xinput2), opcode)
    }

    pub(crate) fn cstring(s: &str) -> CString {
        // Interior NULs cannot survive the C boundary; truncate at the first.
        CString::new(s.as_bytes().split(|&b| b == 0).next().unwrap_or_default().to_vec())
            .unwrap_or_default()
    }
}

impl Platform for X11Platform {
    fn screens(&self) -> &[Screen] {
        &self.screens
    }

    fn screen_from_cursor(&self) -> Rect {
        let (x, y) = self.cursor_position();
        screen_from_position(&self.screens, x, y)
    }

    fn screen_from_window(&self, window: WindowHandle) -> Rect {
        let rect = self.window_rect(window);
        screen_from_position(&self.screens, rect.x, rect.y)
    }

    fn change_screen_mode(&mut self, screen: usize, mode_index: usize) -> bool {
        let Some(binding) = self.crtcs.get(screen) else {
            return false;
        };
        let Some(mode) = self
            .screens
            .get(screen)
            .and_then(|s| s.modes.get(mode_index))
            .cloned()
        else {
            return false;
        };

        let ok = unsafe {
            screens::set_crtc_mode(&self.xrandr, self.display, self.root, binding, &mode)
        };
        if !ok {
            warn!(screen, mode = mode.native, "mode switch rejected");
            return false;
        }

        // The registry follows reality only on success.
        if let Some(entry) = self.screens.get_mut(screen) {
            entry.current_mode = mode_index;
            entry.width = mode.width;
            entry.height = mode.height;
        }
        debug!(screen, width = mode.width, height = mode.height, "screen mode changed");
        true
    }

    fn create_window(&mut self, config: &WindowConfig) -> Result<WindowHandle> {
        let rect = resolve_move_request(
            Rect::new(0, 0, config.width, config.height),
            config.x,
            config.y,
            config.width,
            config.height,
            |x, y| screen_from_position(&self.screens, x, y),
        );

        let handle = self.create_native_window(config, rect)?;
        // Fullscreen is entered through set_fullscreen below so the
        // pre-fullscreen rect gets recorded.
        let initial_flags = config.flags & !fenestra_platform::WindowFlags::FULLSCREEN;
        let mut state = WindowState::new(rect.x, rect.y, rect.width, rect.height, initial_flags);
        state.visible = true;
        self.windows.insert(handle, state);

        if !config.flags.contains(fenestra_platform::WindowFlags::RESIZABLE) {
            self.apply_size_lock(handle, rect.width, rect.height);
        }
        if config.flags.contains(fenestra_platform::WindowFlags::BORDERLESS) {
            self.apply_decorations(handle, false);
        }
        if config.flags.contains(fenestra_platform::WindowFlags::FULLSCREEN) {
            self.set_fullscreen(handle, true);
        }

        debug!(window = handle.raw(), ?rect, "window created");
        Ok(handle)
    }

    fn destroy_window(&mut self, window: WindowHandle) {
        if self.windows.remove(window).is_none() {
            return;
        }
        if self.clip_window == Some(window) {
            self.unclip_cursor();
        }
        self.destroy_native_window(window);
        debug!(window = window.raw(), "window destroyed");
    }

    fn show_window(&mut self, window: WindowHandle, visible: bool) {
        let Some(state) = self.windows.get_mut(window) else {
            return;
        };
        if state.visible == visible {
            return;
        }
        state.visible = visible;
        self.map_native_window(window, visible);
    }

    fn window_is_visible(&self, window: WindowHandle) -> bool {
        self.windows.get(window).map(|w| w.visible).unwrap_or(false)
    }

    fn move_window(&mut self, window: WindowHandle, x: i32, y: i32, width: i32, height: i32) {
        let Some(current) = self.windows.get(window).map(|w| w.rect()) else {
            return;
        };

        let target = resolve_move_request(current, x, y, width, height, |px, py| {
            screen_from_position(&self.screens, px, py)
        });

        self.move_native_window(window, target);
        if let Some(state) = self.windows.get_mut(window) {
            state.x = target.x;
            state.y = target.y;
            state.width = target.width;
            state.height = target.height;
        }
    }

    fn set_title(&mut self, window: WindowHandle, title: &str) {
        if !self.windows.contains(window) {
            return;
        }
        self.set_native_title(window, title);
    }

    fn set_borderless(&mut self, window: WindowHandle, borderless: bool) {
        let Some(state) = self.windows.get_mut(window) else {
            return;
        };
        if state.is_borderless() == borderless {
            return;
        }
        if borderless {
            state.flags |= fenestra_platform::WindowFlags::BORDERLESS;
        } else {
            state.flags &= !fenestra_platform::WindowFlags::BORDERLESS;
        }
        self.apply_decorations(window, !borderless);
    }

    fn set_fullscreen(&mut self, window: WindowHandle, fullscreen: bool) {
        let Some(state) = self.windows.get_mut(window) else {
            return;
        };

        if fullscreen {
            if state.is_fullscreen() {
                return;
            }
            state.enter_fullscreen();
            self.apply_net_wm_fullscreen(window, true);
        } else {
            let Some(restore) = state.leave_fullscreen() else {
                return;
            };
            self.apply_net_wm_fullscreen(window, false);
            self.apply_decorations(window, true);
            self.move_native_window(window, restore);
            if let Some(state) = self.windows.get_mut(window) {
                state.x = restore.x;
                state.y = restore.y;
                state.width = restore.width;
                state.height = restore.height;
            }
        }
    }

    fn windows(&self) -> &WindowStore {
        &self.windows
    }

    fn windows_mut(&mut self) -> &mut WindowStore {
        &mut self.windows
    }

    fn input(&self) -> &InputSnapshot {
        &self.snapshot
    }
}

impl Drop for X11Platform {
    fn drop(&mut self) {
        // SAFETY: the handles were created on this connection and are
        // released in dependency order before the connection closes.
        unsafe {
            let handles: Vec<_> = self.windows.handles().collect();
            for handle in handles {
                self.windows.remove(handle);
                self.destroy_native_window(handle);
            }
            if let Some(im) = self.im.take() {
                (self.xlib.XCloseIM)(im);
            }
            (self.xlib.XFreeCursor)(self.display, self.invisible_cursor);
            (self.xlib.XCloseDisplay)(self.display);
        }
    }
}
