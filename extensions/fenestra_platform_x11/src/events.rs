//! Native event translation
//!
//! One pass over each `XEvent`, classified into at most one normalized
//! event plus any synthesized followers (composed characters, derived
//! show-state edges), all appended to the pending queue. Retrieval pops
//! the queue, so synthesized events interleave in arrival order with the
//! native ones that caused them.
//!
//! Auto-repeat arrives as a KeyRelease/KeyPress pair sharing a timestamp
//! and keycode. The release peeks ahead: when the pair is detected, the
//! release is swallowed and the press emits only the composed character,
//! so held keys produce a character stream without phantom transitions.

use std::os::raw::{c_char, c_int, c_uchar, c_ulong};

use tracing::trace;
use x11_dl::xlib;

use fenestra_platform::{
    confinement_warp, CursorControl, Event, EventSource, ShowState, ShowStateChange, WindowHandle,
};

use crate::keys::{classify_button, key_from_keysym, modifiers_from_state, ButtonAction};
use crate::X11Platform;

// FocusIn/FocusOut mode and detail values that do not reflect a real
// focus change.
const NOTIFY_GRAB: c_int = 1;
const NOTIFY_UNGRAB: c_int = 2;
const NOTIFY_POINTER: c_int = 5;

impl EventSource for X11Platform {
    fn wait_event(&mut self) -> Event {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return event;
            }
            // SAFETY: XNextEvent blocks until an event arrives; the event
            // structure it fills is plain data.
            unsafe {
                let mut xev: xlib::XEvent = std::mem::zeroed();
                (self.xlib.XNextEvent)(self.display, &mut xev);
                self.translate(&mut xev);
            }
        }
    }

    fn peek_event(&mut self) -> Option<Event> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            unsafe {
                if (self.xlib.XPending)(self.display) == 0 {
                    return None;
                }
                let mut xev: xlib::XEvent = std::mem::zeroed();
                (self.xlib.XNextEvent)(self.display, &mut xev);
                self.translate(&mut xev);
            }
        }
    }

    fn poll_events(&mut self) {
        self.snapshot.begin_poll_batch();
        while self.peek_event().is_some() {}
    }

    fn post_event(&mut self, event: Event) {
        self.pending.push_back(event);
    }
}

impl X11Platform {
    /// Classify one native event, updating window state and the input
    /// snapshot, and append whatever it maps to onto the pending queue.
    pub(crate) unsafe fn translate(&mut self, xev: &mut xlib::XEvent) {
        // Let the input method consume events it needs for composition.
        if (self.xlib.XFilterEvent)(xev, 0) == xlib::True {
            return;
        }

        match xev.get_type() {
            xlib::KeyPress => self.on_key_press(&mut xev.key),
            xlib::KeyRelease => self.on_key_release(&mut xev.key),
            xlib::ButtonPress => self.on_button_press(&xev.button),
            xlib::ButtonRelease => self.on_button_release(&xev.button),
            xlib::MotionNotify => self.on_motion(&xev.motion),
            xlib::EnterNotify => {
                let window = WindowHandle::from_raw(xev.crossing.window);
                if self.windows.contains(window) {
                    self.pending.push_back(Event::MouseEnter { window });
                }
            }
            xlib::LeaveNotify => {
                let window = WindowHandle::from_raw(xev.crossing.window);
                if self.windows.contains(window) {
                    // Button releases outside the window are never seen.
                    self.snapshot.clear_buttons();
                    self.pending.push_back(Event::MouseLeave { window });
                }
            }
            xlib::FocusIn => self.on_focus(&xev.focus_change, true),
            xlib::FocusOut => self.on_focus(&xev.focus_change, false),
            xlib::ConfigureNotify => self.on_configure(&xev.configure),
            xlib::PropertyNotify => self.on_property(&xev.property),
            xlib::ClientMessage => self.on_client_message(&xev.client_message),
            xlib::MapNotify => {
                let window = WindowHandle::from_raw(xev.map.window);
                if let Some(state) = self.windows.get_mut(window) {
                    state.visible = true;
                }
            }
            xlib::UnmapNotify => {
                let window = WindowHandle::from_raw(xev.unmap.window);
                if let Some(state) = self.windows.get_mut(window) {
                    state.visible = false;
                }
            }
            xlib::GenericEvent => self.on_generic(xev),
            other => trace!(kind = other, "native event dropped"),
        }
    }

    unsafe fn on_key_press(&mut self, ev: &mut xlib::XKeyEvent) {
        let window = WindowHandle::from_raw(ev.window);
        if !self.windows.contains(window) {
            return;
        }

        let keysym = (self.xlib.XLookupKeysym)(ev, 0);
        let key = key_from_keysym(keysym);

        let repeat = self.repeat_filter.take() == Some((ev.time, ev.keycode));
        let modifiers = if repeat {
            modifiers_from_state(&self.snapshot, ev.state)
        } else {
            self.snapshot.set_key(key, true);
            let modifiers = modifiers_from_state(&self.snapshot, ev.state);
            self.snapshot.set_modifiers(modifiers);
            self.pending.push_back(Event::KeyDown { window, key, modifiers });
            modifiers
        };

        // Composed characters follow the transition they came from.
        if let Some(&ic) = self.ics.get(&window) {
            let mut buf = [0u8; 32];
            let mut keysym_return: xlib::KeySym = 0;
            let mut status: xlib::Status = 0;
            let len = (self.xlib.Xutf8LookupString)(
                ic,
                ev,
                buf.as_mut_ptr() as *mut c_char,
                buf.len() as c_int,
                &mut keysym_return,
                &mut status,
            );
            if len > 0 {
                if let Ok(text) = std::str::from_utf8(&buf[..len as usize]) {
                    for chr in text.chars().filter(|&c| is_text_char(c)) {
                        self.pending.push_back(Event::KeyChar { window, key, modifiers, chr });
                    }
                }
            }
        } else {
            // No input method: the core-protocol lookup still yields
            // Latin-1 text, which maps to Unicode byte-for-byte.
            let mut buf = [0u8; 32];
            let mut keysym_return: xlib::KeySym = 0;
            let len = (self.xlib.XLookupString)(
                ev,
                buf.as_mut_ptr() as *mut c_char,
                buf.len() as c_int,
                &mut keysym_return,
                std::ptr::null_mut(),
            );
            for &byte in buf.iter().take(len.max(0) as usize) {
                let chr = char::from(byte);
                if is_text_char(chr) {
                    self.pending.push_back(Event::KeyChar { window, key, modifiers, chr });
                }
            }
        }
    }

    unsafe fn on_key_release(&mut self, ev: &mut xlib::XKeyEvent) {
        let window = WindowHandle::from_raw(ev.window);
        if !self.windows.contains(window) {
            return;
        }

        // Auto-repeat pairs share timestamp and keycode; peek ahead and
        // swallow the release half.
        if (self.xlib.XPending)(self.display) > 0 {
            let mut next: xlib::XEvent = std::mem::zeroed();
            (self.xlib.XPeekEvent)(self.display, &mut next);
            if next.get_type() == xlib::KeyPress
                && next.key.time == ev.time
                && next.key.keycode == ev.keycode
            {
                self.repeat_filter = Some((ev.time, ev.keycode));
                return;
            }
        }

        let keysym = (self.xlib.XLookupKeysym)(ev, 0);
        let key = key_from_keysym(keysym);
        self.snapshot.set_key(key, false);
        let modifiers = modifiers_from_state(&self.snapshot, ev.state);
        self.snapshot.set_modifiers(modifiers);
        self.pending.push_back(Event::KeyUp { window, key, modifiers });
    }

    fn on_button_press(&mut self, ev: &xlib::XButtonEvent) {
        let window = WindowHandle::from_raw(ev.window);
        if !self.windows.contains(window) {
            return;
        }

        match classify_button(ev.button) {
            ButtonAction::Button(button) => {
                self.snapshot.set_button(button, true);
                self.pending.push_back(Event::MouseDown { window, button, x: ev.x, y: ev.y });
            }
            ButtonAction::WheelVertical(dz) => {
                self.pending.push_back(Event::MouseWheel { window, x: ev.x, y: ev.y, dz, dw: 0 });
            }
            ButtonAction::WheelHorizontal(dw) => {
                self.pending.push_back(Event::MouseWheel { window, x: ev.x, y: ev.y, dz: 0, dw });
            }
            ButtonAction::Ignored => {}
        }
    }

    fn on_button_release(&mut self, ev: &xlib::XButtonEvent) {
        let window = WindowHandle::from_raw(ev.window);
        if !self.windows.contains(window) {
            return;
        }

        // Wheel codes pair every press with a release; only the press
        // carries the detent.
        if let ButtonAction::Button(button) = classify_button(ev.button) {
            // A release ends any manual drag/resize gesture on the window.
            if let Some(state) = self.windows.get_mut(window) {
                state.end_gesture();
            }
            if self.snapshot.release_button(button) {
                self.pending.push_back(Event::MouseUp { window, button, x: ev.x, y: ev.y });
            }
        }
    }

    fn on_motion(&mut self, ev: &xlib::XMotionEvent) {
        let window = WindowHandle::from_raw(ev.window);
        let Some(state) = self.windows.get_mut(window) else {
            return;
        };

        // Positions outside the client area (grabs in flight) stay out of
        // the snapshot.
        if !state.contains_client_point(ev.x, ev.y) {
            return;
        }
        state.last_mouse = (ev.x, ev.y);

        self.snapshot.set_mouse_position(ev.x, ev.y);
        self.pending.push_back(Event::MouseMove { window, x: ev.x, y: ev.y });
    }

    fn on_focus(&mut self, ev: &xlib::XFocusChangeEvent, gained: bool) {
        // Grab-driven transitions and pointer-only details are not real
        // focus changes.
        if ev.mode == NOTIFY_GRAB || ev.mode == NOTIFY_UNGRAB || ev.detail == NOTIFY_POINTER {
            return;
        }

        let window = WindowHandle::from_raw(ev.window);
        if !self.windows.contains(window) {
            return;
        }

        if gained {
            self.focused = Some(window);
            self.pending.push_back(Event::FocusGained { window });
        } else {
            // Key-up and button-up events stop arriving with focus gone;
            // drop the down-state before anyone reads it stuck, and no
            // gesture can continue without the button.
            self.snapshot.clear_on_focus_loss();
            if let Some(state) = self.windows.get_mut(window) {
                state.end_gesture();
            }
            if self.focused == Some(window) {
                self.focused = None;
            }
            self.pending.push_back(Event::FocusLost { window });
        }
    }

    fn on_configure(&mut self, ev: &xlib::XConfigureEvent) {
        let window = WindowHandle::from_raw(ev.window);
        let Some(state) = self.windows.get_mut(window) else {
            return;
        };

        let resized = state.apply_resize(ev.width, ev.height);
        let moved = state.apply_move(ev.x, ev.y);

        // A size change outranks the position change that rides along
        // with it.
        if resized {
            self.pending.push_back(Event::WindowResize { window, width: ev.width, height: ev.height });
        } else if moved {
            self.pending.push_back(Event::WindowMove { window, x: ev.x, y: ev.y });
        }

        // The confinement rectangle moved with the window.
        if self.clip_window == Some(window) {
            self.reassert_clip();
        }
    }

    fn on_property(&mut self, ev: &xlib::XPropertyEvent) {
        if ev.atom != self.atoms.net_wm_state {
            return;
        }
        let window = WindowHandle::from_raw(ev.window);
        if !self.windows.contains(window) {
            return;
        }

        let observed = self.classify_net_wm_state(window);
        let Some(state) = self.windows.get_mut(window) else {
            return;
        };
        let size = (state.width, state.height);
        let Some(change) = state.observe_show_state(observed) else {
            return;
        };

        let event = match change {
            ShowStateChange::Maximized => Event::WindowMaximize { window, width: size.0, height: size.1 },
            ShowStateChange::Minimized => Event::WindowMinimize { window, width: size.0, height: size.1 },
            ShowStateChange::Restored => Event::WindowRestore { window, width: size.0, height: size.1 },
        };
        self.pending.push_back(event);
    }

    /// Diff the window's `_NET_WM_STATE` atom list into a show state:
    /// hidden wins, then both maximized atoms together, else restored.
    fn classify_net_wm_state(&self, window: WindowHandle) -> ShowState {
        let atoms = self.fetch_net_wm_state(window);

        if atoms.contains(&self.atoms.net_wm_state_hidden) {
            return ShowState::Minimized;
        }
        let maxed = atoms
            .iter()
            .filter(|&&a| {
                a == self.atoms.net_wm_state_maximized_horz
                    || a == self.atoms.net_wm_state_maximized_vert
            })
            .count();
        if maxed >= 2 {
            return ShowState::Maximized;
        }
        ShowState::Restored
    }

    fn on_client_message(&mut self, ev: &xlib::XClientMessageEvent) {
        if ev.message_type != self.atoms.wm_protocols {
            return;
        }
        if ev.data.get_long(0) as c_ulong != self.atoms.wm_delete_window {
            return;
        }

        let window = WindowHandle::from_raw(ev.window);
        let Some(state) = self.windows.get_mut(window) else {
            return;
        };
        state.mark_closed();
        self.pending.push_back(Event::WindowClose { window });
    }

    /// XInput2 raw motion: unaccelerated deltas accumulated into the
    /// snapshot and billed to the focused window.
    unsafe fn on_generic(&mut self, xev: &mut xlib::XEvent) {
        if self.xinput2.is_none() {
            return;
        }

        let cookie = &mut xev.generic_event_cookie;
        if cookie.extension != self.xi_opcode {
            return;
        }
        if (self.xlib.XGetEventData)(self.display, cookie) == xlib::False {
            return;
        }
        if cookie.evtype == x11_dl::xinput2::XI_RawMotion {
            let raw = &*(cookie.data as *const x11_dl::xinput2::XIRawEvent);
            let (dx, dy) = raw_motion_deltas(raw);

            if dx != 0 || dy != 0 {
                self.snapshot.accumulate_motion(dx, dy);
                if let Some(window) = self.focused {
                    self.pending.push_back(Event::RawMouseMotion { window, dx, dy });
                }
            }

            self.reassert_clip();
        }
        (self.xlib.XFreeEventData)(self.display, cookie);
    }

    /// The native grab holds the cursor on the window; this warp-back
    /// keeps it inside the exact client rectangle, re-read from the store
    /// so it follows the window across moves and resizes.
    pub(crate) fn reassert_clip(&mut self) {
        let Some(window) = self.clip_window else {
            return;
        };
        let (x, y) = self.cursor_position();
        if let Some((cx, cy)) = confinement_warp(self.windows.get(window), x, y) {
            self.warp_cursor(cx, cy);
        }
    }
}

/// Whether a looked-up character is forwarded as text. The editing
/// controls a text field acts on (Return, Tab, Backspace) pass through;
/// other control characters (escape, function-key noise) do not.
fn is_text_char(c: char) -> bool {
    !c.is_control() || matches!(c, '\r' | '\n' | '\t' | '\u{8}')
}

/// Extract the x/y deltas (valuators 0 and 1) from a raw event. The
/// raw-value array is packed by the valuator mask.
unsafe fn raw_motion_deltas(raw: &x11_dl::xinput2::XIRawEvent) -> (i32, i32) {
    let mask = std::slice::from_raw_parts(
        raw.valuators.mask as *const c_uchar,
        raw.valuators.mask_len.max(0) as usize,
    );
    let mut dx = 0;
    let mut dy = 0;
    let mut value_index = 0;

    for valuator in 0..(mask.len() * 8) {
        if mask[valuator >> 3] & (1u8 << (valuator & 7)) == 0 {
            continue;
        }
        let value = *raw.raw_values.add(value_index);
        match valuator {
            0 => dx = value as i32,
            1 => dy = value as i32,
            _ => {}
        }
        value_index += 1;
    }

    (dx, dy)
}

#[cfg(test)]
mod tests {
    use super::is_text_char;

    #[test]
    fn test_editing_controls_count_as_text() {
        assert!(is_text_char('a'));
        assert!(is_text_char('é'));
        assert!(is_text_char('\r'));
        assert!(is_text_char('\n'));
        assert!(is_text_char('\t'));
        assert!(is_text_char('\u{8}'));

        assert!(!is_text_char('\u{1b}'));
        assert!(!is_text_char('\u{7f}'));
    }
}
