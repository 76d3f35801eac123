//! Normalized events and the event source contract
//!
//! Every native notification a backend pumps maps to at most one [`Event`].
//! Events preserve the arrival order of the underlying native events; the
//! only coalescing permitted is whatever the native backend itself performs
//! before delivery.

use crate::input::{Key, Modifiers, MouseButton};
use crate::window::WindowHandle;

/// Backend-agnostic event, discriminated by variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// The user requested the window be closed.
    WindowClose { window: WindowHandle },
    /// The client area changed size. Emitted once per distinct size.
    WindowResize { window: WindowHandle, width: i32, height: i32 },
    /// The window moved. Suppressed while a resize gesture is in progress.
    WindowMove { window: WindowHandle, x: i32, y: i32 },
    /// The window transitioned to the maximized show state.
    WindowMaximize { window: WindowHandle, width: i32, height: i32 },
    /// The window transitioned to the minimized show state.
    WindowMinimize { window: WindowHandle, width: i32, height: i32 },
    /// The window returned to the restored show state.
    WindowRestore { window: WindowHandle, width: i32, height: i32 },
    /// The window gained input focus.
    FocusGained { window: WindowHandle },
    /// The window lost input focus. The input snapshot is cleared first.
    FocusLost { window: WindowHandle },

    KeyDown { window: WindowHandle, key: Key, modifiers: Modifiers },
    KeyUp { window: WindowHandle, key: Key, modifiers: Modifiers },
    /// A composed character from the platform input method, distinct from
    /// the raw key transition that produced it.
    KeyChar { window: WindowHandle, key: Key, modifiers: Modifiers, chr: char },

    /// Unaccelerated relative motion. Also accumulates into the snapshot's
    /// delta fields.
    RawMouseMotion { window: WindowHandle, dx: i32, dy: i32 },
    /// Cursor motion within the client area, in client coordinates.
    MouseMove { window: WindowHandle, x: i32, y: i32 },
    MouseEnter { window: WindowHandle },
    MouseLeave { window: WindowHandle },
    /// Wheel motion: `dz` vertical detents, `dw` horizontal.
    MouseWheel { window: WindowHandle, x: i32, y: i32, dz: i32, dw: i32 },
    MouseDown { window: WindowHandle, button: MouseButton, x: i32, y: i32 },
    MouseUp { window: WindowHandle, button: MouseButton, x: i32, y: i32 },
}

impl Event {
    /// The window this event concerns.
    pub fn window(&self) -> WindowHandle {
        match *self {
            Event::WindowClose { window }
            | Event::WindowResize { window, .. }
            | Event::WindowMove { window, .. }
            | Event::WindowMaximize { window, .. }
            | Event::WindowMinimize { window, .. }
            | Event::WindowRestore { window, .. }
            | Event::FocusGained { window }
            | Event::FocusLost { window }
            | Event::KeyDown { window, .. }
            | Event::KeyUp { window, .. }
            | Event::KeyChar { window, .. }
            | Event::RawMouseMotion { window, .. }
            | Event::MouseMove { window, .. }
            | Event::MouseEnter { window }
            | Event::MouseLeave { window }
            | Event::MouseWheel { window, .. }
            | Event::MouseDown { window, .. }
            | Event::MouseUp { window, .. } => window,
        }
    }
}

/// The polling/blocking event queue a backend exposes.
///
/// Pumping is thread-affine: exactly one event-consuming thread per process,
/// the same thread that created the platform. Unrecognized or non-semantic
/// native events are absorbed silently and pumping continues.
pub trait EventSource {
    /// Block until one normalized event is available, pumping and discarding
    /// native events that do not map to one. Never busy-spins; unblocked
    /// only by a native event actually arriving.
    fn wait_event(&mut self) -> Event;

    /// Pump at most the currently queued native events and return the first
    /// that maps to a normalized event, or `None` without blocking.
    /// Repeated calls drain the queue in arrival order.
    fn peek_event(&mut self) -> Option<Event>;

    /// Drain the queue: zero the snapshot's relative-motion accumulator,
    /// then call [`peek_event`](Self::peek_event) until it returns `None`.
    fn poll_events(&mut self);

    /// Post an application-defined event onto the queue. Posted events are
    /// retrieved before any not-yet-pumped native event; the application
    /// uses this to synthesize a wake or close event for a loop blocked in
    /// [`wait_event`](Self::wait_event).
    fn post_event(&mut self, event: Event);
}
