//! Window handles, per-window state, and the window side table
//!
//! Native window handles are opaque; everything this layer needs to know
//! about a window lives in a [`WindowState`] record kept in a [`WindowStore`]
//! side table keyed by handle identity. Entries are inserted when native
//! creation succeeds and removed exactly when the native window is
//! destroyed; every lookup is guarded so a notification that races window
//! destruction degrades to a no-op instead of a crash.
//!
//! The cross-cutting translation rules that backends share (resize dedup,
//! move suppression during a resize gesture, show-state edge derivation,
//! client-area scoping) are methods here so each backend's dispatch stays a
//! plain match on native event tags.

use std::any::Any;

use bitflags::bitflags;
use rustc_hash::FxHashMap;

/// Position/size sentinel: center within the containing screen.
pub const CENTER: i32 = i32::MIN;
/// Position/size sentinel: keep the current value.
pub const CURRENT: i32 = i32::MIN + 1;
/// Size sentinel: stretch to the edge of the containing screen.
pub const STRETCH: i32 = i32::MIN + 2;

/// Opaque native window handle (an XID on X11).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(u64);

impl WindowHandle {
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

bitflags! {
    /// Window decoration flags. A dialog (fixed-size, decorated) window is
    /// the empty set; the default is resizable and decorated.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u32 {
        const RESIZABLE  = 1 << 0;
        const BORDERLESS = 1 << 1;
        const FULLSCREEN = 1 << 2;
    }
}

impl Default for WindowFlags {
    fn default() -> Self {
        WindowFlags::RESIZABLE
    }
}

/// An integer rectangle, client-area semantics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether the point lies inside this rectangle.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Edge grabbed during a manual resize gesture, on backends whose
/// undecorated windows implement their own frame handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResizeEdge {
    #[default]
    None,
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Window show state as observed from native notifications.
///
/// Native notifications report the level, not the edge; the translator
/// stores the last observed state and derives maximize/minimize/restore
/// events from transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShowState {
    #[default]
    Restored,
    Minimized,
    Maximized,
}

/// Derived window-state event kind produced by a show-state transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowStateChange {
    Maximized,
    Minimized,
    Restored,
}

/// The show-state transition table: `(last, observed) -> optional event`.
///
/// A window starts in `Restored` with no event; re-observing the current
/// state is never an edge.
pub fn show_state_transition(last: ShowState, observed: ShowState) -> Option<ShowStateChange> {
    if last == observed {
        return None;
    }

    match observed {
        ShowState::Minimized => Some(ShowStateChange::Minimized),
        ShowState::Maximized => Some(ShowStateChange::Maximized),
        ShowState::Restored => Some(ShowStateChange::Restored),
    }
}

/// Window creation parameters.
///
/// Position and size accept the [`CENTER`]/[`CURRENT`]/[`STRETCH`]
/// sentinels with the same meaning as a move request.
#[derive(Clone, Debug)]
pub struct WindowConfig {
    pub title: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub flags: WindowFlags,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Fenestra Window".to_string(),
            x: CENTER,
            y: CENTER,
            width: 800,
            height: 600,
            flags: WindowFlags::default(),
        }
    }
}

impl WindowConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Default::default() }
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Per-window mutable state, attached out-of-band to the native handle.
pub struct WindowState {
    /// Client-area geometry, backend-normalized.
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub flags: WindowFlags,
    /// Whether the window is currently mapped/shown.
    pub visible: bool,

    /// Transient interaction state for manual drag/resize gestures.
    /// Gestures are begun by the application (it decides what counts as a
    /// grab region) and ended by the event translator on button release or
    /// focus loss.
    pub dragging: bool,
    pub resizing: bool,
    pub resize_edge: ResizeEdge,
    /// Last client-area cursor position the translator saw over this window.
    pub last_mouse: (i32, i32),

    was_closed: bool,
    was_resized: bool,
    original_rect: Option<Rect>,
    last_show_state: ShowState,

    user_data: Option<Box<dyn Any>>,
    properties: FxHashMap<String, Vec<u8>>,
}

impl WindowState {
    pub fn new(x: i32, y: i32, width: i32, height: i32, flags: WindowFlags) -> Self {
        Self {
            x,
            y,
            width,
            height,
            flags,
            visible: false,
            dragging: false,
            resizing: false,
            resize_edge: ResizeEdge::None,
            last_mouse: (0, 0),
            was_closed: false,
            was_resized: false,
            original_rect: None,
            last_show_state: ShowState::Restored,
            user_data: None,
            properties: FxHashMap::default(),
        }
    }

    /// Current client rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Whether a client-coordinate point lies inside the client area.
    #[inline]
    pub fn contains_client_point(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    // --- manual gestures ----------------------------------------------

    /// Begin an application-driven move gesture (undecorated windows
    /// implement their own title-bar dragging).
    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// Begin an application-driven resize gesture on the given edge. While
    /// active, move notifications are tracked but not promoted to events.
    pub fn begin_resize(&mut self, edge: ResizeEdge) {
        self.resizing = true;
        self.resize_edge = edge;
    }

    /// End any active gesture. Returns whether one was active. Called by
    /// the translator on button release and focus loss, where a gesture
    /// cannot continue.
    pub fn end_gesture(&mut self) -> bool {
        let active = self.dragging || self.resizing;
        self.dragging = false;
        self.resizing = false;
        self.resize_edge = ResizeEdge::None;
        active
    }

    // --- translation rules --------------------------------------------

    /// Apply a geometry-change notification's size. Returns `true` iff the
    /// size actually changed: duplicate notifications with an identical
    /// size are suppressed so OS-internal redraw storms do not surface.
    pub fn apply_resize(&mut self, width: i32, height: i32) -> bool {
        if width == self.width && height == self.height {
            return false;
        }

        self.width = width;
        self.height = height;
        self.was_resized = true;

        true
    }

    /// Apply a move notification's position. Returns `true` iff the window
    /// actually moved and no resize gesture is in progress; interactive
    /// edge-resizing generates spurious move notifications on some backends
    /// that must not surface.
    pub fn apply_move(&mut self, x: i32, y: i32) -> bool {
        if x == self.x && y == self.y {
            return false;
        }

        self.x = x;
        self.y = y;

        !self.resizing
    }

    /// Feed an observed show state through the transition table, updating
    /// the stored state and returning the derived edge, if any.
    pub fn observe_show_state(&mut self, observed: ShowState) -> Option<ShowStateChange> {
        let change = show_state_transition(self.last_show_state, observed);
        self.last_show_state = observed;
        change
    }

    pub fn show_state(&self) -> ShowState {
        self.last_show_state
    }

    // --- dirty flags (read-clears) ------------------------------------

    pub fn mark_closed(&mut self) {
        self.was_closed = true;
    }

    /// Read-clears: returns whether a close was requested since the last
    /// read, resetting the flag.
    pub fn take_was_closed(&mut self) -> bool {
        std::mem::take(&mut self.was_closed)
    }

    /// Read-clears: returns the current size if a resize occurred since the
    /// last read, resetting the flag.
    pub fn take_was_resized(&mut self) -> Option<(i32, i32)> {
        if !self.was_resized {
            return None;
        }

        self.was_resized = false;
        Some((self.width, self.height))
    }

    // --- fullscreen bookkeeping ---------------------------------------

    /// Record the pre-fullscreen rectangle and raise the fullscreen flags.
    /// Fullscreen implies borderless.
    pub fn enter_fullscreen(&mut self) {
        if self.flags.contains(WindowFlags::FULLSCREEN) {
            return;
        }

        self.original_rect = Some(self.rect());
        self.flags |= WindowFlags::FULLSCREEN | WindowFlags::BORDERLESS;
    }

    /// Drop the fullscreen flags and hand back the exact rectangle recorded
    /// when fullscreen was entered, regardless of intermediate resizes.
    pub fn leave_fullscreen(&mut self) -> Option<Rect> {
        self.flags &= !(WindowFlags::FULLSCREEN | WindowFlags::BORDERLESS);
        self.original_rect.take()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.flags.contains(WindowFlags::FULLSCREEN)
    }

    pub fn is_borderless(&self) -> bool {
        self.flags.contains(WindowFlags::BORDERLESS)
    }

    // --- user data and named properties -------------------------------

    pub fn set_user_data(&mut self, data: Box<dyn Any>) {
        self.user_data = Some(data);
    }

    pub fn user_data(&self) -> Option<&dyn Any> {
        self.user_data.as_deref()
    }

    pub fn user_data_mut(&mut self) -> Option<&mut dyn Any> {
        self.user_data.as_deref_mut()
    }

    pub fn take_user_data(&mut self) -> Option<Box<dyn Any>> {
        self.user_data.take()
    }

    /// Set a named byte-blob property, overwriting any previous value.
    pub fn set_property(&mut self, name: &str, value: &[u8]) {
        self.properties.insert(name.to_owned(), value.to_vec());
    }

    /// Look up a named property. Absence is not an error.
    pub fn property(&self, name: &str) -> Option<&[u8]> {
        self.properties.get(name).map(Vec::as_slice)
    }

    /// Remove a named property, freeing its storage.
    pub fn remove_property(&mut self, name: &str) {
        self.properties.remove(name);
    }
}

/// Side table mapping native handles to their state records.
///
/// An entry's lifetime is bound 1:1 to the native window: inserted when
/// creation succeeds, removed when the window is destroyed. Lookups on a
/// stale handle return `None` rather than panicking.
#[derive(Default)]
pub struct WindowStore {
    entries: FxHashMap<WindowHandle, WindowState>,
}

impl WindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: WindowHandle, state: WindowState) {
        self.entries.insert(handle, state);
    }

    pub fn remove(&mut self, handle: WindowHandle) -> Option<WindowState> {
        self.entries.remove(&handle)
    }

    pub fn get(&self, handle: WindowHandle) -> Option<&WindowState> {
        self.entries.get(&handle)
    }

    pub fn get_mut(&mut self, handle: WindowHandle) -> Option<&mut WindowState> {
        self.entries.get_mut(&handle)
    }

    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = WindowHandle> + '_ {
        self.entries.keys().copied()
    }
}

/// Resolve a move request's sentinels against the current rectangle and the
/// containing screen.
///
/// `CURRENT` leaves an axis unchanged; `STRETCH` extends width/height to the
/// edge of the containing screen; `CENTER` centers within the containing
/// screen, computed from the target size after size resolution. The screen
/// is looked up from the resolved position, which is why `screen_at` is a
/// callback rather than a pre-resolved rectangle.
pub fn resolve_move_request(
    current: Rect,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    screen_at: impl FnOnce(i32, i32) -> Rect,
) -> Rect {
    let new_x = if x == CURRENT || x == CENTER { current.x } else { x };
    let new_y = if y == CURRENT || y == CENTER { current.y } else { y };

    let screen = screen_at(new_x, new_y);

    let mut new_width = if width == CURRENT || width == STRETCH {
        current.width
    } else {
        width
    };
    let mut new_height = if height == CURRENT || height == STRETCH {
        current.height
    } else {
        height
    };

    if width == STRETCH {
        new_width = screen.x + screen.width - new_x;
    }
    if height == STRETCH {
        new_height = screen.y + screen.height - new_y;
    }

    // Centering happens after size resolution on purpose.
    let new_x = if x == CENTER {
        screen.x + (screen.width - new_width) / 2
    } else {
        new_x
    };
    let new_y = if y == CENTER {
        screen.y + (screen.height - new_height) / 2
    } else {
        new_y
    };

    Rect::new(new_x, new_y, new_width, new_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> WindowState {
        WindowState::new(100, 100, 800, 600, WindowFlags::default())
    }

    #[test]
    fn test_sentinels_are_distinct_and_out_of_range() {
        assert_ne!(CENTER, CURRENT);
        assert_ne!(CURRENT, STRETCH);
        assert_ne!(CENTER, STRETCH);
        // No legal coordinate collides with a sentinel.
        assert!(CENTER < -(1 << 24) && CURRENT < -(1 << 24) && STRETCH < -(1 << 24));
    }

    #[test]
    fn test_resize_dedup_one_event_per_distinct_size() {
        let mut st = state();
        let sizes = [(800, 600), (1024, 768), (1024, 768), (1024, 768), (640, 480), (640, 480)];

        let mut emitted = Vec::new();
        for (w, h) in sizes {
            if st.apply_resize(w, h) {
                emitted.push((w, h));
            }
        }

        assert_eq!(emitted, vec![(1024, 768), (640, 480)]);
    }

    #[test]
    fn test_was_closed_read_clears() {
        let mut st = state();
        assert!(!st.take_was_closed());

        st.mark_closed();
        assert!(st.take_was_closed());
        assert!(!st.take_was_closed());

        st.mark_closed();
        assert!(st.take_was_closed());
    }

    #[test]
    fn test_was_resized_read_clears_with_size() {
        let mut st = state();
        assert_eq!(st.take_was_resized(), None);

        st.apply_resize(1280, 720);
        assert_eq!(st.take_was_resized(), Some((1280, 720)));
        assert_eq!(st.take_was_resized(), None);
    }

    #[test]
    fn test_move_suppressed_during_resize_gesture() {
        let mut st = state();
        st.begin_resize(ResizeEdge::Right);

        // The position is still tracked, but no event is promoted.
        assert!(!st.apply_move(150, 150));
        assert_eq!((st.x, st.y), (150, 150));

        st.end_gesture();
        assert!(st.apply_move(200, 200));
        assert!(!st.apply_move(200, 200));
    }

    #[test]
    fn test_gesture_ends_once() {
        let mut st = state();
        assert!(!st.end_gesture());

        st.begin_drag();
        assert!(st.dragging);
        assert!(st.end_gesture());
        assert!(!st.end_gesture());

        st.begin_resize(ResizeEdge::BottomRight);
        assert_eq!(st.resize_edge, ResizeEdge::BottomRight);
        assert!(st.end_gesture());
        assert!(!st.resizing);
        assert_eq!(st.resize_edge, ResizeEdge::None);
    }

    #[test]
    fn test_show_state_transition_table() {
        use ShowState::*;
        use ShowStateChange as C;

        assert_eq!(show_state_transition(Restored, Restored), None);
        assert_eq!(show_state_transition(Restored, Maximized), Some(C::Maximized));
        assert_eq!(show_state_transition(Restored, Minimized), Some(C::Minimized));
        assert_eq!(show_state_transition(Maximized, Minimized), Some(C::Minimized));
        assert_eq!(show_state_transition(Minimized, Maximized), Some(C::Maximized));
        assert_eq!(show_state_transition(Maximized, Restored), Some(C::Restored));
        assert_eq!(show_state_transition(Minimized, Restored), Some(C::Restored));
        assert_eq!(show_state_transition(Minimized, Minimized), None);
    }

    #[test]
    fn test_initial_show_state_emits_no_event() {
        let mut st = state();
        // Window creation reports the restored level; not an edge.
        assert_eq!(st.observe_show_state(ShowState::Restored), None);
        assert_eq!(st.observe_show_state(ShowState::Maximized), Some(ShowStateChange::Maximized));
    }

    #[test]
    fn test_fullscreen_restores_exact_rect() {
        let mut st = state();
        st.enter_fullscreen();
        assert!(st.is_fullscreen());
        assert!(st.is_borderless());

        // Intermediate resizes while fullscreen must not disturb the saved rect.
        st.apply_resize(1920, 1080);
        st.apply_move(0, 0);

        let restored = st.leave_fullscreen();
        assert_eq!(restored, Some(Rect::new(100, 100, 800, 600)));
        assert!(!st.is_fullscreen());
        assert!(!st.is_borderless());

        // Leaving again has nothing to restore.
        assert_eq!(st.leave_fullscreen(), None);
    }

    #[test]
    fn test_enter_fullscreen_twice_keeps_first_rect() {
        let mut st = state();
        st.enter_fullscreen();
        st.apply_resize(1920, 1080);
        st.enter_fullscreen();

        assert_eq!(st.leave_fullscreen(), Some(Rect::new(100, 100, 800, 600)));
    }

    #[test]
    fn test_client_point_scoping() {
        let st = state();
        assert!(st.contains_client_point(0, 0));
        assert!(st.contains_client_point(799, 599));
        assert!(!st.contains_client_point(800, 599));
        assert!(!st.contains_client_point(-1, 10));
    }

    #[test]
    fn test_properties_replace_on_set_absent_is_none() {
        let mut st = state();
        assert_eq!(st.property("vsync"), None);

        st.set_property("vsync", &[1]);
        assert_eq!(st.property("vsync"), Some(&[1u8][..]));

        st.set_property("vsync", &[0, 2]);
        assert_eq!(st.property("vsync"), Some(&[0u8, 2][..]));

        st.remove_property("vsync");
        assert_eq!(st.property("vsync"), None);
        // Removing an absent property is a no-op.
        st.remove_property("vsync");
    }

    #[test]
    fn test_user_data_roundtrip() {
        let mut st = state();
        assert!(st.user_data().is_none());

        st.set_user_data(Box::new(42u32));
        assert_eq!(st.user_data().and_then(|d| d.downcast_ref::<u32>()), Some(&42));

        let taken = st.take_user_data().unwrap();
        assert_eq!(taken.downcast_ref::<u32>(), Some(&42));
        assert!(st.user_data().is_none());
    }

    #[test]
    fn test_store_guards_stale_handles() {
        let mut store = WindowStore::new();
        let handle = WindowHandle::from_raw(0x1234);

        assert!(store.get(handle).is_none());
        assert!(store.remove(handle).is_none());

        store.insert(handle, state());
        assert!(store.contains(handle));
        assert_eq!(store.len(), 1);

        let removed = store.remove(handle).unwrap();
        assert_eq!(removed.rect(), Rect::new(100, 100, 800, 600));
        assert!(store.is_empty());

        // A notification arriving after destruction finds nothing.
        assert!(store.get_mut(handle).is_none());
    }

    #[test]
    fn test_move_center_computed_from_target_size() {
        // 640x360 centered on a 1920x1080 screen at the origin.
        let screen = Rect::new(0, 0, 1920, 1080);
        let out = resolve_move_request(
            Rect::new(10, 20, 800, 600),
            CENTER,
            CENTER,
            640,
            360,
            |_, _| screen,
        );

        assert_eq!(out, Rect::new(640, 360, 640, 360));
    }

    #[test]
    fn test_move_current_leaves_axes_unchanged() {
        let screen = Rect::new(0, 0, 1920, 1080);
        let out = resolve_move_request(
            Rect::new(10, 20, 800, 600),
            CURRENT,
            CURRENT,
            CURRENT,
            CURRENT,
            |_, _| screen,
        );

        assert_eq!(out, Rect::new(10, 20, 800, 600));
    }

    #[test]
    fn test_move_stretch_extends_to_screen_edge() {
        let screen = Rect::new(0, 0, 1920, 1080);
        let out = resolve_move_request(
            Rect::new(100, 200, 800, 600),
            CURRENT,
            CURRENT,
            STRETCH,
            STRETCH,
            |_, _| screen,
        );

        assert_eq!(out, Rect::new(100, 200, 1820, 880));
    }

    #[test]
    fn test_move_center_on_offset_screen() {
        // The containing screen need not sit at the origin.
        let screen = Rect::new(1920, 0, 1280, 1024);
        let out = resolve_move_request(
            Rect::new(2000, 50, 640, 480),
            CENTER,
            CENTER,
            CURRENT,
            CURRENT,
            |_, _| screen,
        );

        assert_eq!(out, Rect::new(1920 + (1280 - 640) / 2, (1024 - 480) / 2, 640, 480));
    }
}
