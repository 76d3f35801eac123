//! Input types and the process-wide input snapshot
//!
//! The [`InputSnapshot`] mirrors the most recent state the event translator
//! has observed: absolute cursor position, the relative-motion accumulator,
//! button and key down-state tables, and the modifier bitset. It is written
//! exclusively by the event translator as a side effect of classifying
//! native events and is read-only to every other component. Like the native
//! event queues it shadows, it is bound to the single event-pumping thread.

use bitflags::bitflags;

/// Number of slots in the key down-state table.
pub const KEY_STATE_COUNT: usize = 512;

/// Number of tracked mouse buttons.
pub const MOUSE_BUTTON_COUNT: usize = 5;

/// Backend-agnostic key identity.
///
/// Left/right variants of Shift, Control, Alt and Super are distinct: the
/// backend disambiguates them from the generic virtual key where the native
/// API collapses them (scan-code / extended-flag inspection). Discriminants
/// index directly into the snapshot's down-state table.
#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Unknown = 0,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,

    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    Escape,
    Tab,
    CapsLock,
    LShift,
    RShift,
    LCtrl,
    RCtrl,
    LAlt,
    RAlt,
    LSuper,
    RSuper,
    Menu,
    Space,
    Enter,
    Backspace,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    PrintScreen,
    ScrollLock,
    Pause,

    Left,
    Right,
    Up,
    Down,

    NumLock,
    Numpad0, Numpad1, Numpad2, Numpad3, Numpad4,
    Numpad5, Numpad6, Numpad7, Numpad8, Numpad9,
    NumpadAdd,
    NumpadSubtract,
    NumpadMultiply,
    NumpadDivide,
    NumpadDecimal,
    NumpadEnter,

    Semicolon,
    Equal,
    Comma,
    Minus,
    Period,
    Slash,
    Grave,
    LeftBracket,
    Backslash,
    RightBracket,
    Apostrophe,
}

impl Key {
    /// Index of this key in the snapshot's down-state table.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Mouse buttons, in the order they index the snapshot's down-state table.
#[repr(usize)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left = 0,
    Middle,
    Right,
    X1,
    X2,
}

impl MouseButton {
    /// Index of this button in the snapshot's down-state table.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// Modifier key bitset.
    ///
    /// The side-agnostic `SHIFT`/`CTRL`/`ALT` bits are set whenever either
    /// side is down; the sided bits record which one.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        const SHIFT       = 1 << 0;
        const CTRL        = 1 << 1;
        const ALT         = 1 << 2;
        const LSHIFT      = 1 << 3;
        const RSHIFT      = 1 << 4;
        const LCTRL       = 1 << 5;
        const RCTRL       = 1 << 6;
        const LALT        = 1 << 7;
        const RALT        = 1 << 8;
        const LSUPER      = 1 << 9;
        const RSUPER      = 1 << 10;
        const MENU        = 1 << 11;
        const NUM_LOCK    = 1 << 12;
        const SCROLL_LOCK = 1 << 13;
        const CAPS_LOCK   = 1 << 14;
    }
}

/// Process-wide input state, maintained by the event translator.
pub struct InputSnapshot {
    mouse_x: i32,
    mouse_y: i32,
    mouse_dx: i32,
    mouse_dy: i32,
    buttons: [bool; MOUSE_BUTTON_COUNT],
    keys: [bool; KEY_STATE_COUNT],
    modifiers: Modifiers,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            mouse_x: 0,
            mouse_y: 0,
            mouse_dx: 0,
            mouse_dy: 0,
            buttons: [false; MOUSE_BUTTON_COUNT],
            keys: [false; KEY_STATE_COUNT],
            modifiers: Modifiers::empty(),
        }
    }
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last cursor position reported inside a window's client area.
    #[inline]
    pub fn mouse_position(&self) -> (i32, i32) {
        (self.mouse_x, self.mouse_y)
    }

    /// Relative motion accumulated since the start of the current poll batch.
    #[inline]
    pub fn mouse_delta(&self) -> (i32, i32) {
        (self.mouse_dx, self.mouse_dy)
    }

    /// Whether the given button is currently held.
    #[inline]
    pub fn button_state(&self, button: MouseButton) -> bool {
        self.buttons[button.index()]
    }

    /// Whether the given key is currently held.
    #[inline]
    pub fn key_state(&self, key: Key) -> bool {
        self.keys[key.index()]
    }

    /// Current modifier bitset.
    #[inline]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Whether every bit in `mods` is currently set.
    #[inline]
    pub fn modifier_state(&self, mods: Modifiers) -> bool {
        self.modifiers.contains(mods)
    }

    // --- translator-side mutators -------------------------------------
    //
    // Called only from the event translator while classifying native
    // events; applications use the read accessors above.

    pub fn set_mouse_position(&mut self, x: i32, y: i32) {
        self.mouse_x = x;
        self.mouse_y = y;
    }

    pub fn accumulate_motion(&mut self, dx: i32, dy: i32) {
        self.mouse_dx += dx;
        self.mouse_dy += dy;
    }

    pub fn set_button(&mut self, button: MouseButton, down: bool) {
        self.buttons[button.index()] = down;
    }

    /// Gate a button release on the recorded down-state: returns `true`
    /// and clears the flag iff the button was down. A release whose press
    /// was never recorded (or was cleared on focus loss) does not surface,
    /// which keeps down/up events paired even when the release arrives
    /// outside the client area.
    pub fn release_button(&mut self, button: MouseButton) -> bool {
        let was_down = self.buttons[button.index()];
        self.buttons[button.index()] = false;
        was_down
    }

    pub fn set_key(&mut self, key: Key, down: bool) {
        self.keys[key.index()] = down;
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Zero the relative-motion accumulator. Called at the start of each
    /// non-blocking poll batch (drain semantics: the delta is a per-frame
    /// accumulator, not a persistent value).
    pub fn begin_poll_batch(&mut self) {
        self.mouse_dx = 0;
        self.mouse_dy = 0;
    }

    /// Clear all down-state on focus loss. Native key-up events are not
    /// reliably delivered once focus is gone, so stuck state is dropped.
    pub fn clear_on_focus_loss(&mut self) {
        self.buttons = [false; MOUSE_BUTTON_COUNT];
        self.keys = [false; KEY_STATE_COUNT];
        self.modifiers = Modifiers::empty();
    }

    /// Clear the button table only (mouse left the window mid-drag).
    pub fn clear_buttons(&mut self) {
        self.buttons = [false; MOUSE_BUTTON_COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_indices_fit_state_table() {
        // The highest discriminant must index the 512-entry table.
        assert!(Key::Apostrophe.index() < KEY_STATE_COUNT);
        assert_eq!(Key::Unknown.index(), 0);
        assert_eq!(Key::A.index(), 1);
    }

    #[test]
    fn test_focus_loss_clears_all_state() {
        let mut snap = InputSnapshot::new();
        for key in [Key::A, Key::LShift, Key::NumpadEnter, Key::Apostrophe] {
            snap.set_key(key, true);
        }
        snap.set_button(MouseButton::Left, true);
        snap.set_button(MouseButton::X2, true);
        snap.set_modifiers(Modifiers::SHIFT | Modifiers::LSHIFT);

        snap.clear_on_focus_loss();

        for i in 0..KEY_STATE_COUNT {
            assert!(!snap.keys[i], "key slot {i} still down after focus loss");
        }
        assert!(!snap.button_state(MouseButton::Left));
        assert!(!snap.button_state(MouseButton::X2));
        assert_eq!(snap.modifiers(), Modifiers::empty());
    }

    #[test]
    fn test_motion_accumulates_until_batch_start() {
        let mut snap = InputSnapshot::new();
        snap.accumulate_motion(3, -2);
        snap.accumulate_motion(1, 5);
        assert_eq!(snap.mouse_delta(), (4, 3));

        snap.begin_poll_batch();
        assert_eq!(snap.mouse_delta(), (0, 0));
    }

    #[test]
    fn test_release_gated_on_down_state() {
        let mut snap = InputSnapshot::new();

        // Release without a recorded press does not surface.
        assert!(!snap.release_button(MouseButton::Left));

        // Down then up surfaces exactly once, even if the up repeats.
        snap.set_button(MouseButton::Left, true);
        assert!(snap.release_button(MouseButton::Left));
        assert!(!snap.release_button(MouseButton::Left));

        // Focus loss clears the press; the eventual up is swallowed.
        snap.set_button(MouseButton::Right, true);
        snap.clear_on_focus_loss();
        assert!(!snap.release_button(MouseButton::Right));
    }

    #[test]
    fn test_modifier_state_requires_all_bits() {
        let mut snap = InputSnapshot::new();
        snap.set_modifiers(Modifiers::CTRL | Modifiers::LCTRL);
        assert!(snap.modifier_state(Modifiers::CTRL));
        assert!(!snap.modifier_state(Modifiers::CTRL | Modifiers::SHIFT));
    }
}
