//! Keysym and button-code translation
//!
//! X keysyms already distinguish left and right modifier keys, so no
//! scan-code disambiguation is needed here; the index-0 (unshifted) keysym
//! gives a layout-independent identity for letters and digits.

use fenestra_platform::{InputSnapshot, Key, Modifiers, MouseButton};
use x11_dl::keysym;
use x11_dl::xlib;

/// Map an unshifted keysym to the normalized key identity. Unmapped
/// keysyms collapse to [`Key::Unknown`].
pub fn key_from_keysym(keysym: xlib::KeySym) -> Key {
    match keysym as u32 {
        keysym::XK_a => Key::A,
        keysym::XK_b => Key::B,
        keysym::XK_c => Key::C,
        keysym::XK_d => Key::D,
        keysym::XK_e => Key::E,
        keysym::XK_f => Key::F,
        keysym::XK_g => Key::G,
        keysym::XK_h => Key::H,
        keysym::XK_i => Key::I,
        keysym::XK_j => Key::J,
        keysym::XK_k => Key::K,
        keysym::XK_l => Key::L,
        keysym::XK_m => Key::M,
        keysym::XK_n => Key::N,
        keysym::XK_o => Key::O,
        keysym::XK_p => Key::P,
        keysym::XK_q => Key::Q,
        keysym::XK_r => Key::R,
        keysym::XK_s => Key::S,
        keysym::XK_t => Key::T,
        keysym::XK_u => Key::U,
        keysym::XK_v => Key::V,
        keysym::XK_w => Key::W,
        keysym::XK_x => Key::X,
        keysym::XK_y => Key::Y,
        keysym::XK_z => Key::Z,

        keysym::XK_0 => Key::Num0,
        keysym::XK_1 => Key::Num1,
        keysym::XK_2 => Key::Num2,
        keysym::XK_3 => Key::Num3,
        keysym::XK_4 => Key::Num4,
        keysym::XK_5 => Key::Num5,
        keysym::XK_6 => Key::Num6,
        keysym::XK_7 => Key::Num7,
        keysym::XK_8 => Key::Num8,
        keysym::XK_9 => Key::Num9,

        keysym::XK_F1 => Key::F1,
        keysym::XK_F2 => Key::F2,
        keysym::XK_F3 => Key::F3,
        keysym::XK_F4 => Key::F4,
        keysym::XK_F5 => Key::F5,
        keysym::XK_F6 => Key::F6,
        keysym::XK_F7 => Key::F7,
        keysym::XK_F8 => Key::F8,
        keysym::XK_F9 => Key::F9,
        keysym::XK_F10 => Key::F10,
        keysym::XK_F11 => Key::F11,
        keysym::XK_F12 => Key::F12,

        keysym::XK_Escape => Key::Escape,
        keysym::XK_Tab => Key::Tab,
        keysym::XK_Caps_Lock => Key::CapsLock,
        keysym::XK_Shift_L => Key::LShift,
        keysym::XK_Shift_R => Key::RShift,
        keysym::XK_Control_L => Key::LCtrl,
        keysym::XK_Control_R => Key::RCtrl,
        keysym::XK_Alt_L => Key::LAlt,
        // Non-US layouts deliver right Alt as AltGr (level-3 shift); it is
        // the same physical key and keeps the RAlt identity.
        keysym::XK_Alt_R | keysym::XK_ISO_Level3_Shift => Key::RAlt,
        keysym::XK_Super_L => Key::LSuper,
        keysym::XK_Super_R => Key::RSuper,
        keysym::XK_Menu => Key::Menu,
        keysym::XK_space => Key::Space,
        keysym::XK_Return => Key::Enter,
        keysym::XK_BackSpace => Key::Backspace,
        keysym::XK_Insert => Key::Insert,
        keysym::XK_Delete => Key::Delete,
        keysym::XK_Home => Key::Home,
        keysym::XK_End => Key::End,
        keysym::XK_Page_Up => Key::PageUp,
        keysym::XK_Page_Down => Key::PageDown,
        keysym::XK_Print => Key::PrintScreen,
        keysym::XK_Scroll_Lock => Key::ScrollLock,
        keysym::XK_Pause => Key::Pause,

        keysym::XK_Left => Key::Left,
        keysym::XK_Right => Key::Right,
        keysym::XK_Up => Key::Up,
        keysym::XK_Down => Key::Down,

        keysym::XK_Num_Lock => Key::NumLock,
        keysym::XK_KP_0 | keysym::XK_KP_Insert => Key::Numpad0,
        keysym::XK_KP_1 | keysym::XK_KP_End => Key::Numpad1,
        keysym::XK_KP_2 | keysym::XK_KP_Down => Key::Numpad2,
        keysym::XK_KP_3 | keysym::XK_KP_Page_Down => Key::Numpad3,
        keysym::XK_KP_4 | keysym::XK_KP_Left => Key::Numpad4,
        keysym::XK_KP_5 | keysym::XK_KP_Begin => Key::Numpad5,
        keysym::XK_KP_6 | keysym::XK_KP_Right => Key::Numpad6,
        keysym::XK_KP_7 | keysym::XK_KP_Home => Key::Numpad7,
        keysym::XK_KP_8 | keysym::XK_KP_Up => Key::Numpad8,
        keysym::XK_KP_9 | keysym::XK_KP_Page_Up => Key::Numpad9,
        keysym::XK_KP_Add => Key::NumpadAdd,
        keysym::XK_KP_Subtract => Key::NumpadSubtract,
        keysym::XK_KP_Multiply => Key::NumpadMultiply,
        keysym::XK_KP_Divide => Key::NumpadDivide,
        keysym::XK_KP_Decimal | keysym::XK_KP_Delete => Key::NumpadDecimal,
        keysym::XK_KP_Enter => Key::NumpadEnter,

        keysym::XK_semicolon => Key::Semicolon,
        keysym::XK_equal => Key::Equal,
        keysym::XK_comma => Key::Comma,
        keysym::XK_minus => Key::Minus,
        keysym::XK_period => Key::Period,
        keysym::XK_slash => Key::Slash,
        keysym::XK_grave => Key::Grave,
        keysym::XK_bracketleft => Key::LeftBracket,
        keysym::XK_backslash => Key::Backslash,
        keysym::XK_bracketright => Key::RightBracket,
        keysym::XK_apostrophe => Key::Apostrophe,

        _ => Key::Unknown,
    }
}

/// Wheel or button classification for a core-protocol button code.
pub enum ButtonAction {
    Button(MouseButton),
    /// Vertical wheel detents (positive = away from the user).
    WheelVertical(i32),
    /// Horizontal wheel detents.
    WheelHorizontal(i32),
    Ignored,
}

/// Core-protocol button codes: 1/2/3 are left/middle/right, 4..7 encode
/// the wheel, 8/9 are the side buttons.
pub fn classify_button(code: u32) -> ButtonAction {
    match code {
        1 => ButtonAction::Button(MouseButton::Left),
        2 => ButtonAction::Button(MouseButton::Middle),
        3 => ButtonAction::Button(MouseButton::Right),
        4 => ButtonAction::WheelVertical(1),
        5 => ButtonAction::WheelVertical(-1),
        6 => ButtonAction::WheelHorizontal(-1),
        7 => ButtonAction::WheelHorizontal(1),
        8 => ButtonAction::Button(MouseButton::X1),
        9 => ButtonAction::Button(MouseButton::X2),
        _ => ButtonAction::Ignored,
    }
}

/// Recompute the modifier bitset from the snapshot's key table plus the
/// lock bits of a native event's state mask. Key transitions drive the
/// sided bits; the server's mask is authoritative only for the latched
/// locks, which have no reliable key-up.
pub fn modifiers_from_state(snapshot: &InputSnapshot, native_state: u32) -> Modifiers {
    let mut mods = Modifiers::empty();

    let sided = [
        (Key::LShift, Modifiers::LSHIFT, Modifiers::SHIFT),
        (Key::RShift, Modifiers::RSHIFT, Modifiers::SHIFT),
        (Key::LCtrl, Modifiers::LCTRL, Modifiers::CTRL),
        (Key::RCtrl, Modifiers::RCTRL, Modifiers::CTRL),
        (Key::LAlt, Modifiers::LALT, Modifiers::ALT),
        (Key::RAlt, Modifiers::RALT, Modifiers::ALT),
        (Key::LSuper, Modifiers::LSUPER, Modifiers::empty()),
        (Key::RSuper, Modifiers::RSUPER, Modifiers::empty()),
        (Key::Menu, Modifiers::MENU, Modifiers::empty()),
    ];
    for (key, side_bit, combined_bit) in sided {
        if snapshot.key_state(key) {
            mods |= side_bit | combined_bit;
        }
    }

    if native_state & xlib::LockMask != 0 {
        mods |= Modifiers::CAPS_LOCK;
    }
    if native_state & xlib::Mod2Mask != 0 {
        mods |= Modifiers::NUM_LOCK;
    }

    mods
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keysym_mapping_distinguishes_sides() {
        assert_eq!(key_from_keysym(keysym::XK_Shift_L as xlib::KeySym), Key::LShift);
        assert_eq!(key_from_keysym(keysym::XK_Shift_R as xlib::KeySym), Key::RShift);
        assert_ne!(
            key_from_keysym(keysym::XK_Control_L as xlib::KeySym),
            key_from_keysym(keysym::XK_Control_R as xlib::KeySym)
        );
    }

    #[test]
    fn test_altgr_keysym_is_right_alt() {
        assert_eq!(key_from_keysym(keysym::XK_ISO_Level3_Shift as xlib::KeySym), Key::RAlt);
        assert_eq!(key_from_keysym(keysym::XK_Alt_R as xlib::KeySym), Key::RAlt);

        // Holding AltGr must raise the combined Alt bit like any right Alt.
        let mut snap = InputSnapshot::new();
        snap.set_key(key_from_keysym(keysym::XK_ISO_Level3_Shift as xlib::KeySym), true);
        let mods = modifiers_from_state(&snap, 0);
        assert!(mods.contains(Modifiers::ALT | Modifiers::RALT));
    }

    #[test]
    fn test_unmapped_keysym_is_unknown() {
        assert_eq!(key_from_keysym(0), Key::Unknown);
        assert_eq!(key_from_keysym(keysym::XK_ydiaeresis as xlib::KeySym), Key::Unknown);
    }

    #[test]
    fn test_numpad_keysyms_fold_by_position() {
        assert_eq!(key_from_keysym(keysym::XK_KP_7 as xlib::KeySym), Key::Numpad7);
        assert_eq!(key_from_keysym(keysym::XK_KP_Home as xlib::KeySym), Key::Numpad7);
    }

    #[test]
    fn test_wheel_codes_are_not_buttons() {
        assert!(matches!(classify_button(4), ButtonAction::WheelVertical(1)));
        assert!(matches!(classify_button(5), ButtonAction::WheelVertical(-1)));
        assert!(matches!(classify_button(6), ButtonAction::WheelHorizontal(-1)));
        assert!(matches!(classify_button(7), ButtonAction::WheelHorizontal(1)));
        assert!(matches!(classify_button(1), ButtonAction::Button(MouseButton::Left)));
        assert!(matches!(classify_button(10), ButtonAction::Ignored));
    }

    #[test]
    fn test_modifiers_combine_sided_bits() {
        let mut snap = InputSnapshot::new();
        snap.set_key(Key::LShift, true);
        snap.set_key(Key::RCtrl, true);

        let mods = modifiers_from_state(&snap, 0);
        assert!(mods.contains(Modifiers::SHIFT | Modifiers::LSHIFT));
        assert!(mods.contains(Modifiers::CTRL | Modifiers::RCTRL));
        assert!(!mods.contains(Modifiers::RSHIFT));
        assert!(!mods.contains(Modifiers::ALT));
    }

    #[test]
    fn test_lock_bits_come_from_native_mask() {
        let snap = InputSnapshot::new();
        let mods = modifiers_from_state(&snap, xlib::LockMask | xlib::Mod2Mask);
        assert!(mods.contains(Modifiers::CAPS_LOCK | Modifiers::NUM_LOCK));
    }
}
