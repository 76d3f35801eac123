//! Screen registry and display modes
//!
//! Screens are enumerated once at platform initialization and held in a
//! fixed registry; the first entry is the default screen. Each screen
//! carries its virtual-desktop rectangle and the list of display modes the
//! backend discovered for it, with the mode active at enumeration time
//! marked current.

use crate::window::Rect;

/// One display mode a screen supports. `native` is the backend's token for
/// the mode (an XRandR mode XID on X11) and is meaningless across backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayMode {
    pub width: i32,
    pub height: i32,
    pub bits_per_pixel: i32,
    pub refresh_rate: i32,
    pub native: u64,
}

/// One physical screen in virtual-desktop coordinates.
#[derive(Clone, Debug)]
pub struct Screen {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub name: String,
    pub modes: Vec<DisplayMode>,
    /// Index into `modes` of the mode active at enumeration time.
    pub current_mode: usize,
}

impl Screen {
    /// This screen's rectangle in virtual-desktop coordinates.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// The mode active at enumeration time.
    pub fn mode(&self) -> Option<&DisplayMode> {
        self.modes.get(self.current_mode)
    }

    /// Find the index of a mode matching the requested geometry. Depth and
    /// refresh rate are tie-breakers only when the caller asks for them
    /// (non-zero).
    pub fn select_mode(
        &self,
        width: i32,
        height: i32,
        bits_per_pixel: i32,
        refresh_rate: i32,
    ) -> Option<usize> {
        self.modes.iter().position(|m| {
            m.width == width
                && m.height == height
                && (bits_per_pixel == 0 || m.bits_per_pixel == bits_per_pixel)
                && (refresh_rate == 0 || m.refresh_rate == refresh_rate)
        })
    }
}

/// The default screen: the first enumerated, or a degenerate fallback when
/// enumeration produced nothing.
pub fn default_screen(screens: &[Screen]) -> Rect {
    screens.first().map(Screen::rect).unwrap_or_default()
}

/// The screen containing the point, falling back to the default screen for
/// positions outside every screen (dragged off-desktop or sentinel-derived).
pub fn screen_from_position(screens: &[Screen], x: i32, y: i32) -> Rect {
    screens
        .iter()
        .find(|s| s.rect().contains(x, y))
        .map(Screen::rect)
        .unwrap_or_else(|| default_screen(screens))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dual_head() -> Vec<Screen> {
        vec![
            Screen {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
                name: "HDMI-1".into(),
                modes: vec![
                    DisplayMode { width: 1920, height: 1080, bits_per_pixel: 32, refresh_rate: 60, native: 71 },
                    DisplayMode { width: 1920, height: 1080, bits_per_pixel: 32, refresh_rate: 144, native: 72 },
                    DisplayMode { width: 1280, height: 720, bits_per_pixel: 32, refresh_rate: 60, native: 73 },
                ],
                current_mode: 0,
            },
            Screen {
                x: 1920,
                y: 0,
                width: 1280,
                height: 1024,
                name: "DP-1".into(),
                modes: vec![DisplayMode { width: 1280, height: 1024, bits_per_pixel: 32, refresh_rate: 75, native: 80 }],
                current_mode: 0,
            },
        ]
    }

    #[test]
    fn test_screen_lookup_by_position() {
        let screens = dual_head();
        assert_eq!(screen_from_position(&screens, 10, 10), Rect::new(0, 0, 1920, 1080));
        assert_eq!(screen_from_position(&screens, 2000, 500), Rect::new(1920, 0, 1280, 1024));
        // Boundary: the first pixel of the second screen.
        assert_eq!(screen_from_position(&screens, 1920, 0), Rect::new(1920, 0, 1280, 1024));
    }

    #[test]
    fn test_off_desktop_position_falls_back_to_default() {
        let screens = dual_head();
        assert_eq!(screen_from_position(&screens, -500, -500), Rect::new(0, 0, 1920, 1080));
        assert_eq!(screen_from_position(&screens, 9999, 9999), Rect::new(0, 0, 1920, 1080));
    }

    #[test]
    fn test_empty_registry_is_degenerate_not_panicking() {
        let screens: Vec<Screen> = Vec::new();
        assert_eq!(default_screen(&screens), Rect::default());
        assert_eq!(screen_from_position(&screens, 100, 100), Rect::default());
    }

    #[test]
    fn test_select_mode_depth_and_refresh_are_optional() {
        let screens = dual_head();
        let screen = &screens[0];

        assert_eq!(screen.select_mode(1920, 1080, 0, 0), Some(0));
        assert_eq!(screen.select_mode(1920, 1080, 0, 144), Some(1));
        assert_eq!(screen.select_mode(1920, 1080, 32, 60), Some(0));
        assert_eq!(screen.select_mode(1920, 1080, 16, 0), None);
        assert_eq!(screen.select_mode(1920, 1080, 0, 120), None);
        assert_eq!(screen.select_mode(800, 600, 0, 0), None);
    }

    #[test]
    fn test_current_mode_is_enumeration_time_mode() {
        let screens = dual_head();
        assert_eq!(screens[0].mode().map(|m| m.refresh_rate), Some(60));
    }
}
