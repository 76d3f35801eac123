//! GPU surface handoff
//!
//! Enough for a renderer to create its own context: the raw display and
//! window handles, the GLX visual attribute list for a requested
//! framebuffer configuration, and the Vulkan instance extensions a surface
//! on this backend needs. No context or surface is created here.

use std::ffi::c_void;
use std::os::raw::c_ulong;
use std::ptr::NonNull;

use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle,
    RawWindowHandle, XlibDisplayHandle, XlibWindowHandle,
};
use x11_dl::glx;

use fenestra_platform::{GlConfig, WindowHandle};

const GLX_FRAMEBUFFER_SRGB_CAPABLE_ARB: i32 = 0x20B2;

use crate::X11Platform;

/// Borrowed display/window pair for one window, consumable by anything
/// that takes `raw-window-handle` targets (wgpu, glutin, ash).
pub struct SurfaceTarget<'a> {
    display: *mut c_void,
    screen: i32,
    window: c_ulong,
    _platform: std::marker::PhantomData<&'a X11Platform>,
}

impl X11Platform {
    /// Surface target for a window, or `None` for a stale handle.
    pub fn surface_target(&self, window: WindowHandle) -> Option<SurfaceTarget<'_>> {
        if !self.windows.contains(window) {
            return None;
        }
        Some(SurfaceTarget {
            display: self.display as *mut c_void,
            screen: self.screen_num,
            window: window.raw(),
            _platform: std::marker::PhantomData,
        })
    }
}

impl HasDisplayHandle for SurfaceTarget<'_> {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        let handle = XlibDisplayHandle::new(NonNull::new(self.display), self.screen);
        // SAFETY: the display pointer outlives self via the platform borrow.
        Ok(unsafe { DisplayHandle::borrow_raw(RawDisplayHandle::Xlib(handle)) })
    }
}

impl HasWindowHandle for SurfaceTarget<'_> {
    fn window_handle(&self) -> Result<raw_window_handle::WindowHandle<'_>, HandleError> {
        let handle = XlibWindowHandle::new(self.window);
        // SAFETY: the native window outlives self via the platform borrow.
        Ok(unsafe { raw_window_handle::WindowHandle::borrow_raw(RawWindowHandle::Xlib(handle)) })
    }
}

/// Relay a framebuffer request as a zero-terminated GLX attribute list,
/// ready for `glXChooseFBConfig`.
pub fn gl_visual_attribs(config: &GlConfig) -> Vec<i32> {
    let mut attribs = vec![
        glx::GLX_RED_SIZE, config.red_bits as i32,
        glx::GLX_GREEN_SIZE, config.green_bits as i32,
        glx::GLX_BLUE_SIZE, config.blue_bits as i32,
        glx::GLX_ALPHA_SIZE, config.alpha_bits as i32,
        glx::GLX_DEPTH_SIZE, config.depth_bits as i32,
        glx::GLX_STENCIL_SIZE, config.stencil_bits as i32,
        glx::GLX_DOUBLEBUFFER, config.double_buffer as i32,
    ];
    if config.samples > 0 {
        attribs.extend_from_slice(&[
            glx::GLX_SAMPLE_BUFFERS, 1,
            glx::GLX_SAMPLES, config.samples as i32,
        ]);
    }
    if config.srgb {
        attribs.extend_from_slice(&[GLX_FRAMEBUFFER_SRGB_CAPABLE_ARB, 1]);
    }
    attribs.push(0);
    attribs
}

/// Instance extensions a Vulkan surface on this backend requires.
pub fn vulkan_instance_extensions() -> &'static [&'static str] {
    &["VK_KHR_surface", "VK_KHR_xlib_surface"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gl_attribs_relay_requested_bits() {
        let attribs = gl_visual_attribs(&GlConfig::default());

        let value_of = |key: i32| {
            attribs
                .chunks(2)
                .find(|pair| pair.len() == 2 && pair[0] == key)
                .map(|pair| pair[1])
        };
        assert_eq!(value_of(glx::GLX_RED_SIZE), Some(8));
        assert_eq!(value_of(glx::GLX_DEPTH_SIZE), Some(24));
        assert_eq!(value_of(glx::GLX_DOUBLEBUFFER), Some(1));
        assert_eq!(attribs.last(), Some(&0));
    }

    #[test]
    fn test_gl_attribs_omit_msaa_unless_requested() {
        let plain = gl_visual_attribs(&GlConfig::default());
        assert!(!plain.contains(&glx::GLX_SAMPLES));

        let msaa = gl_visual_attribs(&GlConfig { samples: 4, ..Default::default() });
        let pos = msaa.iter().position(|&a| a == glx::GLX_SAMPLES);
        assert_eq!(pos.map(|p| msaa[p + 1]), Some(4));
    }

    #[test]
    fn test_gl_attribs_request_srgb_capability() {
        let attribs = gl_visual_attribs(&GlConfig { srgb: true, ..Default::default() });
        let pos = attribs.iter().position(|&a| a == GLX_FRAMEBUFFER_SRGB_CAPABLE_ARB);
        assert_eq!(pos.map(|p| attribs[p + 1]), Some(1));
    }

    #[test]
    fn test_vulkan_extensions_name_the_xlib_surface() {
        let exts = vulkan_instance_extensions();
        assert!(exts.contains(&"VK_KHR_surface"));
        assert!(exts.contains(&"VK_KHR_xlib_surface"));
    }
}
