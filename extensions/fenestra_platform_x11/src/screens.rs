//! XRandR screen and mode enumeration
//!
//! Each enabled CRTC becomes one registry screen; its rectangle is the
//! CRTC's slice of the virtual desktop and its mode list comes from the
//! first connected output. The CRTC/output binding is kept aside for mode
//! switches, which go through `XRRSetCrtcConfig`.

use std::ffi::CStr;
use std::os::raw::c_int;
use std::slice;

use tracing::warn;
use x11_dl::xlib::{self, Xlib};
use x11_dl::xrandr::{XRRModeInfo, Xrandr};

use fenestra_platform::{DisplayMode, Screen};

use crate::CrtcBinding;

fn refresh_rate(mode: &XRRModeInfo) -> i32 {
    let denom = mode.hTotal as f64 * mode.vTotal as f64;
    if denom <= 0.0 {
        return 0;
    }
    (mode.dotClock as f64 / denom).round() as i32
}

/// Enumerate enabled CRTCs into the screen registry.
///
/// # Safety
///
/// `display` must be a live connection owned by the calling thread.
pub(crate) unsafe fn enumerate(
    xlib: &Xlib,
    xrandr: &Xrandr,
    display: *mut xlib::Display,
    screen_num: c_int,
    root: xlib::Window,
) -> (Vec<Screen>, Vec<CrtcBinding>) {
    let mut screens = Vec::new();
    let mut crtcs = Vec::new();

    let depth = (xlib.XDefaultDepth)(display, screen_num);

    let resources = (xrandr.XRRGetScreenResourcesCurrent)(display, root);
    if resources.is_null() {
        warn!("XRRGetScreenResourcesCurrent returned nothing; screen registry empty");
        return (screens, crtcs);
    }

    let res = &*resources;
    let all_modes = slice::from_raw_parts(res.modes, res.nmode.max(0) as usize);
    let crtc_ids = slice::from_raw_parts(res.crtcs, res.ncrtc.max(0) as usize);

    for &crtc_id in crtc_ids {
        let crtc_info = (xrandr.XRRGetCrtcInfo)(display, resources, crtc_id);
        if crtc_info.is_null() {
            continue;
        }
        let crtc = &*crtc_info;
        if crtc.mode == 0 || crtc.noutput <= 0 {
            (xrandr.XRRFreeCrtcInfo)(crtc_info);
            continue;
        }

        let outputs = slice::from_raw_parts(crtc.outputs, crtc.noutput as usize).to_vec();

        // Name and mode list from the first output driven by this CRTC.
        let mut name = String::new();
        let mut modes = Vec::new();
        let mut current_mode = 0;

        let output_info = (xrandr.XRRGetOutputInfo)(display, resources, outputs[0]);
        if !output_info.is_null() {
            let output = &*output_info;
            if !output.name.is_null() {
                name = CStr::from_ptr(output.name).to_string_lossy().into_owned();
            }

            let output_modes = slice::from_raw_parts(output.modes, output.nmode.max(0) as usize);
            for &mode_id in output_modes {
                let Some(info) = all_modes.iter().find(|m| m.id == mode_id) else {
                    continue;
                };
                if mode_id == crtc.mode {
                    current_mode = modes.len();
                }
                modes.push(DisplayMode {
                    width: info.width as i32,
                    height: info.height as i32,
                    bits_per_pixel: depth,
                    refresh_rate: refresh_rate(info),
                    native: mode_id,
                });
            }
            (xrandr.XRRFreeOutputInfo)(output_info);
        }

        screens.push(Screen {
            x: crtc.x,
            y: crtc.y,
            width: crtc.width as i32,
            height: crtc.height as i32,
            name,
            modes,
            current_mode,
        });
        crtcs.push(CrtcBinding {
            crtc: crtc_id,
            outputs,
            rotation: crtc.rotation,
        });

        (xrandr.XRRFreeCrtcInfo)(crtc_info);
    }

    (xrandr.XRRFreeScreenResources)(resources);
    (screens, crtcs)
}

/// Switch one CRTC to a new mode. Returns `true` on RRSetConfigSuccess.
///
/// # Safety
///
/// `display` must be a live connection owned by the calling thread and
/// `binding` must refer to a CRTC it enumerated.
pub(crate) unsafe fn set_crtc_mode(
    xrandr: &Xrandr,
    display: *mut xlib::Display,
    root: xlib::Window,
    binding: &CrtcBinding,
    mode: &DisplayMode,
) -> bool {
    let resources = (xrandr.XRRGetScreenResourcesCurrent)(display, root);
    if resources.is_null() {
        return false;
    }

    let crtc_info = (xrandr.XRRGetCrtcInfo)(display, resources, binding.crtc);
    if crtc_info.is_null() {
        (xrandr.XRRFreeScreenResources)(resources);
        return false;
    }
    let (x, y) = ((*crtc_info).x, (*crtc_info).y);
    (xrandr.XRRFreeCrtcInfo)(crtc_info);

    let mut outputs = binding.outputs.clone();
    let status = (xrandr.XRRSetCrtcConfig)(
        display,
        resources,
        binding.crtc,
        xlib::CurrentTime,
        x,
        y,
        mode.native,
        binding.rotation,
        outputs.as_mut_ptr(),
        outputs.len() as c_int,
    );

    (xrandr.XRRFreeScreenResources)(resources);
    status == 0
}
