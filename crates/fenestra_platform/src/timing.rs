//! Monotonic timing and frame-rate limiting

use std::sync::OnceLock;
use std::time::{Duration, Instant};

fn epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

/// Seconds elapsed since the process first asked for the time. Monotonic.
pub fn now() -> f64 {
    epoch().elapsed().as_secs_f64()
}

/// Sleep for at least `ms` milliseconds.
pub fn sleep_ms(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}

/// Hold the caller to at most `fps` iterations per second and return the
/// elapsed frame time in seconds.
///
/// `last_frame` is the timestamp returned by the previous call (or
/// [`now`] before the first). Sleeps in 1ms slices while more than 2ms of
/// the frame budget remain, then spins out the remainder so the wake-up is
/// not at the mercy of scheduler granularity.
pub fn limit_fps(last_frame: &mut f64, fps: u32) -> f64 {
    let target = if fps == 0 { 0.0 } else { 1.0 / fps as f64 };
    let deadline = *last_frame + target;

    loop {
        let t = now();
        let remaining = deadline - t;
        if remaining <= 0.0 {
            let frame_time = t - *last_frame;
            *last_frame = t;
            return frame_time;
        }
        if remaining > 0.002 {
            sleep_ms(1);
        } else {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic() {
        let a = now();
        let b = now();
        assert!(b >= a);
    }

    #[test]
    fn test_limit_fps_holds_the_frame() {
        let mut last = now();
        // 100 fps = 10ms budget; the frame itself does nothing.
        let frame_time = limit_fps(&mut last, 100);
        assert!(frame_time >= 0.009, "frame returned after {frame_time}s");
    }

    #[test]
    fn test_limit_fps_zero_is_uncapped() {
        let mut last = now();
        let start = now();
        limit_fps(&mut last, 0);
        assert!(now() - start < 0.005);
    }
}
