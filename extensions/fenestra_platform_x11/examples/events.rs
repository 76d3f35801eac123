//! Opens a window and prints every normalized event until it is closed.
//!
//! Run with `RUST_LOG=debug` to see the backend's own tracing output too.

use fenestra_platform::prelude::*;
use fenestra_platform::timing;
use fenestra_platform_x11::X11Platform;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut platform = X11Platform::new()?;
    for (i, screen) in platform.screens().iter().enumerate() {
        println!(
            "screen {i}: {} {}x{} at ({},{}) [{} modes]",
            screen.name, screen.width, screen.height, screen.x, screen.y,
            screen.modes.len(),
        );
    }

    let window = platform.create_window(
        &WindowConfig::new("fenestra events")
            .with_position(CENTER, CENTER)
            .with_size(960, 540),
    )?;

    let mut last_frame = timing::now();
    'main: loop {
        while let Some(event) = platform.peek_event() {
            match event {
                Event::KeyDown { key: Key::Escape, .. } => break 'main,
                Event::KeyDown { key: Key::F, .. } => {
                    let full = platform.is_fullscreen(window);
                    platform.set_fullscreen(window, !full);
                }
                other => println!("{other:?}"),
            }
        }

        if platform.was_closed(window) {
            break 'main;
        }
        if let Some((w, h)) = platform.was_resized(window) {
            println!("resized to {w}x{h}");
        }

        timing::limit_fps(&mut last_frame, 60);
    }

    platform.destroy_window(window);
    Ok(())
}
