// Window: shows the RGBA frame and reports mouse + keys.
// Keys: Up/Down pointer radius, Left/Right trail intensity,
// T trail policy, S snapshot, Esc quit.

use log::warn;
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use crate::app::App;
use crate::error::Error;
use crate::platform::{InputSource, PresentationSurface};
use crate::types::FrameBuffer;

pub const RADIUS_STEP: f64 = 2.0;
pub const TRAIL_STEP: f64 = 0.05;

pub struct Drawer {
    window: Window,
    packed: Vec<u32>,   // 0x00RRGGBB per pixel, what minifb wants
    pointer_scale: f64, // window coords -> buffer coords
}

impl Drawer {
    /// Open a window sized to the frame buffer.
    pub fn new(
        title: &str,
        width: usize,
        height: usize,
        pointer_scale: f64,
    ) -> Result<Self, Error> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window, packed: vec![0u32; width * height], pointer_scale })
    }

    /// False once the user closes the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Key presses since the last update, as tunable adjustments.
    pub fn controls(&self) -> Controls {
        let held = |k| self.window.is_key_pressed(k, KeyRepeat::Yes);
        let once = |k| self.window.is_key_pressed(k, KeyRepeat::No);

        let mut c = Controls::default();
        if held(Key::Up) { c.radius_delta += RADIUS_STEP; }
        if held(Key::Down) { c.radius_delta -= RADIUS_STEP; }
        if held(Key::Right) { c.trail_delta += TRAIL_STEP; }
        if held(Key::Left) { c.trail_delta -= TRAIL_STEP; }
        c.toggle_trail = once(Key::T);
        c.snapshot = once(Key::S);
        c
    }
}

impl PresentationSurface for Drawer {
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        pack_rgba(&frame.pixels, &mut self.packed);
        self.window
            .update_with_buffer(&self.packed, frame.width, frame.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }
}

impl InputSource for Drawer {
    fn current_pointer(&self) -> Option<(f64, f64)> {
        self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| (x as f64 * self.pointer_scale, y as f64 * self.pointer_scale))
    }
}

/// RGBA bytes -> 0x00RRGGBB words. Alpha is dropped.
pub fn pack_rgba(pixels: &[u8], out: &mut Vec<u32>) {
    out.clear();
    out.extend(
        pixels
            .chunks_exact(4)
            .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32),
    );
}

/// One frame's worth of keyboard requests.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Controls {
    pub radius_delta: f64,
    pub trail_delta: f64,
    pub toggle_trail: bool,
    pub snapshot: bool,
}

impl Controls {
    /// Push the adjustments into the app. Values are not range-checked,
    /// except that the pointer radius never goes below zero from key presses.
    pub fn apply(&self, app: &mut App) {
        let t = app.compositor().tunables();
        if self.radius_delta != 0.0 {
            app.set_pointer_radius((t.pointer_radius + self.radius_delta).max(0.0));
        }
        if self.trail_delta != 0.0 {
            app.set_trail_intensity(t.trail_intensity + self.trail_delta);
        }
        if self.toggle_trail {
            let next = app.compositor().trail_policy().toggled();
            app.set_trail_policy(next);
            if app.compositor().tunables().trail_intensity <= 0.0 {
                warn!(
                    "trail policy is {next:?} but trail intensity is 0; old frames vanish at once"
                );
            }
        }
    }
}
