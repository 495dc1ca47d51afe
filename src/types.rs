// Core types shared by the simulator and the compositor.

use std::path::Path;

use crate::error::Error;

/// One 8-bit RGBA colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// A moving circular field source.
///
/// `radius` is set once and never mutated; the simulator only touches
/// position and velocity.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub x: f64,      // position (buffer pixels)
    pub y: f64,
    pub vx: f64,     // velocity (pixels per frame)
    pub vy: f64,
    pub radius: f64, // field falloff + bounce edge, always > 0
    pub color: Rgba,
}

impl Body {
    pub fn new(x: f64, y: f64, vx: f64, vy: f64, radius: f64, color: Rgba) -> Self {
        debug_assert!(radius > 0.0, "body radius must be positive");
        Self { x, y, vx, vy, radius, color }
    }
}

/// The mouse as a field source. Never simulated; radius comes from the
/// pointer-radius tunable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Rgba,
}

/// Playfield extent used for wall bounces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

/// Row-major RGBA8 pixels, 4 bytes per pixel in R, G, B, A order.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>, // length = width * height * 4
}

impl FrameBuffer {
    /// All-zero (transparent black) buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u8; width * height * 4] }
    }

    #[inline]
    pub fn pixel_index(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * 4
    }

    /// RGBA at (x, y). Panics when out of range, like slice indexing.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = self.pixel_index(x, y);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    /// Write the buffer to disk as a PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), Error> {
        let (w, h) = (self.width as u32, self.height as u32);
        let img = image::RgbaImage::from_raw(w, h, self.pixels.clone()).ok_or(Error::BufferSize {
            expected: self.width * self.height * 4,
            actual: self.pixels.len(),
        })?;
        img.save(path)?;
        Ok(())
    }
}
