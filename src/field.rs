//! Field compositor.
//!
//! For every pixel, sums an inverse-square intensity and a distance-weighted
//! colour over all sources (the pointer first, then each body in order).
//! Pixels whose intensity exceeds the profile threshold take the blended
//! colour scaled by a brightness factor; everything else is black.
//!
//! Cost is O(width * height * (bodies + 1)) per frame. No spatial culling.

use log::debug;
use serde::Deserialize;

use crate::types::{Body, FrameBuffer, Pointer, Rgba};

/// Intensity used when a pixel sits within one unit of a source centre,
/// in place of `r² / distSq`.
pub const SATURATION: f64 = 2.0;

/// Added to `distSq` in the colour weight so the weight stays finite.
pub const WEIGHT_EPSILON: f64 = 1.0;

/// Numerator of the colour weight `w = n / (distSq + ε)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// `r² / (distSq + ε)`: colours stay local to each body.
    RadiusSquared,
    /// `r / (distSq + ε)`: flatter, softer colour mixing.
    Radius,
}

/// Maps total intensity above the threshold to a brightness in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Shaping {
    /// `(I - threshold) * gain`
    LinearRamp { gain: f64 },
    /// `I²`, saturating at intensity 1.
    QuadraticEaseIn,
}

/// The three knobs that decide how soft blob edges look.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldProfile {
    pub weighting: Weighting,
    pub threshold: f64,
    pub shaping: Shaping,
}

impl FieldProfile {
    /// Sharp-edged blobs with local colour. The default look.
    pub const SOFT: Self = Self {
        weighting: Weighting::RadiusSquared,
        threshold: 0.5,
        shaping: Shaping::LinearRamp { gain: 2.0 },
    };

    /// Wide, dim halos with heavily mixed colour.
    pub const GLOW: Self = Self {
        weighting: Weighting::Radius,
        threshold: 0.01,
        shaping: Shaping::QuadraticEaseIn,
    };

    /// Brightness for a pixel with the given total intensity.
    /// Zero at or below the threshold, otherwise clamped to [0, 1].
    #[inline]
    pub fn factor(&self, intensity: f64) -> f64 {
        if intensity.is_nan() || intensity <= self.threshold {
            return 0.0;
        }
        let f = match self.shaping {
            Shaping::LinearRamp { gain } => (intensity - self.threshold) * gain,
            Shaping::QuadraticEaseIn => intensity * intensity,
        };
        f.clamp(0.0, 1.0)
    }
}

impl Default for FieldProfile {
    fn default() -> Self {
        Self::SOFT
    }
}

/// What happens to last frame's pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TrailPolicy {
    /// Every pixel is rewritten from scratch; trail intensity is ignored.
    #[default]
    Overwrite,
    /// Old RGB is multiplied by the trail intensity, then max-combined
    /// with the new frame.
    FadeMax,
}

impl TrailPolicy {
    pub fn toggled(self) -> Self {
        match self {
            TrailPolicy::Overwrite => TrailPolicy::FadeMax,
            TrailPolicy::FadeMax => TrailPolicy::Overwrite,
        }
    }
}

/// Externally settable knobs. Not validated: whatever is set is used as-is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tunables {
    pub pointer_radius: f64,
    pub trail_intensity: f64,
}

/// Round toward zero into 0..=255. NaN maps to 0.
#[inline]
pub fn clamp_to_u8(v: f64) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

/// Per-pixel accumulators.
#[derive(Default)]
struct Sample {
    intensity: f64,
    weight: f64,
    r: f64,
    g: f64,
    b: f64,
}

impl Sample {
    #[inline]
    fn add(&mut self, dx: f64, dy: f64, radius: f64, color: Rgba, weighting: Weighting) {
        let dist_sq = dx * dx + dy * dy;
        let radius_sq = radius * radius;

        // distSq < 1 also covers the exact centre, where r²/distSq is undefined.
        self.intensity += if dist_sq < 1.0 { SATURATION } else { radius_sq / dist_sq };

        let numerator = match weighting {
            Weighting::RadiusSquared => radius_sq,
            Weighting::Radius => radius,
        };
        let w = numerator / (dist_sq + WEIGHT_EPSILON);
        self.r += w * color.r as f64;
        self.g += w * color.g as f64;
        self.b += w * color.b as f64;
        self.weight += w;
    }

    #[inline]
    fn rgb(&self, factor: f64) -> [u8; 3] {
        if self.weight > 0.0 {
            [
                clamp_to_u8(self.r / self.weight * factor),
                clamp_to_u8(self.g / self.weight * factor),
                clamp_to_u8(self.b / self.weight * factor),
            ]
        } else {
            [0, 0, 0]
        }
    }
}

/// Multiply every RGB channel by `trail`. Alpha is left alone.
pub fn fade(buffer: &mut FrameBuffer, trail: f64) {
    for px in buffer.pixels.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            *c = clamp_to_u8(*c as f64 * trail);
        }
    }
}

/// Rasterize one frame of `bodies` plus `pointer` into `buffer`.
///
/// Every pixel is visited; alpha always ends at 255.
pub fn composite(
    buffer: &mut FrameBuffer,
    bodies: &[Body],
    pointer: &Pointer,
    trail_intensity: f64,
    profile: &FieldProfile,
    policy: TrailPolicy,
) {
    if policy == TrailPolicy::FadeMax {
        fade(buffer, trail_intensity);
    }

    let width = buffer.width;
    for (i, px) in buffer.pixels.chunks_exact_mut(4).enumerate() {
        let x = (i % width) as f64;
        let y = (i / width) as f64;

        let mut s = Sample::default();
        s.add(x - pointer.x, y - pointer.y, pointer.radius, pointer.color, profile.weighting);
        for b in bodies {
            s.add(x - b.x, y - b.y, b.radius, b.color, profile.weighting);
        }

        let rgb = s.rgb(profile.factor(s.intensity));
        match policy {
            TrailPolicy::Overwrite => px[..3].copy_from_slice(&rgb),
            TrailPolicy::FadeMax => {
                for (old, new) in px[..3].iter_mut().zip(rgb) {
                    *old = (*old).max(new);
                }
            }
        }
        px[3] = 255;
    }
}

/// Owns the frame buffer and the tunables, and renders one frame per call.
pub struct Compositor {
    frame: FrameBuffer,
    profile: FieldProfile,
    trail: TrailPolicy,
    tunables: Tunables,
    pointer_color: Rgba,
}

impl Compositor {
    pub fn new(
        width: usize,
        height: usize,
        profile: FieldProfile,
        trail: TrailPolicy,
        tunables: Tunables,
    ) -> Self {
        Self {
            frame: FrameBuffer::new(width, height),
            profile,
            trail,
            tunables,
            pointer_color: Rgba::opaque(255, 255, 255),
        }
    }

    pub fn with_pointer_color(mut self, color: Rgba) -> Self {
        self.pointer_color = color;
        self
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn tunables(&self) -> Tunables {
        self.tunables
    }

    pub fn trail_policy(&self) -> TrailPolicy {
        self.trail
    }

    pub fn set_pointer_radius(&mut self, radius: f64) {
        debug!("pointer radius -> {radius:.1}");
        self.tunables.pointer_radius = radius;
    }

    pub fn set_trail_intensity(&mut self, trail: f64) {
        debug!("trail intensity -> {trail:.2}");
        self.tunables.trail_intensity = trail;
    }

    pub fn set_trail_policy(&mut self, trail: TrailPolicy) {
        debug!("trail policy -> {trail:?}");
        self.trail = trail;
    }

    /// The pointer pseudo-body at buffer position (x, y).
    pub fn pointer_at(&self, x: f64, y: f64) -> Pointer {
        Pointer { x, y, radius: self.tunables.pointer_radius, color: self.pointer_color }
    }

    /// Composite the scene into the owned buffer and hand it back read-only.
    pub fn render(&mut self, bodies: &[Body], pointer_at: (f64, f64)) -> &FrameBuffer {
        let pointer = self.pointer_at(pointer_at.0, pointer_at.1);
        composite(
            &mut self.frame,
            bodies,
            &pointer,
            self.tunables.trail_intensity,
            &self.profile,
            self.trail,
        );
        &self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer_far() -> Pointer {
        Pointer { x: -1.0e4, y: -1.0e4, radius: 0.0, color: Rgba::opaque(255, 255, 255) }
    }

    #[test]
    fn clamp_to_u8_saturates_instead_of_wrapping() {
        assert_eq!(clamp_to_u8(-3.0), 0);
        assert_eq!(clamp_to_u8(0.0), 0);
        assert_eq!(clamp_to_u8(127.9), 127);
        assert_eq!(clamp_to_u8(255.0), 255);
        assert_eq!(clamp_to_u8(300.0), 255);
        assert_eq!(clamp_to_u8(f64::INFINITY), 255);
        assert_eq!(clamp_to_u8(f64::NAN), 0);
    }

    #[test]
    fn soft_factor_ramps_from_threshold() {
        let p = FieldProfile::SOFT;
        assert_eq!(p.factor(0.4), 0.0);
        assert_eq!(p.factor(0.5), 0.0);
        assert!((p.factor(0.75) - 0.5).abs() < 1e-12);
        assert_eq!(p.factor(2.0), 1.0);
    }

    #[test]
    fn glow_factor_eases_in_below_one() {
        let p = FieldProfile::GLOW;
        assert_eq!(p.factor(0.005), 0.0);
        assert!((p.factor(0.5) - 0.25).abs() < 1e-12);
        assert_eq!(p.factor(1.0), 1.0);
        assert_eq!(p.factor(9.0), 1.0);
    }

    #[test]
    fn factor_is_zero_for_nan_intensity() {
        assert_eq!(FieldProfile::SOFT.factor(f64::NAN), 0.0);
    }

    #[test]
    fn centre_pixel_hits_saturation_branch() {
        let mut s = Sample::default();
        s.add(0.0, 0.0, 20.0, Rgba::opaque(10, 20, 30), Weighting::RadiusSquared);
        assert_eq!(s.intensity, SATURATION);
        assert!(s.weight.is_finite());

        let mut s = Sample::default();
        s.add(0.6, 0.6, 20.0, Rgba::opaque(10, 20, 30), Weighting::RadiusSquared);
        assert_eq!(s.intensity, SATURATION);
    }

    #[test]
    fn far_field_is_inverse_square() {
        let mut s = Sample::default();
        s.add(30.0, 40.0, 10.0, Rgba::opaque(0, 0, 0), Weighting::Radius);
        assert!((s.intensity - 100.0 / 2500.0).abs() < 1e-12);
        assert!((s.weight - 10.0 / 2501.0).abs() < 1e-12);
    }

    #[test]
    fn fade_leaves_alpha() {
        let mut fb = FrameBuffer::new(1, 1);
        fb.pixels.copy_from_slice(&[200, 100, 50, 255]);
        fade(&mut fb, 0.5);
        assert_eq!(fb.pixels, vec![100, 50, 25, 255]);
    }

    #[test]
    fn fade_out_of_range_intensity_is_clamped() {
        let mut fb = FrameBuffer::new(1, 1);
        fb.pixels.copy_from_slice(&[200, 100, 50, 7]);
        fade(&mut fb, 2.0);
        assert_eq!(fb.pixels, vec![255, 200, 100, 7]);
        fade(&mut fb, -1.0);
        assert_eq!(fb.pixels, vec![0, 0, 0, 7]);
    }

    #[test]
    fn empty_scene_is_opaque_black() {
        let mut fb = FrameBuffer::new(4, 3);
        composite(&mut fb, &[], &pointer_far(), 0.0, &FieldProfile::SOFT, TrailPolicy::Overwrite);
        for px in fb.pixels.chunks_exact(4) {
            assert_eq!(px, [0, 0, 0, 255]);
        }
    }

    #[test]
    fn overwrite_ignores_previous_contents() {
        let mut fb = FrameBuffer::new(3, 3);
        fb.pixels.fill(200);
        composite(&mut fb, &[], &pointer_far(), 1.0, &FieldProfile::SOFT, TrailPolicy::Overwrite);
        assert!(fb.pixels.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn pointer_alone_lights_its_pixel() {
        let mut fb = FrameBuffer::new(5, 5);
        let pointer = Pointer { x: 2.0, y: 2.0, radius: 3.0, color: Rgba::opaque(10, 200, 30) };
        composite(&mut fb, &[], &pointer, 0.0, &FieldProfile::SOFT, TrailPolicy::Overwrite);
        assert_eq!(fb.pixel(2, 2), [10, 200, 30, 255]);
    }

    #[test]
    fn compositor_setters_take_latest_value() {
        let mut c = Compositor::new(
            2,
            2,
            FieldProfile::SOFT,
            TrailPolicy::Overwrite,
            Tunables { pointer_radius: 10.0, trail_intensity: 0.0 },
        );
        c.set_pointer_radius(25.0);
        c.set_pointer_radius(30.0);
        c.set_trail_intensity(0.8);
        c.set_trail_policy(c.trail_policy().toggled());
        assert_eq!(c.tunables(), Tunables { pointer_radius: 30.0, trail_intensity: 0.8 });
        assert_eq!(c.trail_policy(), TrailPolicy::FadeMax);
        assert_eq!(c.pointer_at(1.0, 1.0).radius, 30.0);
    }
}
