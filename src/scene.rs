// Built-in scenes. Each preset fixes the starting bodies and the look
// (field profile, trail policy, default tunables).

use serde::Deserialize;

use crate::field::{FieldProfile, TrailPolicy, Tunables};
use crate::sim;
use crate::types::{Body, Bounds, Rgba};

/// Starting state for one body, relative to the playfield:
/// position as a fraction of width/height, radius as a fraction of the
/// shorter side. Velocity is in pixels per frame.
struct Seed {
    fx: f64,
    fy: f64,
    vx: f64,
    vy: f64,
    radius: f64,
    color: Rgba,
}

const fn seed(fx: f64, fy: f64, vx: f64, vy: f64, radius: f64, color: Rgba) -> Seed {
    Seed { fx, fy, vx, vy, radius, color }
}

const CLASSIC: [Seed; 4] = [
    seed(0.25, 0.30, 2.0, 1.5, 0.080, Rgba::opaque(250, 2, 12)),
    seed(0.70, 0.40, -1.5, 2.5, 0.100, Rgba::opaque(20, 120, 250)),
    seed(0.50, 0.75, 2.5, -1.0, 0.065, Rgba::opaque(40, 230, 90)),
    seed(0.30, 0.65, -2.0, -2.0, 0.070, Rgba::opaque(250, 200, 30)),
];

const TRAILS: [Seed; 4] = [
    seed(0.20, 0.20, 3.0, 2.0, 0.050, Rgba::opaque(255, 80, 200)),
    seed(0.80, 0.25, -2.5, 3.0, 0.045, Rgba::opaque(80, 255, 240)),
    seed(0.60, 0.80, 3.5, -2.5, 0.040, Rgba::opaque(255, 160, 40)),
    seed(0.35, 0.55, -3.0, -3.5, 0.055, Rgba::opaque(140, 90, 255)),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Solid blobs, no trails.
    #[default]
    Classic,
    /// Small fast glowing bodies leaving fading trails.
    Trails,
}

impl Preset {
    pub fn profile(self) -> FieldProfile {
        match self {
            Preset::Classic => FieldProfile::SOFT,
            Preset::Trails => FieldProfile::GLOW,
        }
    }

    pub fn trail_policy(self) -> TrailPolicy {
        match self {
            Preset::Classic => TrailPolicy::Overwrite,
            Preset::Trails => TrailPolicy::FadeMax,
        }
    }

    pub fn tunables(self) -> Tunables {
        match self {
            Preset::Classic => Tunables { pointer_radius: 40.0, trail_intensity: 0.0 },
            Preset::Trails => Tunables { pointer_radius: 30.0, trail_intensity: 0.9 },
        }
    }

    /// Starting bodies scaled to `bounds`.
    pub fn bodies(self, bounds: Bounds) -> Vec<Body> {
        let seeds: &[Seed] = match self {
            Preset::Classic => &CLASSIC,
            Preset::Trails => &TRAILS,
        };
        let short_side = bounds.width.min(bounds.height);
        seeds
            .iter()
            .map(|s| {
                Body::new(
                    s.fx * bounds.width,
                    s.fy * bounds.height,
                    s.vx,
                    s.vy,
                    (s.radius * short_side).max(1.0),
                    s.color,
                )
            })
            .collect()
    }
}

/// The simulated bodies and the walls they bounce off.
#[derive(Clone, Debug)]
pub struct Scene {
    pub bodies: Vec<Body>,
    pub bounds: Bounds,
}

impl Scene {
    pub fn new(bodies: Vec<Body>, bounds: Bounds) -> Self {
        Self { bodies, bounds }
    }

    pub fn from_preset(preset: Preset, bounds: Bounds) -> Self {
        Self::new(preset.bodies(bounds), bounds)
    }

    /// One simulation step for every body.
    pub fn step(&mut self) {
        sim::advance(&mut self.bodies, self.bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Bounds = Bounds { width: 800.0, height: 600.0 };

    #[test]
    fn presets_start_inside_the_playfield() {
        for preset in [Preset::Classic, Preset::Trails] {
            for b in preset.bodies(BOUNDS) {
                assert!(b.radius > 0.0);
                let inside_x = b.x - b.radius >= 0.0 && b.x + b.radius <= BOUNDS.width;
                let inside_y = b.y - b.radius >= 0.0 && b.y + b.radius <= BOUNDS.height;
                assert!(inside_x && inside_y, "{preset:?} {b:?}");
            }
        }
    }

    #[test]
    fn radius_scales_with_short_side() {
        let bodies = Preset::Classic.bodies(BOUNDS);
        assert!((bodies[0].radius - 48.0).abs() < 1e-9);
        assert_eq!(bodies[0].color, Rgba::opaque(250, 2, 12));
    }

    #[test]
    fn tiny_playfield_keeps_radius_positive() {
        let bodies = Preset::Trails.bodies(Bounds { width: 4.0, height: 4.0 });
        assert!(bodies.iter().all(|b| b.radius >= 1.0));
    }

    #[test]
    fn step_keeps_body_count_and_radii() {
        let mut scene = Scene::from_preset(Preset::Trails, BOUNDS);
        let radii: Vec<f64> = scene.bodies.iter().map(|b| b.radius).collect();
        for _ in 0..500 {
            scene.step();
        }
        assert_eq!(scene.bodies.len(), 4);
        assert_eq!(scene.bodies.iter().map(|b| b.radius).collect::<Vec<_>>(), radii);
    }
}
