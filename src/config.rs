//! Run settings from the command line and an optional YAML file.
//!
//! Precedence is CLI flag, then YAML, then the preset's defaults. Bodies are
//! always taken from the preset, never from the file.
//!
//! ```yaml
//! preset: trails          # classic | trails
//! width: 800
//! height: 600
//! pointer_radius: 35.0
//! trail_intensity: 0.85
//! trail: fade_max         # overwrite | fade_max
//! profile: glow           # soft | glow
//! threshold: 0.02         # overrides the profile's threshold
//! weighting: radius       # radius_squared | radius
//! shaping: { kind: linear_ramp, gain: 3.0 }
//! fps: 60.0
//! pointer_scale: 0.5      # 2x display: halve window coordinates
//! pointer_color: [255, 255, 255]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::app::App;
use crate::error::{Error, Result};
use crate::field::{Compositor, FieldProfile, Shaping, TrailPolicy, Tunables, Weighting};
use crate::scene::{Preset, Scene};
use crate::types::{Bounds, Rgba};

pub const DEFAULT_WIDTH: usize = 800;
pub const DEFAULT_HEIGHT: usize = 600;
pub const DEFAULT_FPS: f64 = 60.0;
pub const DEFAULT_HEADLESS_FRAMES: u64 = 120;

#[derive(Parser, Debug, Default)]
#[command(name = "metaball-field", about = "Animated metaball field in a window")]
pub struct Args {
    /// YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    #[arg(long)]
    pub width: Option<usize>,

    #[arg(long)]
    pub height: Option<usize>,

    /// Influence radius of the mouse blob
    #[arg(long, allow_negative_numbers = true)]
    pub pointer_radius: Option<f64>,

    /// How much of the previous frame survives (fade_max only)
    #[arg(long, allow_negative_numbers = true)]
    pub trail_intensity: Option<f64>,

    #[arg(long, value_enum)]
    pub trail: Option<TrailPolicy>,

    #[arg(long, value_enum)]
    pub profile: Option<ProfileName>,

    /// Colour weight numerator, overrides the profile's
    #[arg(long, value_enum)]
    pub weighting: Option<Weighting>,

    #[arg(long)]
    pub fps: Option<f64>,

    /// Multiplier from window mouse coordinates to buffer pixels
    #[arg(long)]
    pub pointer_scale: Option<f64>,

    /// Render without a window
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many frames
    #[arg(long)]
    pub frames: Option<u64>,

    /// Save the last frame as PNG (headless)
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

/// Named field profile presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProfileName {
    Soft,
    Glow,
}

impl ProfileName {
    pub fn profile(self) -> FieldProfile {
        match self {
            ProfileName::Soft => FieldProfile::SOFT,
            ProfileName::Glow => FieldProfile::GLOW,
        }
    }
}

/// YAML file contents. Every field is optional.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub preset: Option<Preset>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub pointer_radius: Option<f64>,
    pub trail_intensity: Option<f64>,
    pub trail: Option<TrailPolicy>,
    pub profile: Option<ProfileName>,
    pub weighting: Option<Weighting>,
    pub threshold: Option<f64>,
    pub shaping: Option<Shaping>,
    pub fps: Option<f64>,
    pub pointer_scale: Option<f64>,
    pub pointer_color: Option<[u8; 3]>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        // An empty file is a valid "no overrides".
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Fully resolved run configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub width: usize,
    pub height: usize,
    pub preset: Preset,
    pub profile: FieldProfile,
    pub trail: TrailPolicy,
    pub tunables: Tunables,
    pub fps: f64,
    pub pointer_scale: f64,
    pub pointer_color: Rgba,
    pub headless: bool,
    pub frames: Option<u64>,
    pub snapshot: Option<PathBuf>,
}

impl Config {
    /// Parse the YAML named by `--config` (if any) and merge with `args`.
    pub fn from_args(args: &Args) -> Result<Self> {
        let settings = match &args.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        Self::resolve(args, settings)
    }

    pub fn resolve(args: &Args, file: Settings) -> Result<Self> {
        let preset = args.preset.or(file.preset).unwrap_or_default();
        let defaults = preset.tunables();

        let mut profile = args
            .profile
            .or(file.profile)
            .map(ProfileName::profile)
            .unwrap_or(preset.profile());
        if let Some(w) = args.weighting.or(file.weighting) {
            profile.weighting = w;
        }
        if let Some(t) = file.threshold {
            profile.threshold = t;
        }
        if let Some(s) = file.shaping {
            profile.shaping = s;
        }

        let headless = args.headless;
        let frames = args.frames.or(headless.then_some(DEFAULT_HEADLESS_FRAMES));

        let cfg = Self {
            width: args.width.or(file.width).unwrap_or(DEFAULT_WIDTH),
            height: args.height.or(file.height).unwrap_or(DEFAULT_HEIGHT),
            preset,
            profile,
            trail: args.trail.or(file.trail).unwrap_or(preset.trail_policy()),
            tunables: Tunables {
                pointer_radius: args
                    .pointer_radius
                    .or(file.pointer_radius)
                    .unwrap_or(defaults.pointer_radius),
                trail_intensity: args
                    .trail_intensity
                    .or(file.trail_intensity)
                    .unwrap_or(defaults.trail_intensity),
            },
            fps: args.fps.or(file.fps).unwrap_or(DEFAULT_FPS),
            pointer_scale: args.pointer_scale.or(file.pointer_scale).unwrap_or(1.0),
            pointer_color: file
                .pointer_color
                .map(|[r, g, b]| Rgba::opaque(r, g, b))
                .unwrap_or(Rgba::opaque(255, 255, 255)),
            headless,
            frames,
            snapshot: args.snapshot.clone(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// `--snapshot` names the final headless frame; a window run has no
    /// final frame and saves on key S instead.
    pub fn ignored_snapshot(&self) -> Option<&Path> {
        self.snapshot.as_deref().filter(|_| !self.headless)
    }

    /// Only the outer surface is checked; tunables are passed through as-is.
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        // The frame period must fit in a Duration, not just be positive.
        let period_ok = self.fps.is_finite()
            && self.fps > 0.0
            && Duration::try_from_secs_f64(1.0 / self.fps).is_ok();
        if !period_ok {
            return Err(Error::InvalidConfig(format!(
                "fps must be positive with a representable frame period, got {}",
                self.fps
            )));
        }
        if !self.pointer_scale.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "pointer_scale must be finite, got {}",
                self.pointer_scale
            )));
        }
        Ok(())
    }

    pub fn bounds(&self) -> Bounds {
        Bounds { width: self.width as f64, height: self.height as f64 }
    }

    /// Scene + compositor for this configuration.
    pub fn build_app(&self) -> App {
        let scene = Scene::from_preset(self.preset, self.bounds());
        let compositor =
            Compositor::new(self.width, self.height, self.profile, self.trail, self.tunables)
                .with_pointer_color(self.pointer_color);
        App::new(scene, compositor)
    }
}
