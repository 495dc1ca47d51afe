//! Animated metaball field rendered into an RGBA pixel buffer.
//!
//! Each frame: bodies move and bounce ([`sim::advance`]), then every pixel sums
//! the inverse-square field of all bodies plus the mouse ([`field::composite`]).

pub mod app;
pub mod config;
pub mod draw;
pub mod error;
pub mod field;
pub mod platform;
pub mod scene;
pub mod sim;
pub mod types;

pub use app::App;
pub use config::{Args, Config, Settings};
pub use error::{Error, Result};
pub use field::{composite, Compositor, FieldProfile, Shaping, TrailPolicy, Tunables, Weighting};
pub use platform::{
    FixedPointer, FrameScheduler, HeadlessSurface, InputSource, PacedScheduler, PresentationSurface,
};
pub use scene::{Preset, Scene};
pub use sim::advance;
pub use types::{Body, Bounds, FrameBuffer, Pointer, Rgba};
