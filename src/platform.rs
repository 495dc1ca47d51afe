//! Seams to the outside world: where pointer input comes from, where finished
//! frames go, and who decides when the next frame runs.

use std::ops::ControlFlow;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::Error;
use crate::types::FrameBuffer;

/// Reports the pointer in buffer pixel coordinates, polled once per frame.
/// `None` means no position is available right now (e.g. outside the window).
pub trait InputSource {
    fn current_pointer(&self) -> Option<(f64, f64)>;
}

/// Displays a finished RGBA frame.
pub trait PresentationSurface {
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error>;
}

/// Calls `on_frame` repeatedly until it asks to stop or fails.
/// Returns how many frames ran.
pub trait FrameScheduler {
    fn run<F>(&mut self, on_frame: F) -> Result<u64, Error>
    where
        F: FnMut() -> Result<ControlFlow<()>, Error>;
}

/// Sleep-paced loop at a target frame rate, optionally capped.
pub struct PacedScheduler {
    frame_duration: Duration,
    max_frames: Option<u64>,
}

impl PacedScheduler {
    /// Non-positive or non-finite `fps` means unpaced. A rate so low that
    /// its period overflows `Duration` is paced at `Duration::MAX`.
    pub fn new(fps: f64) -> Self {
        let frame_duration = if fps.is_finite() && fps > 0.0 {
            Duration::try_from_secs_f64(1.0 / fps).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        Self { frame_duration, max_frames: None }
    }

    /// No pacing at all; run as fast as frames complete.
    pub fn unpaced() -> Self {
        Self { frame_duration: Duration::ZERO, max_frames: None }
    }

    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }
}

impl FrameScheduler for PacedScheduler {
    fn run<F>(&mut self, mut on_frame: F) -> Result<u64, Error>
    where
        F: FnMut() -> Result<ControlFlow<()>, Error>,
    {
        let mut frames = 0u64;
        loop {
            if self.max_frames.is_some_and(|max| frames >= max) {
                break;
            }
            let frame_start = Instant::now();
            let flow = on_frame()?;
            frames += 1;
            if flow.is_break() {
                break;
            }

            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_duration {
                thread::sleep(self.frame_duration - elapsed);
            }
        }
        Ok(frames)
    }
}

/// Pointer that never moves.
#[derive(Clone, Copy, Debug)]
pub struct FixedPointer(pub Option<(f64, f64)>);

impl InputSource for FixedPointer {
    fn current_pointer(&self) -> Option<(f64, f64)> {
        self.0
    }
}

/// Off-screen surface: keeps a copy of the last frame it was given.
#[derive(Default)]
pub struct HeadlessSurface {
    last: Option<FrameBuffer>,
    presented: u64,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&FrameBuffer> {
        self.last.as_ref()
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl PresentationSurface for HeadlessSurface {
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        match &mut self.last {
            Some(last) if last.pixels.len() == frame.pixels.len() => {
                last.width = frame.width;
                last.height = frame.height;
                last.pixels.copy_from_slice(&frame.pixels);
            }
            _ => self.last = Some(frame.clone()),
        }
        self.presented += 1;
        Ok(())
    }
}
