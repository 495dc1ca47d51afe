// What you SEE:
// • Coloured blobs drift, bounce off the window edges and melt together when close.
// • The mouse is one more blob that follows the cursor.
// • Up/Down: mouse blob radius. Left/Right: trail intensity.
// • T toggles trails (fade + max) on/off. S saves a PNG. ESC quits.
// • --headless renders a fixed number of frames without a window.

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use metaball_field::draw::Drawer;
use metaball_field::{
    App, Args, Config, FixedPointer, FrameScheduler, HeadlessSurface, PacedScheduler,
    PresentationSurface,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cfg = Config::from_args(&args)?;
    info!(
        "{}x{} preset={:?} profile={:?} trail={:?} pointer_radius={} trail_intensity={}",
        cfg.width,
        cfg.height,
        cfg.preset,
        cfg.profile,
        cfg.trail,
        cfg.tunables.pointer_radius,
        cfg.tunables.trail_intensity
    );

    let mut app = cfg.build_app();
    if cfg.headless {
        run_headless(&cfg, &mut app)
    } else {
        run_window(&cfg, &mut app)
    }
}

fn run_window(cfg: &Config, app: &mut App) -> Result<()> {
    if let Some(path) = cfg.ignored_snapshot() {
        warn!(
            "--snapshot {} only applies with --headless; press S to save from the window",
            path.display()
        );
    }
    let mut drawer = Drawer::new("Metaball Field", cfg.width, cfg.height, cfg.pointer_scale)?;

    let mut scheduler = PacedScheduler::new(cfg.fps);
    if let Some(n) = cfg.frames {
        scheduler = scheduler.with_max_frames(n);
    }

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;

    let ran = scheduler.run(|| {
        if !drawer.is_open() || drawer.esc_pressed() {
            return Ok(ControlFlow::Break(()));
        }

        /* 1) Keys -> tunables (latest value wins) */
        let controls = drawer.controls();
        controls.apply(app);

        /* 2) Simulate, composite, show */
        let frame = app.on_frame(&drawer);
        drawer.present(frame)?;

        /* 3) Snapshot of what is on screen right now */
        if controls.snapshot {
            let path = PathBuf::from(format!("metaball-{:06}.png", app.frames()));
            match app.frame().save_png(&path) {
                Ok(()) => info!("saved {}", path.display()),
                Err(e) => warn!("snapshot failed: {e}"),
            }
        }

        /* 4) FPS once per second */
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            info!("FPS: {:.1}", frames_this_second as f32 / secs);
            frames_this_second = 0;
            last_fps_time = now;
        }

        Ok(ControlFlow::Continue(()))
    })?;

    info!("window closed after {ran} frames");
    Ok(())
}

fn run_headless(cfg: &Config, app: &mut App) -> Result<()> {
    let mut surface = HeadlessSurface::new();
    let input = FixedPointer(None);

    let mut scheduler = PacedScheduler::unpaced();
    if let Some(n) = cfg.frames {
        scheduler = scheduler.with_max_frames(n);
    }

    let start = Instant::now();
    let ran = scheduler.run(|| {
        let frame = app.on_frame(&input);
        surface.present(frame)?;
        Ok(ControlFlow::Continue(()))
    })?;
    let secs = start.elapsed().as_secs_f64();
    info!("rendered {ran} frames in {secs:.2}s ({:.1} fps)", ran as f64 / secs.max(f64::EPSILON));

    if let (Some(path), Some(frame)) = (&cfg.snapshot, surface.last_frame()) {
        frame.save_png(path)?;
        info!("saved {}", path.display());
    }
    Ok(())
}
