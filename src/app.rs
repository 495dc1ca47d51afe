// Frame driver: poll input, simulate, composite. Always in that order.

use crate::field::{Compositor, TrailPolicy};
use crate::platform::InputSource;
use crate::scene::Scene;
use crate::types::FrameBuffer;

pub struct App {
    scene: Scene,
    compositor: Compositor,
    pointer: (f64, f64),
    frames: u64,
}

impl App {
    /// The pointer starts at the buffer centre until input reports otherwise.
    pub fn new(scene: Scene, compositor: Compositor) -> Self {
        let fb = compositor.frame();
        let pointer = (fb.width as f64 / 2.0, fb.height as f64 / 2.0);
        Self { scene, compositor, pointer, frames: 0 }
    }

    /// Run one frame and return the finished buffer.
    pub fn on_frame<I: InputSource + ?Sized>(&mut self, input: &I) -> &FrameBuffer {
        if let Some(p) = input.current_pointer() {
            self.pointer = p;
        }
        self.scene.step();
        self.frames += 1;
        self.compositor.render(&self.scene.bodies, self.pointer)
    }

    pub fn frame(&self) -> &FrameBuffer {
        self.compositor.frame()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn pointer(&self) -> (f64, f64) {
        self.pointer
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn set_pointer_radius(&mut self, radius: f64) {
        self.compositor.set_pointer_radius(radius);
    }

    pub fn set_trail_intensity(&mut self, trail: f64) {
        self.compositor.set_trail_intensity(trail);
    }

    pub fn set_trail_policy(&mut self, trail: TrailPolicy) {
        self.compositor.set_trail_policy(trail);
    }
}
