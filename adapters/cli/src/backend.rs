//! Terminal rendering backend.

use std::time::Duration;

use anyhow::Result;
use donut_panic_core::Outcome;
use donut_panic_rendering::{FrameInput, Presentation, RenderingBackend, Scene};

use crate::render;

/// Backend that advances the scene at a fixed cadence and prints character
/// frames to stdout. There is no interactive input; every frame carries an
/// empty [`FrameInput`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct TextBackend {
    max_frames: u32,
    print_every: u32,
    frame_delta: Duration,
}

impl TextBackend {
    pub(crate) const fn new(max_frames: u32, print_every: u32, frame_delta: Duration) -> Self {
        Self {
            max_frames,
            print_every,
            frame_delta,
        }
    }
}

impl RenderingBackend for TextBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        println!("{}", presentation.window_title);
        let mut scene = presentation.scene;

        for frame in 0..self.max_frames {
            update_scene(self.frame_delta, FrameInput::default(), &mut scene);

            if self.print_every != 0 && (frame + 1) % self.print_every == 0 {
                println!("{}", render::draw(&scene));
            }

            if scene.hud.outcome != Outcome::Playing {
                break;
            }
        }

        println!("{}", render::draw(&scene));
        Ok(())
    }
}
