use std::ops::Range;

use log::info;

use crate::rig_config::RigConfig;

pub trait RenderSink {
    /// Render one frame of the animated scene to `<image_dir>/<frame>.<ext>`
    fn render_frame(&mut self, camera: &str, frame: u32);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub camera: String,
    pub camera_shape: String,
    pub frames: Range<u32>,
    pub width: u32,
    pub height: u32,
    pub renderer: String,
    pub image_dir: String,
}

impl RenderPlan {
    pub fn from_config(config: &RigConfig) -> Self {
        RenderPlan {
            camera: config.camera.clone(),
            camera_shape: config.camera_shape.clone(),
            frames: config.render_start..config.render_end,
            width: config.width,
            height: config.height,
            renderer: config.renderer.clone(),
            image_dir: config.image_dir.clone(),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

pub fn render_frames(sink: &mut dyn RenderSink, plan: &RenderPlan) {
    for frame in plan.frames.clone() {
        sink.render_frame(&plan.camera, frame);
    }
    info!(
        "Queued {} frames ({}..{}) from {}",
        plan.frame_count(),
        plan.frames.start,
        plan.frames.end,
        plan.camera
    );
}
