pub mod encode;
pub mod jaw;
pub mod normalization;
pub mod render;
pub mod rig_drive;

use anyhow::Result;
use encode::FfmpegEncoder;
use log::{debug, info};
use ndarray::Array2;
use normalization::{NormalizeSettings, Normalizer, Reprojection};
use render::{render_frames, RenderPlan};
use rig_drive::drive_rig;

use crate::{
    errors::PipelineError, ingestion::split_channels, mel_script::MelScript, parts::SensorLayout,
    rig_config::RigConfig,
};

pub struct Systems {
    pub layout: SensorLayout,
    pub normalizer: Normalizer,
    pub render_plan: RenderPlan,
    pub encoder: FfmpegEncoder,
}

impl Systems {
    pub fn new(config: &RigConfig, settings: NormalizeSettings) -> Systems {
        Systems {
            layout: SensorLayout::default(),
            normalizer: Normalizer::new(settings),
            render_plan: RenderPlan::from_config(config),
            encoder: FfmpegEncoder::from_config(config),
        }
    }

    /// Ingestion and normalization; nothing downstream runs if this fails.
    pub fn prepare(&self, raw: &Array2<f64>) -> Result<Reprojection, PipelineError> {
        let mut channels = split_channels(raw, &self.layout)?;
        let reprojection = self.normalizer.run(&mut channels)?;
        debug!(
            "Removed sensor offset {:?}",
            reprojection.mean.as_slice()
        );
        Ok(reprojection)
    }

    /// Whole host-side job: scene, rig animation, render loop, save.
    pub fn build_script(
        &self,
        reprojection: &Reprojection,
        config: &RigConfig,
        scene_path: &str,
    ) -> Result<MelScript> {
        let mut script = MelScript::new();
        script.scene_preamble(config, &self.layout);

        script.comment("rig animation");
        drive_rig(&mut script, &reprojection.keyframes, &self.layout)?;

        script.render_globals(&self.render_plan);
        script.comment("render loop");
        render_frames(&mut script, &self.render_plan);

        script.save_scene(scene_path);
        info!("Host script ready: {} commands", script.lines().len());
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    #[test]
    fn test_malformed_input_stops_before_script() {
        let systems = Systems::new(&RigConfig::default(), NormalizeSettings::default());
        let raw = Array2::<f64>::zeros((3, 29));
        assert!(matches!(
            systems.prepare(&raw),
            Err(PipelineError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_script_order() {
        let config = RigConfig {
            render_end: 3,
            ..Default::default()
        };
        let systems = Systems::new(&config, NormalizeSettings::default());
        let raw = Array::from_shape_fn((3, 30), |(r, c)| (r + c) as f64);
        let reprojection = systems.prepare(&raw).unwrap();
        let script = systems.build_script(&reprojection, &config, "out.mb").unwrap();
        let lines = script.lines();

        let position = |prefix: &str| lines.iter().position(|l| l.starts_with(prefix)).unwrap();
        let import = position("file -import");
        let first_cut = position("cutKey");
        let first_render = position("ogsRender");
        let save = position("file -save");
        assert!(import < first_cut);
        assert!(first_cut < first_render);
        assert!(first_render < save);
        assert_eq!(lines.iter().filter(|l| l.starts_with("ogsRender")).count(), 3);
        // 5 tongue controls x 3 channels x 3 frames, plus 3 on the lower jaw
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("setKeyframe")).count(),
            48
        );
    }
}
